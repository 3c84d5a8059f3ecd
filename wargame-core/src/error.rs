//! Error types for the rules engine

use thiserror::Error;

/// Why a coordinate pair does not describe a legal action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum IllegalReason {
    #[error("Specified coordinate does not exist!")]
    NoSuchCoordinate,

    #[error("Coordinate does not contain a unit!")]
    NoUnit,

    #[error("Unit does not belong to this player!")]
    NotOwned,

    #[error("Units can only move in cardinal directions!")]
    NotCardinal,

    #[error("Non-tech defender unit cannot move towards its base.")]
    DefenderRetreat,

    #[error("Non-virus attacker unit cannot move towards its base.")]
    AttackerRetreat,

    #[error("Unit cannot move; it is engaged with another unit.")]
    Engaged,

    #[error("Action was not recognized.")]
    NotRecognized,
}

/// Rules engine errors
#[derive(Debug, Error)]
pub enum GameError {
    #[error("illegal action: {0}")]
    IllegalAction(IllegalReason),

    #[error("both AI units are destroyed; the game state has no defined winner")]
    BothAiDestroyed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Malformed coordinate text
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseCoordError {
    #[error("expected {expected} coordinate characters, found {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("'{0}' is not a row letter")]
    BadRow(char),

    #[error("'{0}' is not a column digit (0-f)")]
    BadColumn(char),
}
