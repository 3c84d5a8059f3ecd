//! Game options, fixed at game creation

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coord::MAX_DIM;
use crate::error::GameError;
use crate::eval::Heuristic;
use crate::units::Team;

/// Smallest board on which the two opening layouts do not overlap
pub const MIN_DIM: usize = 4;

/// Who controls each team
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    #[default]
    AttackerVsDefender,
    AttackerVsComp,
    CompVsDefender,
    CompVsComp,
}

impl GameType {
    pub fn name(self) -> &'static str {
        match self {
            GameType::AttackerVsDefender => "Human (A) vs. Human (D)",
            GameType::AttackerVsComp => "Human (A) vs. Computer (D)",
            GameType::CompVsDefender => "Computer (A) vs. Human (D)",
            GameType::CompVsComp => "Computer (A) vs. Computer (D)",
        }
    }

    /// Is `team` played by a human in this game type
    pub fn is_human(self, team: Team) -> bool {
        match self {
            GameType::AttackerVsDefender => true,
            GameType::AttackerVsComp => team == Team::Attacker,
            GameType::CompVsDefender => team == Team::Defender,
            GameType::CompVsComp => false,
        }
    }
}

/// Game configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Board dimension (dim x dim)
    pub dim: usize,
    /// Deepest ply the search may reach
    pub max_depth: u32,
    /// Depth completed before the soft time cutoff may stop deepening
    pub min_depth: u32,
    /// Search budget per move, in seconds
    pub max_time: f64,
    /// Turn limit after which the Defender wins (None = unlimited)
    pub max_turns: Option<u32>,
    pub game_type: GameType,
    /// Alpha-beta pruning (false = plain minimax)
    pub alpha_beta: bool,
    pub heuristic: Heuristic,
    /// Break ties between equally-valued root moves at random
    pub randomize_moves: bool,
    /// Game broker URL for playing across processes
    pub broker: Option<String>,
    /// RNG seed for the computer player (None = entropy)
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dim: 5,
            max_depth: 4,
            min_depth: 2,
            max_time: 5.0,
            max_turns: Some(100),
            game_type: GameType::AttackerVsDefender,
            alpha_beta: true,
            heuristic: Heuristic::WeightedHealth,
            randomize_moves: true,
            broker: None,
            seed: None,
        }
    }
}

impl Options {
    pub fn max_time(&self) -> Duration {
        Duration::from_secs_f64(self.max_time.max(0.0))
    }

    pub fn is_human(&self, team: Team) -> bool {
        self.game_type.is_human(team)
    }

    /// Reject configurations the engine cannot play
    pub fn validate(&self) -> Result<(), GameError> {
        if !(MIN_DIM..=MAX_DIM).contains(&self.dim) {
            return Err(GameError::Config(format!(
                "board dimension {} outside {}..={}",
                self.dim, MIN_DIM, MAX_DIM
            )));
        }
        if self.max_depth == 0 {
            return Err(GameError::Config("max_depth must be at least 1".to_string()));
        }
        if !(self.max_time.is_finite() && self.max_time > 0.0) {
            return Err(GameError::Config(format!(
                "max_time must be a positive number of seconds, got {}",
                self.max_time
            )));
        }
        Ok(())
    }

    /// Load from a JSON file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let content = std::fs::read_to_string(path)?;
        let mut options: Options = serde_json::from_str(&content)?;
        // A turn limit of zero means no limit, as on the command line
        if options.max_turns == Some(0) {
            options.max_turns = None;
        }
        options.validate()?;
        Ok(options)
    }

    pub fn save(&self, path: &Path) -> Result<(), GameError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = Options::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.max_time(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let too_big = Options { dim: 17, ..Default::default() };
        assert!(matches!(too_big.validate(), Err(GameError::Config(_))));
        let overlapping = Options { dim: 3, ..Default::default() };
        assert!(overlapping.validate().is_err());
        let smallest = Options { dim: MIN_DIM, ..Default::default() };
        assert!(smallest.validate().is_ok());
        let no_time = Options { max_time: 0.0, ..Default::default() };
        assert!(no_time.validate().is_err());
        let no_depth = Options { max_depth: 0, ..Default::default() };
        assert!(no_depth.validate().is_err());
    }

    #[test]
    fn test_game_type_humans() {
        assert!(GameType::AttackerVsComp.is_human(Team::Attacker));
        assert!(!GameType::AttackerVsComp.is_human(Team::Defender));
        assert!(!GameType::CompVsComp.is_human(Team::Defender));
        assert!(GameType::AttackerVsDefender.is_human(Team::Defender));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"max_depth": 3, "game_type": "comp-vs-comp", "heuristic": "e2"}"#).unwrap();

        let options = Options::load(&path).unwrap();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.game_type, GameType::CompVsComp);
        assert_eq!(options.heuristic, Heuristic::Mobility);
        assert_eq!(options.dim, 5);
    }

    #[test]
    fn test_load_zero_turn_limit_means_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"max_turns": 0}"#).unwrap();
        assert_eq!(Options::load(&path).unwrap().max_turns, None);

        std::fs::write(&path, r#"{"max_turns": 12}"#).unwrap();
        assert_eq!(Options::load(&path).unwrap().max_turns, Some(12));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        let options = Options { seed: Some(7), max_turns: None, ..Default::default() };
        options.save(&path).unwrap();
        assert_eq!(Options::load(&path).unwrap(), options);
    }
}
