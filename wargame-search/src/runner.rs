//! Game runner - plays turns until someone wins
//!
//! Level 3 - Step-level implementation
//!
//! Human turns come from a `MoveSource` (stdin, the broker, a script);
//! computer turns come from `SearchAi` and may be announced to a
//! `MovePublisher`.

use thiserror::Error;
use wargame_core::{CoordPair, GameError, GameState, Team};

use crate::search::{SearchAi, Suggestion};
use crate::stats::GameStats;

// ============================================================================
// SEAMS
// ============================================================================

/// Supplies moves for human-controlled teams
pub trait MoveSource {
    /// Block until a move is available
    fn next_move(&mut self, state: &GameState) -> Result<CoordPair, RunnerError>;

    /// The last move could not be played; it will be asked for again
    fn reject(&mut self, _pair: CoordPair, _reason: &str) {}
}

/// Receives every move the computer plays
pub trait MovePublisher {
    /// `turn` is the turn count after the move
    fn publish(&mut self, pair: CoordPair, turn: u32);
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0} has no move to play")]
    NoMove(Team),

    #[error("computer suggested an illegal move for {team}: {pair}: {source}")]
    IllegalSuggestion {
        team: Team,
        pair: CoordPair,
        source: GameError,
    },

    #[error("move source failed: {0}")]
    Source(String),

    #[error(transparent)]
    Game(#[from] GameError),
}

// ============================================================================
// TURN REPORT
// ============================================================================

/// What happened during one turn
#[derive(Clone, Debug)]
pub struct TurnReport {
    pub team: Team,
    pub pair: CoordPair,
    pub description: String,
    /// Present for computer turns
    pub suggestion: Option<Suggestion>,
}

impl TurnReport {
    pub fn is_computer(&self) -> bool {
        self.suggestion.is_some()
    }
}

// ============================================================================
// RUNNER
// ============================================================================

/// Alternates human and computer turns according to the game type
pub struct GameRunner {
    ai: SearchAi,
    human: Box<dyn MoveSource>,
    publisher: Option<Box<dyn MovePublisher>>,
}

impl GameRunner {
    pub fn new(ai: SearchAi, human: Box<dyn MoveSource>) -> Self {
        Self {
            ai,
            human,
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: Box<dyn MovePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Play one turn for the player to move
    pub fn play_turn(
        &mut self,
        state: &mut GameState,
        stats: &mut GameStats,
    ) -> Result<TurnReport, RunnerError> {
        let team = state.next_player();
        if state.options().is_human(team) {
            self.human_turn(state, team)
        } else {
            self.computer_turn(state, team, stats)
        }
    }

    /// Play until the game is over; `on_turn` sees each turn after it is applied
    ///
    /// Returns the winner. Both AIs destroyed is reported as
    /// `GameError::BothAiDestroyed`.
    pub fn play_game<F>(
        &mut self,
        state: &mut GameState,
        stats: &mut GameStats,
        mut on_turn: F,
    ) -> Result<Team, RunnerError>
    where
        F: FnMut(&GameState, &TurnReport),
    {
        loop {
            if let Some(winner) = state.winner()? {
                return Ok(winner);
            }
            let report = self.play_turn(state, stats)?;
            on_turn(state, &report);
        }
    }

    fn human_turn(&mut self, state: &mut GameState, team: Team) -> Result<TurnReport, RunnerError> {
        loop {
            let pair = self.human.next_move(state)?;
            match state.attempt_move(pair) {
                Ok(description) => {
                    state.advance_turn();
                    return Ok(TurnReport {
                        team,
                        pair,
                        description,
                        suggestion: None,
                    });
                }
                Err(GameError::IllegalAction(reason)) => {
                    tracing::debug!(%pair, %reason, "rejected human move");
                    self.human.reject(pair, &reason.to_string());
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn computer_turn(
        &mut self,
        state: &mut GameState,
        team: Team,
        stats: &mut GameStats,
    ) -> Result<TurnReport, RunnerError> {
        let suggestion = self.ai.suggest_move(state);
        stats.record(&suggestion.stats);

        let Some(action) = suggestion.action else {
            return Err(RunnerError::NoMove(team));
        };

        let description = match state.attempt_move(action.pair) {
            Ok(description) => description,
            Err(source) => {
                tracing::error!(%team, pair = %action.pair, error = %source, "computer suggested an illegal move");
                return Err(RunnerError::IllegalSuggestion {
                    team,
                    pair: action.pair,
                    source,
                });
            }
        };
        state.advance_turn();

        if let Some(publisher) = self.publisher.as_mut() {
            publisher.publish(action.pair, state.turns_played());
        }

        Ok(TurnReport {
            team,
            pair: action.pair,
            description,
            suggestion: Some(suggestion),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
