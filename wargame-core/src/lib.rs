//! Wargame Core - Rules engine and evaluation
//!
//! This crate provides the core game logic:
//! - Board geometry (square grid, row/col coordinates)
//! - Unit types with combat and repair tables
//! - Game state, action legality and resolution, win detection
//! - Position evaluation heuristics
//! - Text rendering of the board

pub mod board;
pub mod coord;
pub mod error;
pub mod eval;
pub mod game;
pub mod options;
pub mod render;
pub mod units;

// Re-exports for convenient access
pub use board::Board;
pub use coord::{Coord, CoordPair, CROSS_DIRECTIONS, MAX_DIM};
pub use error::{GameError, IllegalReason, ParseCoordError};
pub use eval::{evaluate, Heuristic, Score, MAX_HEURISTIC_SCORE, MIN_HEURISTIC_SCORE};
pub use game::{Action, GameState, UnitAction};
pub use options::{GameType, Options};
pub use render::render;
pub use units::{Team, Unit, UnitType, DAMAGE_TABLE, MAX_HEALTH, REPAIR_TABLE};
