//! Wargame Search - Computer player and game orchestration
//!
//! This crate provides:
//! - Arena search tree with frontier expansion
//! - Minimax and alpha-beta propagation under a wall-clock budget
//! - Iterative deepening with random fallbacks
//! - Game runner with pluggable human move sources and move publishers
//!
//! Depends on `wargame-core` only through its public state contract
//! (clone, enumerate successors, evaluate).

pub mod clock;
pub mod runner;
pub mod search;
pub mod stats;
pub mod tree;

pub use clock::{Clock, Timeout};
pub use runner::{GameRunner, MovePublisher, MoveSource, RunnerError, TurnReport};
pub use search::{SearchAi, SearchConfig, SearchOutcome, Suggestion};
pub use stats::{GameStats, SearchStats};
pub use tree::{NodeId, SearchNode, SearchTree};
