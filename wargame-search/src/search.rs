//! Move selection by iterative deepening
//!
//! Each round expands the whole frontier one ply, then re-propagates values
//! over the tree built so far with minimax or alpha-beta. The clock is
//! checked at every recursive entry; a timeout aborts the round in progress
//! and the last completed round (or the best partial result) is used.
//!
//! ## Architecture
//! - Level 2: Iterative deepening loop, fallback handling
//! - Level 3: Minimax and alpha-beta propagation
//! - Level 4: Leaf evaluation

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wargame_core::{Action, GameState, Heuristic, Options, Score, Team};

use crate::clock::{Clock, Timeout};
use crate::stats::SearchStats;
use crate::tree::{NodeId, SearchTree};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Search parameters, usually taken from the game options
#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub max_depth: u32,
    /// Rounds completed before the soft cutoff may stop deepening
    pub min_depth: u32,
    /// Hard budget; propagation aborts once it is spent
    pub max_time: Duration,
    pub alpha_beta: bool,
    pub heuristic: Heuristic,
    /// Break ties between best root children at random
    pub randomize_moves: bool,
    /// Share of `max_time` after which no new round is started
    pub cutoff_fraction: f64,
}

impl SearchConfig {
    pub fn from_options(options: &Options) -> Self {
        Self {
            max_depth: options.max_depth,
            min_depth: options.min_depth,
            max_time: options.max_time(),
            alpha_beta: options.alpha_beta,
            heuristic: options.heuristic,
            randomize_moves: options.randomize_moves,
            cutoff_fraction: options.heuristic.time_cutoff_fraction(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// How the suggested action was obtained
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Every started round finished
    Complete,
    /// Time ran out; best child from the rounds that did finish
    TimedOut,
    /// Time ran out before any child was scored; random legal move
    RandomAfterTimeout,
    /// Propagation finished without scoring a child; random legal move
    RandomUnscored,
    /// The player to move has no legal action
    NoMoves,
}

impl SearchOutcome {
    pub fn is_fallback(self) -> bool {
        matches!(
            self,
            SearchOutcome::RandomAfterTimeout | SearchOutcome::RandomUnscored
        )
    }
}

/// Answer of one `suggest_move` call
#[derive(Clone, Debug)]
pub struct Suggestion {
    pub action: Option<Action>,
    /// Propagated value of the chosen child (Defender's perspective)
    pub score: Option<Score>,
    pub depth_reached: u32,
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

// ============================================================================
// SEARCH AI (Level 2 - Iterative Deepening)
// ============================================================================

/// Computer player
#[derive(Debug)]
pub struct SearchAi {
    config: SearchConfig,
    rng: ChaCha8Rng,
}

impl SearchAi {
    /// Seeded from entropy
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn with_seed(config: SearchConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_options(options: &Options) -> Self {
        let config = SearchConfig::from_options(options);
        match options.seed {
            Some(seed) => Self::with_seed(config, seed),
            None => Self::new(config),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Pick an action for the player to move in `state`
    ///
    /// Never fails: when the search cannot score a child it falls back to a
    /// uniformly random legal move. `action` is None only when the player to
    /// move has nothing legal to do.
    pub fn suggest_move(&mut self, state: &GameState) -> Suggestion {
        let clock = Clock::start(self.config.max_time);
        self.suggest_move_with_clock(state, &clock)
    }

    /// Same as `suggest_move`, on a budget owned by the caller
    pub fn suggest_move_with_clock(&mut self, state: &GameState, clock: &Clock) -> Suggestion {
        let maximizing = state.next_player() == Team::Defender;
        let mut tree = SearchTree::new(state.clone());
        let mut stats = SearchStats::default();

        let mut chosen: Option<(NodeId, Score)> = None;
        let mut depth_reached = 0;
        let mut timed_out = false;

        for depth in 1..=self.config.max_depth {
            if depth_reached >= self.config.min_depth
                && clock.past_fraction(self.config.cutoff_fraction)
            {
                tracing::debug!(depth, "soft time cutoff, not starting another round");
                break;
            }

            match tree.expand_frontier(clock) {
                Err(Timeout) => {
                    timed_out = true;
                    break;
                }
                Ok(0) if depth > 1 => {
                    tracing::debug!(depth, "nothing left to expand");
                    break;
                }
                Ok(_) => {}
            }

            tree.reset_values();
            let mut propagator = Propagator {
                tree: &mut tree,
                clock,
                heuristic: self.config.heuristic,
                stats: &mut stats,
            };
            let round = if self.config.alpha_beta {
                propagator.alpha_beta_root(maximizing, self.config.randomize_moves)
            } else {
                propagator.minimax(NodeId::ROOT, maximizing)
            };

            match round {
                Ok(_) => {
                    depth_reached = depth;
                    chosen = self.pick_root_child(&tree, maximizing);
                    tracing::debug!(
                        depth,
                        nodes = tree.len(),
                        checks = clock.checks(),
                        score = chosen.map(|(_, score)| score),
                        "round complete"
                    );
                }
                Err(Timeout) => {
                    timed_out = true;
                    if chosen.is_none() {
                        chosen = tree.best_root_child(maximizing);
                    }
                    break;
                }
            }
        }

        stats.depth_reached = depth_reached;
        stats.nodes_per_depth = tree.nodes_per_depth();
        stats.branching_factor = tree.average_branching_factor();
        stats.elapsed = clock.elapsed();

        if let Some((id, score)) = chosen {
            if let Some(action) = tree.get(id).action {
                let outcome = if timed_out {
                    SearchOutcome::TimedOut
                } else {
                    SearchOutcome::Complete
                };
                return Suggestion {
                    action: Some(action),
                    score: Some(score),
                    depth_reached,
                    outcome,
                    stats,
                };
            }
        }

        self.random_fallback(state, timed_out, depth_reached, stats)
    }

    /// Best root child; equal values are drawn at random when enabled
    fn pick_root_child(&mut self, tree: &SearchTree, maximizing: bool) -> Option<(NodeId, Score)> {
        let (first, best) = tree.best_root_child(maximizing)?;
        if !self.config.randomize_moves {
            return Some((first, best));
        }
        let tied = tree.root_children_valued(best);
        let id = tied.choose(&mut self.rng).copied().unwrap_or(first);
        Some((id, best))
    }

    fn random_fallback(
        &mut self,
        state: &GameState,
        timed_out: bool,
        depth_reached: u32,
        stats: SearchStats,
    ) -> Suggestion {
        let candidates: Vec<Action> = state.move_candidates(state.next_player()).collect();
        let action = candidates.choose(&mut self.rng).copied();

        let outcome = match action {
            None => {
                tracing::warn!(player = %state.next_player(), "no legal moves available");
                SearchOutcome::NoMoves
            }
            Some(_) if timed_out => {
                tracing::warn!("ran out of time before scoring any move, playing a random move");
                SearchOutcome::RandomAfterTimeout
            }
            Some(_) => {
                tracing::warn!("search found no scored child, playing a random move");
                SearchOutcome::RandomUnscored
            }
        };

        Suggestion {
            action,
            score: None,
            depth_reached,
            outcome,
            stats,
        }
    }
}

// ============================================================================
// PROPAGATION (Level 3)
// ============================================================================

/// One propagation pass over the current tree
struct Propagator<'a> {
    tree: &'a mut SearchTree,
    clock: &'a Clock,
    heuristic: Heuristic,
    stats: &'a mut SearchStats,
}

impl Propagator<'_> {
    fn minimax(&mut self, id: NodeId, maximizing: bool) -> Result<Score, Timeout> {
        self.clock.check()?;
        let child_count = self.tree.get(id).children.len();
        if child_count == 0 {
            return Ok(self.leaf_value(id));
        }

        let mut best = if maximizing { Score::MIN } else { Score::MAX };
        for i in 0..child_count {
            let child = self.tree.get(id).children[i];
            let value = self.minimax(child, !maximizing)?;
            best = if maximizing { best.max(value) } else { best.min(value) };
        }

        self.tree.get_mut(id).value = Some(best);
        Ok(best)
    }

    /// Alpha-beta from the root
    ///
    /// With `exact_ties` every root child whose value equals the running best
    /// is searched with a window one wider, so tied values are exact rather
    /// than bounds and can be drawn from at random.
    fn alpha_beta_root(&mut self, maximizing: bool, exact_ties: bool) -> Result<Score, Timeout> {
        if !exact_ties {
            return self.alpha_beta(NodeId::ROOT, Score::MIN, Score::MAX, maximizing);
        }

        self.clock.check()?;
        let child_count = self.tree.get(NodeId::ROOT).children.len();
        if child_count == 0 {
            return Ok(self.leaf_value(NodeId::ROOT));
        }

        let mut alpha = Score::MIN;
        let mut beta = Score::MAX;
        let mut best = if maximizing { Score::MIN } else { Score::MAX };
        for i in 0..child_count {
            let child = self.tree.get(NodeId::ROOT).children[i];
            if maximizing {
                let value = self.alpha_beta(child, alpha.saturating_sub(1), beta, false)?;
                best = best.max(value);
                alpha = alpha.max(best);
            } else {
                let value = self.alpha_beta(child, alpha, beta.saturating_add(1), true)?;
                best = best.min(value);
                beta = beta.min(best);
            }
        }

        self.tree.get_mut(NodeId::ROOT).value = Some(best);
        Ok(best)
    }

    /// Fail-soft alpha-beta
    fn alpha_beta(
        &mut self,
        id: NodeId,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
    ) -> Result<Score, Timeout> {
        self.clock.check()?;
        let child_count = self.tree.get(id).children.len();
        if child_count == 0 {
            return Ok(self.leaf_value(id));
        }

        let mut best = if maximizing { Score::MIN } else { Score::MAX };
        for i in 0..child_count {
            let child = self.tree.get(id).children[i];
            let value = self.alpha_beta(child, alpha, beta, !maximizing)?;
            if maximizing {
                best = best.max(value);
                alpha = alpha.max(best);
            } else {
                best = best.min(value);
                beta = beta.min(best);
            }
            if beta <= alpha {
                self.stats.cutoffs += 1;
                break;
            }
        }

        self.tree.get_mut(id).value = Some(best);
        Ok(best)
    }

    // ========================================================================
    // Level 4: Leaf Evaluation
    // ========================================================================

    /// Cached heuristic of a leaf; only fresh evaluations are counted
    fn leaf_value(&mut self, id: NodeId) -> Score {
        let node = self.tree.get_mut(id);
        let score = match node.heuristic {
            Some(score) => score,
            None => {
                let score = self.heuristic.evaluate(&node.state);
                node.heuristic = Some(score);
                self.stats.record_evaluation(node.depth);
                score
            }
        };
        node.value = Some(score);
        score
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wargame_core::{Coord, CoordPair, Unit, UnitAction, UnitType};

    fn config(max_depth: u32, alpha_beta: bool) -> SearchConfig {
        SearchConfig {
            max_depth,
            min_depth: max_depth,
            max_time: Duration::from_secs(600),
            alpha_beta,
            heuristic: Heuristic::WeightedHealth,
            randomize_moves: false,
            cutoff_fraction: 1.0,
        }
    }

    fn midgame() -> GameState {
        let mut game = GameState::empty(Options::default());
        game.set(Coord::new(0, 0), Some(Unit::new(Team::Defender, UnitType::AI)));
        game.set(Coord::new(1, 0), Some(Unit::new(Team::Defender, UnitType::Tech)));
        game.set(Coord::new(0, 2), Some(Unit::with_health(Team::Defender, UnitType::Firewall, 5)));
        game.set(Coord::new(2, 2), Some(Unit::new(Team::Attacker, UnitType::Virus)));
        game.set(Coord::new(3, 1), Some(Unit::with_health(Team::Attacker, UnitType::Program, 6)));
        game.set(Coord::new(4, 4), Some(Unit::new(Team::Attacker, UnitType::AI)));
        game
    }

    fn is_root_candidate(state: &GameState, action: Action) -> bool {
        state.move_candidates(state.next_player()).any(|a| a == action)
    }

    #[test]
    fn test_minimax_and_alpha_beta_agree() {
        let game = midgame();
        for depth in 1..=3 {
            let plain = SearchAi::with_seed(config(depth, false), 1).suggest_move(&game);
            let pruned = SearchAi::with_seed(config(depth, true), 1).suggest_move(&game);

            assert_eq!(plain.outcome, SearchOutcome::Complete);
            assert_eq!(pruned.outcome, SearchOutcome::Complete);
            assert_eq!(plain.score, pruned.score, "depth {depth}");
            assert_eq!(plain.action, pruned.action, "depth {depth}");
            assert!(
                pruned.stats.total_evaluations() <= plain.stats.total_evaluations(),
                "depth {depth}"
            );
        }
    }

    #[test]
    fn test_agreement_on_opening_layout() {
        let game = GameState::new(Options::default());
        let plain = SearchAi::with_seed(config(3, false), 3).suggest_move(&game);
        let pruned = SearchAi::with_seed(config(3, true), 3).suggest_move(&game);

        assert_eq!(plain.score, pruned.score);
        assert_eq!(plain.action, pruned.action);
        assert_eq!(plain.depth_reached, 3);
        assert!(pruned.stats.total_evaluations() <= plain.stats.total_evaluations());
    }

    #[test]
    fn test_randomized_ties_keep_best_value() {
        let game = midgame();
        let expected = SearchAi::with_seed(config(2, false), 0).suggest_move(&game);

        for seed in 0..8 {
            let mut cfg = config(2, true);
            cfg.randomize_moves = true;
            let suggestion = SearchAi::with_seed(cfg, seed).suggest_move(&game);
            assert_eq!(suggestion.score, expected.score);
            let action = suggestion.action.unwrap();
            assert!(is_root_candidate(&game, action));
        }
    }

    #[test]
    fn test_attacker_takes_the_ai() {
        let mut game = GameState::empty(Options::default());
        game.set(Coord::new(0, 0), Some(Unit::new(Team::Defender, UnitType::AI)));
        game.set(Coord::new(0, 1), Some(Unit::new(Team::Attacker, UnitType::Virus)));
        game.set(Coord::new(4, 4), Some(Unit::new(Team::Attacker, UnitType::AI)));

        for alpha_beta in [false, true] {
            let suggestion = SearchAi::with_seed(config(2, alpha_beta), 7).suggest_move(&game);
            let action = suggestion.action.unwrap();
            assert_eq!(action.pair, CoordPair::from_quad(0, 1, 0, 0));
            assert_eq!(action.kind, UnitAction::Attack);
            assert_eq!(suggestion.score, Some(wargame_core::MIN_HEURISTIC_SCORE));
        }
    }

    #[test]
    fn test_zero_budget_falls_back_to_legal_move() {
        let game = midgame();
        let mut cfg = config(4, true);
        cfg.max_time = Duration::ZERO;

        let suggestion = SearchAi::with_seed(cfg, 11).suggest_move(&game);
        assert_eq!(suggestion.outcome, SearchOutcome::RandomAfterTimeout);
        assert!(suggestion.outcome.is_fallback());
        assert_eq!(suggestion.score, None);
        assert!(is_root_candidate(&game, suggestion.action.unwrap()));
    }

    #[test]
    fn test_no_moves() {
        // Defender to move with no units left on the board
        let mut game = GameState::empty(Options::default());
        game.set(Coord::new(4, 4), Some(Unit::new(Team::Attacker, UnitType::AI)));
        game.advance_turn();

        let suggestion = SearchAi::with_seed(config(2, true), 0).suggest_move(&game);
        assert_eq!(suggestion.outcome, SearchOutcome::NoMoves);
        assert!(suggestion.action.is_none());
    }

    #[test]
    fn test_stats_are_filled() {
        let game = midgame();
        let suggestion = SearchAi::with_seed(config(2, true), 0).suggest_move(&game);
        let stats = &suggestion.stats;

        assert_eq!(stats.depth_reached, 2);
        assert_eq!(stats.nodes_per_depth[&0], 1);
        assert!(stats.total_evaluations() > 0);
        assert!(stats.branching_factor > 1.0);
        assert!(stats.sorted_evaluations().iter().all(|&(depth, _)| depth <= 2));
        let first_ply = game.mobility(Team::Attacker) as u64;
        assert_eq!(stats.nodes_per_depth[&1], first_ply);
        assert!(stats.total_nodes() > 1 + first_ply);
    }

    #[test]
    fn test_timeout_after_first_round_keeps_its_move() {
        let game = midgame();
        for alpha_beta in [false, true] {
            // Checks used by a complete first round
            let clock = Clock::counted(u64::MAX);
            let one_ply = SearchAi::with_seed(config(1, alpha_beta), 0).suggest_move_with_clock(&game, &clock);
            assert_eq!(one_ply.outcome, SearchOutcome::Complete);

            let budget = Clock::counted(clock.checks());
            let suggestion = SearchAi::with_seed(config(3, alpha_beta), 0).suggest_move_with_clock(&game, &budget);

            assert_eq!(suggestion.outcome, SearchOutcome::TimedOut);
            assert!(!suggestion.outcome.is_fallback());
            assert_eq!(suggestion.depth_reached, 1);
            assert_eq!(suggestion.stats.depth_reached, 1);
            assert_eq!(suggestion.action, one_ply.action);
            assert_eq!(suggestion.score, one_ply.score);
        }
    }

    #[test]
    fn test_partial_first_round_uses_best_scored_child() {
        let game = midgame();
        let heuristic = config(1, false).heuristic;
        let scored: Vec<_> = game
            .next_state_candidates()
            .take(2)
            .map(|(state, action)| (action, heuristic.evaluate(&state)))
            .collect();
        // Attacker to move, so the lower score wins; the first on ties
        let expected = if scored[1].1 < scored[0].1 { scored[1] } else { scored[0] };

        // Root expansion, root entry, then the first two children only
        let clock = Clock::counted(4);
        let suggestion = SearchAi::with_seed(config(2, false), 0).suggest_move_with_clock(&game, &clock);

        assert_eq!(suggestion.outcome, SearchOutcome::TimedOut);
        assert_eq!(suggestion.depth_reached, 0);
        assert_eq!(suggestion.action, Some(expected.0));
        assert_eq!(suggestion.score, Some(expected.1));
    }

    #[test]
    fn test_finished_root_plays_random_unscored_move() {
        let options = Options { max_turns: Some(2), ..Options::default() };
        let mut game = GameState::new(options);
        game.advance_turn();
        game.advance_turn();
        assert!(game.is_finished());

        let suggestion = SearchAi::with_seed(config(3, true), 4).suggest_move(&game);
        assert_eq!(suggestion.outcome, SearchOutcome::RandomUnscored);
        assert!(suggestion.outcome.is_fallback());
        assert_eq!(suggestion.score, None);
        assert!(is_root_candidate(&game, suggestion.action.unwrap()));
    }

    #[test]
    fn test_from_options_seeded() {
        let options = Options {
            seed: Some(5),
            heuristic: Heuristic::Mobility,
            ..Options::default()
        };
        let ai = SearchAi::from_options(&options);
        assert_eq!(ai.config().heuristic, Heuristic::Mobility);
        assert!((ai.config().cutoff_fraction - 0.7).abs() < 1e-9);
    }
}
