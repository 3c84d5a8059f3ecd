//! Search diagnostics
//!
//! `SearchStats` describes one move selection; `GameStats` accumulates
//! them over a whole game and is passed explicitly to whoever needs it.

use std::time::Duration;

use rustc_hash::FxHashMap;

/// Diagnostics of a single search (read-only once the search returns)
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    /// Fresh heuristic evaluations, keyed by node depth
    pub evaluations_per_depth: FxHashMap<u32, u64>,
    /// Tree size per depth when the search stopped
    pub nodes_per_depth: FxHashMap<u32, u64>,
    /// Mean child count over expanded nodes
    pub branching_factor: f64,
    /// Deepest fully propagated round
    pub depth_reached: u32,
    /// Alpha-beta cutoffs taken
    pub cutoffs: u64,
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn record_evaluation(&mut self, depth: u32) {
        *self.evaluations_per_depth.entry(depth).or_insert(0) += 1;
    }

    pub fn total_evaluations(&self) -> u64 {
        self.evaluations_per_depth.values().sum()
    }

    pub fn total_nodes(&self) -> u64 {
        self.nodes_per_depth.values().sum()
    }

    /// (depth, evaluations) sorted by depth
    pub fn sorted_evaluations(&self) -> Vec<(u32, u64)> {
        sorted(&self.evaluations_per_depth)
    }
}

/// Running totals across every computer move of a game
#[derive(Clone, Debug, Default)]
pub struct GameStats {
    pub evaluations_per_depth: FxHashMap<u32, u64>,
    pub total_seconds: f64,
    pub searches: u32,
    branching_sum: f64,
}

impl GameStats {
    pub fn record(&mut self, search: &SearchStats) {
        for (&depth, &count) in &search.evaluations_per_depth {
            *self.evaluations_per_depth.entry(depth).or_insert(0) += count;
        }
        self.total_seconds += search.elapsed.as_secs_f64();
        self.branching_sum += search.branching_factor;
        self.searches += 1;
    }

    pub fn total_evaluations(&self) -> u64 {
        self.evaluations_per_depth.values().sum()
    }

    /// Evaluations per second over the whole game
    pub fn evaluation_rate(&self) -> Option<f64> {
        (self.total_seconds > 0.0).then(|| self.total_evaluations() as f64 / self.total_seconds)
    }

    pub fn average_branching_factor(&self) -> f64 {
        if self.searches == 0 {
            0.0
        } else {
            self.branching_sum / self.searches as f64
        }
    }

    pub fn sorted_evaluations(&self) -> Vec<(u32, u64)> {
        sorted(&self.evaluations_per_depth)
    }
}

fn sorted(counts: &FxHashMap<u32, u64>) -> Vec<(u32, u64)> {
    let mut pairs: Vec<_> = counts.iter().map(|(&d, &c)| (d, c)).collect();
    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_stats_counts() {
        let mut stats = SearchStats::default();
        stats.record_evaluation(2);
        stats.record_evaluation(1);
        stats.record_evaluation(2);
        assert_eq!(stats.total_evaluations(), 3);
        assert_eq!(stats.sorted_evaluations(), vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_game_stats_accumulate() {
        let mut game = GameStats::default();
        assert_eq!(game.evaluation_rate(), None);

        let mut search = SearchStats::default();
        search.record_evaluation(1);
        search.record_evaluation(1);
        search.branching_factor = 4.0;
        search.elapsed = Duration::from_millis(500);
        game.record(&search);
        search.branching_factor = 2.0;
        game.record(&search);

        assert_eq!(game.searches, 2);
        assert_eq!(game.total_evaluations(), 4);
        assert!((game.evaluation_rate().unwrap() - 4.0).abs() < 1e-9);
        assert!((game.average_branching_factor() - 3.0).abs() < 1e-9);
    }
}
