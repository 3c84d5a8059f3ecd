//! Search budget: wall-clock time, or a fixed number of clock checks

use std::cell::Cell;
use std::time::{Duration, Instant};

use thiserror::Error;

/// The search budget ran out; aborts the propagation in progress
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("search time exhausted")]
pub struct Timeout;

#[derive(Clone, Copy, Debug)]
enum Budget {
    Time(Duration),
    Checks(u64),
}

/// Started when a search begins
#[derive(Debug)]
pub struct Clock {
    start: Instant,
    budget: Budget,
    checks: Cell<u64>,
}

impl Clock {
    pub fn start(limit: Duration) -> Self {
        Self::with_budget(Budget::Time(limit))
    }

    /// Budget of `allowed` successful checks instead of wall time, so an
    /// aborted search stops at the same node on every run
    pub fn counted(allowed: u64) -> Self {
        Self::with_budget(Budget::Checks(allowed))
    }

    fn with_budget(budget: Budget) -> Self {
        Self {
            start: Instant::now(),
            budget,
            checks: Cell::new(0),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Successful checks so far
    pub fn checks(&self) -> u64 {
        self.checks.get()
    }

    /// Err once the whole budget is spent
    pub fn check(&self) -> Result<(), Timeout> {
        let spent = match self.budget {
            Budget::Time(limit) => self.elapsed() >= limit,
            Budget::Checks(allowed) => self.checks.get() >= allowed,
        };
        if spent {
            return Err(Timeout);
        }
        self.checks.set(self.checks.get() + 1);
        Ok(())
    }

    /// At least `fraction` of the budget is spent
    pub fn past_fraction(&self, fraction: f64) -> bool {
        match self.budget {
            Budget::Time(limit) => self.elapsed().as_secs_f64() >= limit.as_secs_f64() * fraction,
            Budget::Checks(allowed) => self.checks.get() as f64 >= allowed as f64 * fraction,
        }
    }
}
