//! Search limits
//!
//! Deadlines, expansion budgets and cancellation are threaded into the
//! solvers as plain data and checked once per loop iteration. Nothing here
//! installs signal handlers or touches global state.

use super::result::SearchStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Limits a single solver call must respect
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    /// Stop once this instant has passed
    pub deadline: Option<Instant>,

    /// Stop after this many expansions (best-first) or steps (constructive)
    pub max_expansions: Option<usize>,

    /// Stop as soon as this flag is raised
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    /// No deadline, no budget, no cancellation
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The status a solver must stop with, if any limit has been hit
    pub fn check(&self, expanded: usize) -> Option<SearchStatus> {
        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Some(SearchStatus::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(SearchStatus::TimedOut);
        }
        if self.max_expansions.is_some_and(|max| expanded >= max) {
            return Some(SearchStatus::BudgetExhausted);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_never_stops() {
        let limits = SearchLimits::unlimited();
        assert_eq!(limits.check(0), None);
        assert_eq!(limits.check(usize::MAX), None);
    }

    #[test]
    fn test_budget() {
        let limits = SearchLimits::unlimited().with_max_expansions(3);
        assert_eq!(limits.check(2), None);
        assert_eq!(limits.check(3), Some(SearchStatus::BudgetExhausted));
    }

    #[test]
    fn test_expired_deadline() {
        let limits = SearchLimits::unlimited().with_timeout(Duration::ZERO);
        assert_eq!(limits.check(0), Some(SearchStatus::TimedOut));

        let limits = SearchLimits::unlimited().with_timeout(Duration::from_secs(3600));
        assert_eq!(limits.check(0), None);
    }

    #[test]
    fn test_cancel_flag_wins() {
        let flag = Arc::new(AtomicBool::new(false));
        let limits = SearchLimits::unlimited()
            .with_cancel_flag(flag.clone())
            .with_max_expansions(0);

        assert_eq!(limits.check(0), Some(SearchStatus::BudgetExhausted));
        flag.store(true, Ordering::Relaxed);
        assert_eq!(limits.check(0), Some(SearchStatus::Cancelled));
    }
}
