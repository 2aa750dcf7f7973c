use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative cancellation for separator heuristics: one shared flag plus a
/// wall-clock deadline. Heuristics poll it at every outer iteration and
/// before each convexity validation; the convexity checker polls it between
/// BFS starts. Nothing is preempted, so a heuristic may overrun the deadline
/// by the time it takes to reach its next poll.
#[derive(Clone, Debug)]
pub(crate) struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Instant,
}

impl CancelToken {
    /// A token that expires after the given budget.
    pub(crate) fn with_deadline(budget: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now() + budget,
        }
    }

    /// Cancel explicitly, ahead of the deadline.
    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed) || Instant::now() >= self.deadline
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deadline_expiry() {
        let token = CancelToken::with_deadline(Duration::from_secs(60));
        assert!(!token.is_cancelled());

        let expired = CancelToken::with_deadline(Duration::ZERO);
        assert!(expired.is_cancelled());
    }

    #[test]
    fn test_explicit_cancel_propagates_to_clones() {
        let token = CancelToken::with_deadline(Duration::from_secs(60));
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
