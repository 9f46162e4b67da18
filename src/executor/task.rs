//! Task representation and execution.

use std::cmp::Ordering;
use std::fmt;
use std::time::Instant;

/// Scheduling priority. Higher values run first.
pub type Priority = i64;

/// Internal task representation
pub(crate) struct Task {
    pub(crate) priority: Priority,
    pub(crate) seq: u64,
    pub(crate) func: Box<dyn FnOnce() + Send + 'static>,
    pub(crate) submit_time: Instant,
}

impl Task {
    pub fn new<F>(priority: Priority, seq: u64, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Task {
            priority,
            seq,
            func: Box::new(f),
            submit_time: Instant::now(),
        }
    }

    /// Execute the task
    pub fn execute(self) {
        (self.func)();
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Task {}

impl PartialOrd for Task {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Max-heap order: larger priority first, then the earlier submission.
impl Ord for Task {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("priority", &self.priority)
            .field("seq", &self.seq)
            .field("submit_time", &self.submit_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
    use std::sync::Arc;

    #[test]
    fn test_higher_priority_is_greater() {
        let low = Task::new(1, 0, || {});
        let high = Task::new(5, 1, || {});
        assert!(high > low);
    }

    #[test]
    fn test_earlier_seq_wins_tie() {
        let first = Task::new(3, 0, || {});
        let second = Task::new(3, 1, || {});
        assert!(first > second);
    }

    #[test]
    fn test_execute_runs_closure() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        Task::new(0, 0, move || flag.store(true, AtomicOrdering::SeqCst)).execute();
        assert!(ran.load(AtomicOrdering::SeqCst));
    }
}
