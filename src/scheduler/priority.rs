use crate::error::{Error, Result};
use crate::executor::task::{Priority, Task};
use std::collections::BinaryHeap;

/// Max-priority-first container of pending tasks.
///
/// Equal priorities come out in submission order. The queue does no locking
/// of its own; the pool keeps it behind its mutex and it is not part of the
/// public API.
#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<Task>,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub(crate) fn push(&mut self, task: Task) {
        self.heap.push(task);
    }

    pub(crate) fn pop_max(&mut self) -> Result<Task> {
        self.heap.pop().ok_or(Error::EmptyQueue)
    }

    /// Removes every pending task, highest priority first.
    pub(crate) fn drain(&mut self) -> Vec<Task> {
        let mut tasks = Vec::with_capacity(self.heap.len());
        while let Some(task) = self.heap.pop() {
            tasks.push(task);
        }
        tasks
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn peek_priority(&self) -> Option<Priority> {
        self.heap.peek().map(|task| task.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(priority: Priority, seq: u64) -> Task {
        Task::new(priority, seq, || {})
    }

    #[test]
    fn test_pop_max_order() {
        let mut queue = PriorityQueue::new();
        for (seq, p) in [2, 1, 3, 5, 4].into_iter().enumerate() {
            queue.push(task(p, seq as u64));
        }

        assert_eq!(queue.peek_priority(), Some(5));
        let order: Vec<Priority> = (0..5).map(|_| queue.pop_max().unwrap().priority).collect();
        assert_eq!(order, vec![5, 4, 3, 2, 1]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ties_are_fifo() {
        let mut queue = PriorityQueue::new();
        queue.push(task(7, 0));
        queue.push(task(7, 1));
        queue.push(task(9, 2));
        queue.push(task(7, 3));

        let seqs: Vec<u64> = (0..4).map(|_| queue.pop_max().unwrap().seq).collect();
        assert_eq!(seqs, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_negative_priorities() {
        let mut queue = PriorityQueue::new();
        queue.push(task(-10, 0));
        queue.push(task(0, 1));
        queue.push(task(i64::MIN, 2));

        assert_eq!(queue.pop_max().unwrap().priority, 0);
        assert_eq!(queue.pop_max().unwrap().priority, -10);
        assert_eq!(queue.pop_max().unwrap().priority, i64::MIN);
    }

    #[test]
    fn test_pop_empty() {
        let mut queue = PriorityQueue::new();
        assert!(queue.is_empty());
        assert!(matches!(queue.pop_max(), Err(Error::EmptyQueue)));
        assert_eq!(queue.peek_priority(), None);
    }

    #[test]
    fn test_drain() {
        let mut queue = PriorityQueue::new();
        queue.push(task(1, 0));
        queue.push(task(2, 1));
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].priority, 2);
        assert!(queue.is_empty());
    }
}
