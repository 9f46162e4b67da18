// worker thread loop
use super::pool::Shared;
use super::task::Task;
use crossbeam_channel::TrySendError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

pub type WorkerId = usize;

pub(crate) struct Worker {
    pub id: WorkerId,
}

impl Worker {
    pub fn new(id: WorkerId) -> Self {
        Self { id }
    }

    // main loop
    pub fn run(&self, shared: &Shared) {
        let _alive = LiveGuard {
            live: &shared.live_workers,
        };
        tracing::debug!(worker = self.id, "worker started");

        loop {
            let task = {
                let mut state = shared.state.lock();
                shared
                    .signal
                    .wait_while(&mut state, |s| !s.stop && s.queue.is_empty());

                // Woken with an empty queue means stop is set: nothing left to drain.
                match state.queue.pop_max() {
                    Ok(task) => task,
                    Err(_) => break,
                }
            };

            self.execute_task(task, shared);
        }

        tracing::debug!(worker = self.id, "worker stopped");
    }

    fn execute_task(&self, task: Task, shared: &Shared) {
        let priority = task.priority;
        tracing::trace!(worker = self.id, priority, seq = task.seq, "running task");

        shared.metrics.record_start(task.submit_time.elapsed());
        let start = Instant::now();

        let result = shared
            .panic_handler
            .execute(priority, self.id, move || task.execute());

        shared.metrics.record_finish(start.elapsed(), result.is_err());

        if let Err(failure) = result {
            // The pool holds a receiver for its whole lifetime, so only Full is possible.
            if let Err(TrySendError::Full(_)) = shared.failures.try_send(failure) {
                shared.metrics.record_failure_dropped();
            }
        }
    }
}

/// Takes the worker off the live count when its loop unwinds or returns.
///
/// The pool counts a worker as live before spawning it.
struct LiveGuard<'a> {
    live: &'a AtomicUsize,
}

impl Drop for LiveGuard<'_> {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}
