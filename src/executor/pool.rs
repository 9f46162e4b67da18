use super::panic_handler::{PanicHandler, TaskFailure};
use super::task::{Priority, Task};
use super::worker::{Worker, WorkerId};
use crate::config::{Config, ShutdownMode};
use crate::error::{Error, Result};
use crate::scheduler::PriorityQueue;
use crate::telemetry::{Metrics, MetricsSnapshot};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Priority used by [`PriorityPool::execute`].
pub const DEFAULT_PRIORITY: Priority = 0;

/// Everything guarded by the pool lock.
pub(crate) struct QueueState {
    pub(crate) queue: PriorityQueue,
    pub(crate) stop: bool,
    next_seq: u64,
}

/// State shared between the pool handle and its workers.
pub(crate) struct Shared {
    pub(crate) state: Mutex<QueueState>,
    pub(crate) signal: Condvar,
    pub(crate) panic_handler: PanicHandler,
    pub(crate) failures: Sender<TaskFailure>,
    pub(crate) metrics: Metrics,
    pub(crate) live_workers: AtomicUsize,
}

impl Shared {
    fn stop(&self, mode: ShutdownMode) -> Option<Vec<Task>> {
        let mut state = self.state.lock();
        if state.stop {
            return None;
        }
        state.stop = true;
        match mode {
            ShutdownMode::Drain => Some(Vec::new()),
            ShutdownMode::Abandon => Some(state.queue.drain()),
        }
    }
}

/// Outcome of [`PriorityPool::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownReport {
    /// Tasks run to completion or to a caught panic over the pool's life.
    pub executed: u64,
    /// Tasks whose payload panicked.
    pub panicked: u64,
    /// Tasks dropped unexecuted by [`ShutdownMode::Abandon`].
    pub discarded: u64,
}

/// A fixed set of worker threads running submitted closures, highest
/// priority first.
///
/// Tasks of equal priority run in submission order. The queue is unbounded
/// and [`submit`](Self::submit) never waits for a free worker. A panicking
/// task is caught, logged and reported on [`failures`](Self::failures); the
/// worker that ran it keeps going. Workers count as live from construction
/// until they exit.
///
/// Dropping the pool shuts it down.
pub struct PriorityPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<WorkerHandle>>,
    failures: Receiver<TaskFailure>,
    num_threads: usize,
    shutdown_mode: ShutdownMode,
}

struct WorkerHandle {
    id: WorkerId,
    thread: JoinHandle<()>,
}

impl PriorityPool {
    /// Starts a pool with `num_threads` workers and default settings.
    pub fn new(num_threads: usize) -> Result<Self> {
        let config = Config::builder().num_threads(num_threads).build()?;
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let num_threads = config.worker_threads();

        let (tx, rx) = bounded(config.failure_capacity);
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                queue: PriorityQueue::new(),
                stop: false,
                next_seq: 0,
            }),
            signal: Condvar::new(),
            panic_handler: PanicHandler::new(config.panic_strategy),
            failures: tx,
            metrics: Metrics::new(),
            live_workers: AtomicUsize::new(0),
        });

        let mut handles = Vec::with_capacity(num_threads);

        for id in 0..num_threads {
            let worker = Worker::new(id);
            let shared_clone = shared.clone();
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);

            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            // Counted before the thread runs so a fresh pool already reports every worker.
            shared.live_workers.fetch_add(1, Ordering::AcqRel);

            match builder.spawn(move || worker.run(&shared_clone)) {
                Ok(thread) => handles.push(WorkerHandle { id, thread }),
                Err(e) => {
                    shared.live_workers.fetch_sub(1, Ordering::AcqRel);
                    tracing::error!(worker = id, error = %e, "failed to spawn worker");
                    shared.stop(ShutdownMode::Drain);
                    shared.signal.notify_all();
                    for handle in handles {
                        let _ = handle.thread.join();
                    }
                    return Err(Error::Spawn(e));
                }
            }
        }

        tracing::debug!(
            num_threads,
            prefix = %config.thread_name_prefix,
            "priority pool started"
        );

        Ok(Self {
            shared,
            workers: Mutex::new(handles),
            failures: rx,
            num_threads,
            shutdown_mode: config.shutdown_mode,
        })
    }

    /// Queues `f` to run at `priority` and wakes one idle worker.
    ///
    /// Fails with [`Error::ShutDown`] once shutdown has begun; a task that is
    /// accepted is guaranteed to run unless the pool uses
    /// [`ShutdownMode::Abandon`].
    pub fn submit<F>(&self, priority: Priority, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.shared.state.lock();
            if state.stop {
                return Err(Error::ShutDown);
            }
            let seq = state.next_seq;
            state.next_seq += 1;
            state.queue.push(Task::new(priority, seq, f));
            self.shared.metrics.record_submit();
        }

        self.shared.signal.notify_one();
        Ok(())
    }

    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(DEFAULT_PRIORITY, f)
    }

    /// Stops accepting tasks, lets the workers finish, and joins them.
    ///
    /// With [`ShutdownMode::Drain`] every queued task runs first. Calling this
    /// again, or from a worker thread, does not block on workers that are
    /// already being joined elsewhere or on the calling thread itself.
    pub fn shutdown(&self) -> ShutdownReport {
        if let Some(abandoned) = self.shared.stop(self.shutdown_mode) {
            if !abandoned.is_empty() {
                tracing::warn!(count = abandoned.len(), "discarding queued tasks at shutdown");
                self.shared.metrics.record_discarded(abandoned.len());
            }
            // Task closures are dropped outside the lock.
            drop(abandoned);
        }

        self.shared.signal.notify_all();

        let handles = std::mem::take(&mut *self.workers.lock());
        let current = thread::current().id();

        for handle in handles {
            if handle.thread.thread().id() == current {
                tracing::warn!(
                    worker = handle.id,
                    "shutdown called from a pool worker, not joining it"
                );
                continue;
            }
            if handle.thread.join().is_err() {
                tracing::error!(worker = handle.id, "worker thread panicked");
            }
        }

        let snapshot = self.shared.metrics.snapshot();
        ShutdownReport {
            executed: snapshot.tasks_executed,
            panicked: snapshot.tasks_panicked,
            discarded: snapshot.tasks_discarded,
        }
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Tasks queued and not yet picked up by a worker.
    pub fn pending(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Priority of the task the next free worker will take.
    pub fn next_priority(&self) -> Option<Priority> {
        self.shared.state.lock().queue.peek_priority()
    }

    /// Tasks currently executing.
    pub fn in_flight(&self) -> usize {
        self.shared.metrics.in_flight()
    }

    /// Worker threads still inside their loop.
    pub fn live_workers(&self) -> usize {
        self.shared.live_workers.load(Ordering::Acquire)
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.state.lock().stop
    }

    /// True while the pool accepts work and every worker is alive.
    pub fn is_healthy(&self) -> bool {
        !self.is_shutdown() && self.live_workers() == self.num_threads
    }

    /// Receives one [`TaskFailure`] per panicked task.
    ///
    /// Every clone of the receiver draws from the same channel, so each
    /// failure is delivered to exactly one of them. At most
    /// `Config::failure_capacity` unread failures are held; later ones are
    /// dropped and counted in `MetricsSnapshot::failures_dropped`.
    pub fn failures(&self) -> Receiver<TaskFailure> {
        self.failures.clone()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }
}

impl Drop for PriorityPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for PriorityPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityPool")
            .field("num_threads", &self.num_threads)
            .field("shutdown_mode", &self.shutdown_mode)
            .field("live_workers", &self.live_workers())
            .finish()
    }
}
