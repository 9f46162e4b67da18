use super::task::Priority;
use super::worker::WorkerId;
use crate::error::Error;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

/// How a worker reacts when a payload panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicStrategy {
    /// Log the panic, then abort the whole process.
    ///
    /// The process ends inside the worker, so this variant has no in-process
    /// test; callers that need it should cover it from a child process.
    Abort,
    /// Report on the failure channel without logging.
    Isolate,
    /// Log at error level and report on the failure channel.
    #[default]
    LogAndContinue,
}

/// A payload that panicked, as seen from the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub priority: Priority,
    pub worker: WorkerId,
    pub message: String,
}

impl TaskFailure {
    pub fn into_error(self) -> Error {
        Error::payload(self.message)
    }
}

#[derive(Debug)]
pub struct PanicHandler {
    strategy: PanicStrategy,
    panic_count: AtomicUsize,
}

impl PanicHandler {
    pub fn new(strategy: PanicStrategy) -> Self {
        Self {
            strategy,
            panic_count: AtomicUsize::new(0),
        }
    }

    /// Runs `f` behind an unwind boundary so a panic ends only this call.
    pub fn execute<F>(&self, priority: Priority, worker: WorkerId, f: F) -> Result<(), TaskFailure>
    where
        F: FnOnce(),
    {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(()) => Ok(()),
            Err(payload) => {
                self.panic_count.fetch_add(1, Ordering::Relaxed);

                let failure = TaskFailure {
                    priority,
                    worker,
                    message: panic_message(payload.as_ref()),
                };

                match self.strategy {
                    PanicStrategy::Abort => {
                        tracing::error!(
                            worker,
                            priority,
                            message = %failure.message,
                            "task panicked, aborting"
                        );
                        std::process::abort();
                    }
                    PanicStrategy::Isolate => {}
                    PanicStrategy::LogAndContinue => {
                        tracing::error!(
                            worker,
                            priority,
                            message = %failure.message,
                            "task panicked"
                        );
                    }
                }

                Err(failure)
            }
        }
    }

    pub fn panic_count(&self) -> usize {
        self.panic_count.load(Ordering::Relaxed)
    }
}

impl Default for PanicHandler {
    fn default() -> Self {
        Self::new(PanicStrategy::default())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
