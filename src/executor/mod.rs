//! Task execution infrastructure.
//!
//! This module provides the worker threads, the panic boundary around each
//! task, and the priority pool that ties them together.

pub mod panic_handler;
pub mod pool;
pub mod task;
pub mod worker;

pub use panic_handler::{PanicHandler, PanicStrategy, TaskFailure};
pub use pool::{PriorityPool, ShutdownReport, DEFAULT_PRIORITY};
pub use task::Priority;
pub use worker::WorkerId;
