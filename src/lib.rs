//! A fixed-size worker pool that runs submitted closures in priority order.
//!
//! # Quick Start
//!
//! ```
//! use prio_pool::prelude::*;
//!
//! let pool = PriorityPool::new(4).unwrap();
//!
//! pool.submit(2, || println!("priority 2")).unwrap();
//! pool.submit(5, || println!("priority 5")).unwrap();
//!
//! // Runs everything still queued, then joins the workers.
//! let report = pool.shutdown();
//! assert_eq!(report.executed, 2);
//! ```
//!
//! # Behavior
//!
//! - **Priority order**: a free worker always takes the queued task with the
//!   highest priority; equal priorities run in submission order.
//! - **Unbounded queue**: submitting never waits for a worker.
//! - **Panic isolation**: a panicking task is caught and reported on
//!   [`PriorityPool::failures`]; its worker keeps running.
//! - **Draining shutdown**: by default every accepted task runs before the
//!   workers exit. [`ShutdownMode::Abandon`] drops queued work instead.

// Lint configuration
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub(crate) mod scheduler;
pub mod telemetry;

// Re-export key types at crate root
pub use config::{Config, ConfigBuilder, ShutdownMode};
pub use error::{Error, Result};
pub use executor::{PanicStrategy, Priority, PriorityPool, ShutdownReport, TaskFailure};
