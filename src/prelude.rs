pub use crate::config::{Config, ConfigBuilder, ShutdownMode};
pub use crate::error::{Error, Result};
pub use crate::executor::{PanicStrategy, Priority, PriorityPool, ShutdownReport, TaskFailure};
pub use crate::telemetry::MetricsSnapshot;
