use crate::error::{Error, Result};
use crate::executor::PanicStrategy;

const MAX_THREADS: usize = 1024;
const DEFAULT_FAILURE_CAPACITY: usize = 1024;

/// What happens to tasks still queued when the pool shuts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownMode {
    /// Workers keep popping until the queue is empty, then exit.
    #[default]
    Drain,
    /// Queued tasks are dropped unexecuted; only in-flight tasks finish.
    Abandon,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub num_threads: Option<usize>,
    pub thread_name_prefix: String,
    pub stack_size: Option<usize>,
    pub panic_strategy: PanicStrategy,
    pub shutdown_mode: ShutdownMode,
    /// Task failures held for readers of `failures()`; further ones are dropped and counted.
    pub failure_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_threads: None,
            thread_name_prefix: "prio-worker".to_string(),
            stack_size: Some(2 * 1024 * 1024),
            panic_strategy: PanicStrategy::default(),
            shutdown_mode: ShutdownMode::default(),
            failure_capacity: DEFAULT_FAILURE_CAPACITY,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.num_threads {
            if n == 0 {
                return Err(Error::config("num_threads must be > 0"));
            }
            if n > MAX_THREADS {
                return Err(Error::config(format!(
                    "num_threads too large (max {})",
                    MAX_THREADS
                )));
            }
        }

        if self.stack_size == Some(0) {
            return Err(Error::config("stack_size must be > 0"));
        }

        if self.failure_capacity == 0 {
            return Err(Error::config("failure_capacity must be > 0"));
        }

        Ok(())
    }

    pub fn worker_threads(&self) -> usize {
        self.num_threads
            .unwrap_or_else(|| num_cpus::get().min(MAX_THREADS))
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn num_threads(mut self, n: usize) -> Self {
        self.config.num_threads = Some(n);
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn panic_strategy(mut self, strategy: PanicStrategy) -> Self {
        self.config.panic_strategy = strategy;
        self
    }

    pub fn shutdown_mode(mut self, mode: ShutdownMode) -> Self {
        self.config.shutdown_mode = mode;
        self
    }

    pub fn failure_capacity(mut self, capacity: usize) -> Self {
        self.config.failure_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.worker_threads() >= 1);
        assert_eq!(config.shutdown_mode, ShutdownMode::Drain);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = Config::builder().num_threads(0).build().unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_too_many_threads_rejected() {
        let result = Config::builder().num_threads(MAX_THREADS + 1).build();
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_zero_stack_rejected() {
        let result = Config::builder().stack_size(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_failure_capacity_rejected() {
        let result = Config::builder().failure_capacity(0).build();
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_builder_fields() {
        let config = Config::builder()
            .num_threads(3)
            .thread_name_prefix("io")
            .shutdown_mode(ShutdownMode::Abandon)
            .panic_strategy(PanicStrategy::Isolate)
            .failure_capacity(16)
            .build()
            .unwrap();

        assert_eq!(config.worker_threads(), 3);
        assert_eq!(config.failure_capacity, 16);
        assert_eq!(config.thread_name_prefix, "io");
        assert_eq!(config.shutdown_mode, ShutdownMode::Abandon);
        assert_eq!(config.panic_strategy, PanicStrategy::Isolate);
    }
}
