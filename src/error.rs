pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("priority queue is empty")]
    EmptyQueue,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("task failed: {0}")]
    PayloadFailure(String),

    #[error("pool is shut down")]
    ShutDown,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::InvalidConfiguration(msg.into())
    }

    pub fn payload<S: Into<String>>(msg: S) -> Self {
        Error::PayloadFailure(msg.into())
    }
}
