use thiserror::Error;

/// Failure returned by a single work unit iteration.
///
/// Anything converted with `?` lands in [`IterationError::Fatal`]; a unit has
/// to opt in to [`IterationError::Recoverable`] explicitly.
#[derive(Error, Debug)]
pub enum IterationError {
    /// Logged and discarded. The loop continues immediately, without sleeping.
    #[error(transparent)]
    Recoverable(anyhow::Error),

    /// Logged, stops the worker and is returned from [`crate::Worker::start`].
    #[error(transparent)]
    Fatal(anyhow::Error),
}

impl IterationError {
    pub fn recoverable(error: impl Into<anyhow::Error>) -> Self {
        Self::Recoverable(error.into())
    }

    pub fn fatal(error: impl Into<anyhow::Error>) -> Self {
        Self::Fatal(error.into())
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable(_))
    }
}

impl From<anyhow::Error> for IterationError {
    fn from(error: anyhow::Error) -> Self {
        Self::Fatal(error)
    }
}

impl From<std::io::Error> for IterationError {
    fn from(error: std::io::Error) -> Self {
        Self::Fatal(error.into())
    }
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker {0} not found")]
    NotFound(String),

    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        option: &'static str,
        message: String,
    },

    /// The original error raised by the work unit.
    #[error(transparent)]
    Iteration(anyhow::Error),

    /// An error raised by a lifecycle subscriber, e.g. a failing memory sampler.
    #[error(transparent)]
    Observer(anyhow::Error),
}

impl WorkerError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => 1,
            Self::InvalidOption { .. } | Self::Iteration(_) | Self::Observer(_) => 2,
        }
    }
}
