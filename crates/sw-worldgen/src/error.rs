use sw_simulation::SimError;

/// Alias for `Result<T, WorldgenError>`.
pub type WorldgenResult<T> = Result<T, WorldgenError>;

/// Errors raised by the generator worker.
#[derive(Debug, thiserror::Error)]
pub enum WorldgenError {
    /// The worker thread could not be spawned.
    #[error("failed to spawn generator thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// `start` was called on a worker that is already running.
    #[error("generator already started")]
    AlreadyStarted,
}

impl From<WorldgenError> for SimError {
    fn from(err: WorldgenError) -> Self {
        SimError::Generator(err.to_string())
    }
}
