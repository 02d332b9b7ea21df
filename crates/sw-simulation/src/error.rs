use std::time::Duration;

use sw_core::CoreError;

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors surfaced by the simulation core.
///
/// Only startup and shutdown can fail; the tick loop itself handles every
/// runtime condition locally.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Seeding gave up after too many non-walkable picks in a row.
    #[error("no walkable tile found after {attempts} attempts while seeding entity {seeded} of {requested}")]
    SeedingExhausted {
        /// Consecutive picks tried for the failing entity.
        attempts: u32,
        /// Entities placed before giving up.
        seeded: usize,
        /// Entities asked for.
        requested: usize,
    },

    /// Seeding was asked for entities but the store holds no regions.
    #[error("cannot seed entities: no resident regions")]
    NoResidentRegions,

    /// The generator output closed during the startup drain.
    #[error("generator disconnected after {received} of {expected} initial regions")]
    GeneratorDisconnected {
        /// Initial regions installed before the disconnect.
        received: usize,
        /// Initial regions requested.
        expected: usize,
    },

    /// A startup drain wait exceeded the configured timeout.
    #[error("timed out after {waited:?} waiting for initial region {received} of {expected}")]
    StartupTimeout {
        /// Length of the wait that expired.
        waited: Duration,
        /// Initial regions installed before the timeout.
        received: usize,
        /// Initial regions requested.
        expected: usize,
    },

    /// The generator failed to start or run.
    #[error("generator error: {0}")]
    Generator(String),

    /// A snapshot could not be written.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A core data model error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
