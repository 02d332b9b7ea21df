/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the core data model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A snapshot could not be encoded or decoded.
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing snapshot data failed.
    #[error("snapshot io failed: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot was written by an incompatible schema version.
    #[error("unsupported snapshot schema version {found} (expected {expected})")]
    SchemaVersion {
        /// The version found in the snapshot.
        found: u32,
        /// The version this build understands.
        expected: u32,
    },
}
