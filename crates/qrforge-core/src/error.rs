use thiserror::Error;

/// Errors related to the core value types.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Errors from candidate code generation.
///
/// These indicate caller programming errors and are never retryable.
#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("code length must be between {min} and {max}, got {requested}")]
    InvalidLength {
        requested: usize,
        min: usize,
        max: usize,
    },
}

/// Errors from the reservation cache.
///
/// All variants are transient infrastructure failures; callers apply their
/// own retry/backoff policy. A cache failure is never silently treated as
/// "not reserved".
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache serialization failed: {0}")]
    Serialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// Errors from the durable store.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("short code already persisted: {0}")]
    Conflict(String),
    #[error("storage returned invalid data: {0}")]
    InvalidData(String),
    #[error("storage query failed: {0}")]
    Query(String),
}
