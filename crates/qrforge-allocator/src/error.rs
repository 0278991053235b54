use qrforge_core::{CacheError, GeneratorError, StorageError};
use thiserror::Error;

/// Type alias for allocation results.
pub type Result<T> = std::result::Result<T, AllocateError>;

#[derive(Debug, Clone, Error)]
pub enum AllocateError {
    /// No free code was found within the attempt budget. Retryable: the
    /// caller may back off and allocate again.
    #[error("no free short code found after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// Batch size must be at least 1.
    #[error("batch count must be at least 1")]
    InvalidCount,

    #[error("generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// The reservation cache failed. Propagated fail-fast: a cache outage is
    /// never treated as "not reserved".
    #[error("reservation cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("durable store error: {0}")]
    Storage(#[from] StorageError),
}
