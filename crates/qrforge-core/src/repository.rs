use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

pub type Result<T> = std::result::Result<T, StorageError>;

/// A durably persisted short-code row.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeRecord {
    /// The dynamic QR-code row this code redirects for.
    pub qr_id: String,
    /// When the code was persisted.
    pub created_at: Timestamp,
}

/// The durable store owning the permanent record of issued short codes.
///
/// Implementations must reflect all previously committed allocations,
/// including ones made by other processes. The store's unique index on the
/// short-code column is the ultimate arbiter of uniqueness; the allocator's
/// checks only make collisions rare.
#[async_trait]
pub trait CodeRepository: Send + Sync + 'static {
    /// Returns `true` if `code` has already been durably allocated.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;

    /// Persists `code`. Returns `Err(Conflict)` if the code already exists.
    async fn insert(&self, code: &ShortCode, record: CodeRecord) -> Result<()>;

    /// Removes the record for `code`. Returns `true` if a record existed.
    async fn delete(&self, code: &ShortCode) -> Result<bool>;
}

#[async_trait]
impl<R: CodeRepository + ?Sized> CodeRepository for std::sync::Arc<R> {
    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        self.as_ref().exists(code).await
    }

    async fn insert(&self, code: &ShortCode, record: CodeRecord) -> Result<()> {
        self.as_ref().insert(code, record).await
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        self.as_ref().delete(code).await
    }
}
