use async_trait::async_trait;
use jiff::Timestamp;
use qrforge_core::{CacheError, ShortCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Type alias for reservation results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Default reservation lifetime.
///
/// Long enough for the caller to persist the durable row, short enough that
/// a crashed caller doesn't block a code for long.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Key namespace shared by all store implementations.
pub const KEY_PREFIX: &str = "reserved:";

/// A transient claim on a candidate short code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Identity of the requester holding the claim.
    pub holder: String,
    /// When the claim was written.
    pub reserved_at: Timestamp,
    /// Tag describing the calling flow (e.g. `"allocate_one"`).
    pub origin: String,
}

impl Reservation {
    pub fn new(holder: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            holder: holder.into(),
            reserved_at: Timestamp::now(),
            origin: origin.into(),
        }
    }
}

/// Atomic, TTL-bounded claim semantics over short-code candidates.
///
/// At most one live reservation exists per code; the backend's atomic
/// set-with-expiry is the sole enforcement mechanism. No operation retries
/// internally — callers own the retry/backoff policy.
#[async_trait]
pub trait ReservationStore: Send + Sync + 'static {
    /// Returns `true` if a live reservation exists for `code`.
    /// Side-effect-free.
    async fn is_reserved(&self, code: &ShortCode) -> Result<bool>;

    /// Claims `code` with the given expiry.
    ///
    /// Must be a single atomic set-with-expiry, never an exists-check
    /// followed by a set. An expired-but-not-yet-evicted entry is
    /// overwritten.
    async fn reserve(
        &self,
        code: &ShortCode,
        reservation: &Reservation,
        ttl: Duration,
    ) -> Result<()>;

    /// Drops the claim on `code`. Idempotent: releasing a never-reserved
    /// code is not an error.
    async fn release(&self, code: &ShortCode) -> Result<()>;
}

#[async_trait]
impl<S: ReservationStore + ?Sized> ReservationStore for std::sync::Arc<S> {
    async fn is_reserved(&self, code: &ShortCode) -> Result<bool> {
        self.as_ref().is_reserved(code).await
    }

    async fn reserve(
        &self,
        code: &ShortCode,
        reservation: &Reservation,
        ttl: Duration,
    ) -> Result<()> {
        self.as_ref().reserve(code, reservation, ttl).await
    }

    async fn release(&self, code: &ShortCode) -> Result<()> {
        self.as_ref().release(code).await
    }
}
