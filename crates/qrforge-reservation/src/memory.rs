use crate::store::{Reservation, ReservationStore, Result};
use async_trait::async_trait;
use jiff::Timestamp;
use parking_lot::Mutex;
use qrforge_core::{CacheError, Clock, ShortCode, SystemClock};
use std::collections::HashMap;
use std::time::Duration;

struct Entry {
    reservation: Reservation,
    expires_at: Timestamp,
}

/// An in-memory [`ReservationStore`] honoring TTLs against an injected
/// [`Clock`].
///
/// Used by tests and local development; production deployments use
/// [`RedisReservationStore`](crate::RedisReservationStore). Expired entries
/// are evicted lazily on probe.
pub struct InMemoryReservationStore<C: Clock = SystemClock> {
    clock: C,
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryReservationStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryReservationStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryReservationStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live reservations at this instant.
    pub fn live_count(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    /// Returns the holder of the live reservation on `code`, if any.
    pub fn holder_of(&self, code: &ShortCode) -> Option<String> {
        let now = self.clock.now();
        self.entries
            .lock()
            .get(code.as_str())
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.reservation.holder.clone())
    }
}

#[async_trait]
impl<C: Clock + 'static> ReservationStore for InMemoryReservationStore<C> {
    async fn is_reserved(&self, code: &ShortCode) -> Result<bool> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        match entries.get(code.as_str()) {
            Some(entry) if entry.expires_at > now => Ok(true),
            Some(_) => {
                // Lazy eviction, mirroring how Redis reclaims expired keys.
                entries.remove(code.as_str());
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn reserve(
        &self,
        code: &ShortCode,
        reservation: &Reservation,
        ttl: Duration,
    ) -> Result<()> {
        let ttl = jiff::SignedDuration::try_from(ttl)
            .map_err(|e| CacheError::Operation(format!("invalid reservation ttl: {e}")))?;
        let expires_at = self.clock.now() + ttl;

        self.entries.lock().insert(
            code.as_str().to_string(),
            Entry {
                reservation: reservation.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn release(&self, code: &ShortCode) -> Result<()> {
        self.entries.lock().remove(code.as_str());
        Ok(())
    }
}
