use crate::store::{Reservation, ReservationStore, Result, KEY_PREFIX};
use async_trait::async_trait;
use qrforge_core::{CacheError, ShortCode};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// A Redis-backed implementation of [`ReservationStore`].
///
/// Reservations are stored as JSON strings under `reserved:{code}` with a
/// native Redis expiry; `SET` with `EX` is a single atomic operation, so no
/// additional locking is needed even across horizontally scaled processes.
#[derive(Debug, Clone)]
pub struct RedisReservationStore {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_connection_refusal() || err.is_io_error() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisReservationStore {
    /// Creates a new Redis reservation store.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: KEY_PREFIX.to_string(),
        }
    }

    /// Creates a new Redis reservation store with a custom key prefix.
    ///
    /// Useful for isolating environments sharing one Redis instance.
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Generates the cache key for a short code.
    fn key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }
}

#[async_trait]
impl ReservationStore for RedisReservationStore {
    async fn is_reserved(&self, code: &ShortCode) -> Result<bool> {
        let key = self.key(code);
        trace!(code = %code, "Probing reservation in Redis");

        let mut conn = self.conn.clone();
        match conn.exists::<_, bool>(&key).await {
            Ok(reserved) => Ok(reserved),
            Err(e) => {
                warn!(code = %code, error = %e, "Redis error on reservation probe");
                Err(map_redis_error("failed to probe reservation in Redis", e))
            }
        }
    }

    async fn reserve(
        &self,
        code: &ShortCode,
        reservation: &Reservation,
        ttl: Duration,
    ) -> Result<()> {
        let key = self.key(code);
        trace!(code = %code, holder = %reservation.holder, "Writing reservation to Redis");

        let json = serde_json::to_string(reservation).map_err(|e| {
            warn!(code = %code, error = %e, "Failed to serialize reservation");
            CacheError::Serialization(format!("failed to serialize reservation: {e}"))
        })?;

        let mut conn = self.conn.clone();
        match conn.set_ex::<_, _, ()>(&key, json, ttl.as_secs()).await {
            Ok(()) => {
                debug!(code = %code, holder = %reservation.holder, "Reserved code in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to write reservation to Redis");
                Err(map_redis_error("failed to write reservation to Redis", e))
            }
        }
    }

    async fn release(&self, code: &ShortCode) -> Result<()> {
        let key = self.key(code);
        trace!(code = %code, "Releasing reservation in Redis");

        let mut conn = self.conn.clone();
        match conn.del::<_, ()>(&key).await {
            Ok(()) => {
                debug!(code = %code, "Released reservation in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to release reservation in Redis");
                Err(map_redis_error("failed to delete reservation from Redis", e))
            }
        }
    }
}
