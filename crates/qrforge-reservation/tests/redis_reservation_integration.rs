//! Integration tests against a real Redis, managed by test-infra.
//!
//! These need a local Docker daemon and are ignored by default; run with
//! `cargo test -- --ignored`.

use std::time::Duration;

use qrforge_core::ShortCode;
use qrforge_reservation::{Reservation, ReservationStore, RedisReservationStore};
use qrforge_test_infra::redis::RedisMaster;

/// Test fixture that manages a Redis container using test-infra.
pub struct RedisTestContainer {
    #[allow(dead_code)]
    redis: RedisMaster,
    redis_url: String,
}

impl RedisTestContainer {
    /// Starts a new Redis container with a random available port.
    pub async fn start() -> Self {
        let redis = RedisMaster::new()
            .await
            .expect("Failed to start Redis master");
        let host = redis.host().await.expect("Failed to get Redis host");
        let port = redis.port().await.expect("Failed to get Redis port");
        let redis_url = format!("redis://{}:{}", host, port);

        // Wait a moment to ensure Redis is fully ready
        tokio::time::sleep(Duration::from_millis(500)).await;

        Self { redis, redis_url }
    }

    /// Creates a new Redis connection.
    pub async fn create_connection(&self) -> redis::aio::MultiplexedConnection {
        let client =
            redis::Client::open(self.redis_url.as_str()).expect("Failed to create Redis client");
        client
            .get_multiplexed_async_connection()
            .await
            .expect("Failed to get Redis connection")
    }
}

fn test_reservation(holder: &str) -> Reservation {
    Reservation::new(holder, "integration_test")
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn reserve_then_probe_and_release() {
    let fixture = RedisTestContainer::start().await;
    let conn = fixture.create_connection().await;
    let store = RedisReservationStore::new(conn);

    let code = ShortCode::new("AB3xZ9q").unwrap();

    assert!(!store.is_reserved(&code).await.unwrap());

    store
        .reserve(&code, &test_reservation("user-1"), Duration::from_secs(300))
        .await
        .unwrap();
    assert!(store.is_reserved(&code).await.unwrap());

    store.release(&code).await.unwrap();
    assert!(!store.is_reserved(&code).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn reservation_expires_after_ttl() {
    let fixture = RedisTestContainer::start().await;
    let conn = fixture.create_connection().await;
    let store = RedisReservationStore::new(conn);

    let code = ShortCode::new("cd4Ef5g").unwrap();

    store
        .reserve(&code, &test_reservation("user-1"), Duration::from_secs(1))
        .await
        .unwrap();
    assert!(store.is_reserved(&code).await.unwrap());

    // Wait for the native Redis TTL to reclaim the key.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!store.is_reserved(&code).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn release_is_idempotent() {
    let fixture = RedisTestContainer::start().await;
    let conn = fixture.create_connection().await;
    let store = RedisReservationStore::new(conn);

    let code = ShortCode::new("gh6Jk7m").unwrap();

    // Never reserved: releasing must not error.
    store.release(&code).await.unwrap();

    store
        .reserve(&code, &test_reservation("user-1"), Duration::from_secs(300))
        .await
        .unwrap();
    store.release(&code).await.unwrap();
    store.release(&code).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a local Docker daemon"]
async fn custom_prefix_isolates_stores() {
    let fixture = RedisTestContainer::start().await;
    let conn1 = fixture.create_connection().await;
    let conn2 = fixture.create_connection().await;

    let store1 = RedisReservationStore::with_prefix(conn1, "env1:reserved:");
    let store2 = RedisReservationStore::with_prefix(conn2, "env2:reserved:");

    let code = ShortCode::new("np8Qr9s").unwrap();

    store1
        .reserve(&code, &test_reservation("user-1"), Duration::from_secs(300))
        .await
        .unwrap();

    assert!(store1.is_reserved(&code).await.unwrap());
    assert!(
        !store2.is_reserved(&code).await.unwrap(),
        "Different prefix should isolate reservations"
    );
}
