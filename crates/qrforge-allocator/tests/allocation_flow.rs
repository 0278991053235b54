//! End-to-end allocation flows over the real generator and the in-memory
//! reservation and durable stores.

use async_trait::async_trait;
use jiff::Timestamp;
use qrforge_allocator::{AllocateError, CodeAllocator};
use qrforge_core::repository::{CodeRecord, CodeRepository};
use qrforge_core::{ShortCode, StorageError};
use qrforge_generator::RandomCodeGenerator;
use qrforge_reservation::{InMemoryReservationStore, ReservationStore};
use qrforge_storage::InMemoryCodeStore;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

type TestAllocator = CodeAllocator<
    RandomCodeGenerator,
    Arc<InMemoryReservationStore>,
    Arc<InMemoryCodeStore>,
>;

fn test_setup() -> (TestAllocator, Arc<InMemoryReservationStore>, Arc<InMemoryCodeStore>) {
    let reservations = Arc::new(InMemoryReservationStore::new());
    let repository = Arc::new(InMemoryCodeStore::new());
    let allocator = CodeAllocator::new(
        RandomCodeGenerator::new(),
        Arc::clone(&reservations),
        Arc::clone(&repository),
    );
    (allocator, reservations, repository)
}

fn record(qr_id: &str) -> CodeRecord {
    CodeRecord {
        qr_id: qr_id.to_string(),
        created_at: Timestamp::UNIX_EPOCH,
    }
}

#[tokio::test]
async fn first_allocation_succeeds_on_the_first_attempt() {
    let (allocator, reservations, _) = test_setup();

    let handle = allocator.allocate_one("user-1").await.unwrap();
    assert_eq!(handle.code().len(), 7);
    assert!(reservations.is_reserved(handle.code()).await.unwrap());
    assert_eq!(
        reservations.holder_of(handle.code()),
        Some("user-1".to_string())
    );

    let snapshot = allocator.metrics();
    assert_eq!(snapshot.successful_allocations, 1);
    assert_eq!(snapshot.average_attempts, 1.0);
    assert_eq!(snapshot.max_attempts_observed, 1);

    let _ = handle.commit();
}

#[tokio::test]
async fn batch_returns_distinct_reserved_codes() {
    let (allocator, reservations, _) = test_setup();

    let batch = allocator.allocate_batch(25, "user-1").await.unwrap();
    assert!(batch.error.is_none());
    assert_eq!(batch.allocated.len(), 25);

    let distinct: HashSet<&str> = batch.allocated.iter().map(ShortCode::as_str).collect();
    assert_eq!(distinct.len(), 25, "batch produced duplicate codes");

    for code in &batch.allocated {
        assert!(
            reservations.is_reserved(code).await.unwrap(),
            "'{code}' was returned without a live reservation"
        );
    }
    assert_eq!(reservations.live_count(), 25);
}

#[tokio::test]
async fn released_code_is_free_again() {
    let (allocator, reservations, _) = test_setup();

    let handle = allocator.allocate_one("user-1").await.unwrap();
    let code = handle.code().clone();
    handle.release().await;

    assert!(!reservations.is_reserved(&code).await.unwrap());

    // Releasing through the allocator is idempotent, even when nothing is held.
    allocator.release(&code).await;
    allocator.release(&code).await;
}

#[tokio::test]
async fn allocate_with_persists_and_keeps_the_reservation() {
    let (allocator, reservations, repository) = test_setup();

    let outcome = allocator
        .allocate_with("user-1", |code| {
            let repository = Arc::clone(&repository);
            async move {
                repository.insert(&code, record("qr-1")).await?;
                Ok::<_, StorageError>(code)
            }
        })
        .await
        .unwrap();

    let code = outcome.unwrap();
    assert!(repository.exists(&code).await.unwrap());
    // The durable row owns the code now; the reservation lapses on its own.
    assert!(reservations.is_reserved(&code).await.unwrap());
}

#[tokio::test]
async fn allocate_with_releases_on_persist_failure() {
    let (allocator, reservations, _) = test_setup();

    let seen = Arc::new(std::sync::Mutex::new(None));
    let outcome = allocator
        .allocate_with("user-1", |code| {
            let seen = Arc::clone(&seen);
            async move {
                *seen.lock().unwrap() = Some(code);
                Err::<(), StorageError>(StorageError::Unavailable("db down".to_string()))
            }
        })
        .await
        .unwrap();

    assert!(outcome.is_err());
    let code = seen.lock().unwrap().clone().unwrap();
    assert!(
        !reservations.is_reserved(&code).await.unwrap(),
        "reservation should be released when the persist step fails"
    );
}

/// A durable store with a limited number of free codes: once the budget is
/// spent, every candidate reads as already taken.
struct SaturatingRepository {
    free_budget: AtomicI64,
}

impl SaturatingRepository {
    fn new(free_budget: i64) -> Self {
        Self {
            free_budget: AtomicI64::new(free_budget),
        }
    }
}

#[async_trait]
impl CodeRepository for SaturatingRepository {
    async fn exists(&self, _code: &ShortCode) -> Result<bool, StorageError> {
        Ok(self.free_budget.fetch_sub(1, Ordering::SeqCst) <= 0)
    }

    async fn insert(&self, _code: &ShortCode, _record: CodeRecord) -> Result<(), StorageError> {
        Ok(())
    }

    async fn delete(&self, _code: &ShortCode) -> Result<bool, StorageError> {
        Ok(false)
    }
}

#[tokio::test]
async fn batch_keeps_earlier_successes_when_the_code_space_saturates() {
    let reservations = Arc::new(InMemoryReservationStore::new());
    let allocator = CodeAllocator::new(
        RandomCodeGenerator::new(),
        Arc::clone(&reservations),
        SaturatingRepository::new(3),
    );

    let batch = allocator.allocate_batch(5, "user-1").await.unwrap();
    assert_eq!(batch.allocated.len(), 3);
    assert!(matches!(
        batch.error,
        Some(AllocateError::Exhausted { attempts: 10 })
    ));

    // Prior successes still hold live reservations and stay persistable.
    for code in &batch.allocated {
        assert!(reservations.is_reserved(code).await.unwrap());
    }
}
