use crate::error::{AllocateError, Result};
use crate::handle::ReservedCode;
use crate::metrics::{AllocationMetrics, MetricsSnapshot};
use qrforge_core::{CodeRepository, ShortCode};
use qrforge_generator::CodeGenerator;
use qrforge_reservation::{Reservation, ReservationStore, DEFAULT_TTL};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Target length when no collision pressure has been observed.
const BASE_LENGTH: usize = 7;
/// Moving-average thresholds above which allocations start one or two
/// characters longer.
const ELEVATED_PRESSURE: f64 = 1.5;
const HIGH_PRESSURE: f64 = 3.0;
/// Failed attempts between in-flight length bumps.
const GROWTH_INTERVAL: u32 = 5;

#[derive(Debug, Clone, TypedBuilder)]
pub struct AllocatorConfig {
    /// Attempt budget per allocation.
    #[builder(default = 10)]
    pub max_attempts: u32,
    /// Reservation lifetime.
    #[builder(default = DEFAULT_TTL)]
    pub reservation_ttl: Duration,
    /// Hard cap for adaptive length growth.
    #[builder(default = 12)]
    pub max_length: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Coordinates generate → check-reservation → check-durable → reserve to
/// hand out durably-unique candidate short codes.
///
/// The coordinator holds no in-process lock: allocation requests may come
/// from independently scaled processes, so correctness rests entirely on
/// the reservation store's atomic set-with-expiry plus the durable store's
/// unique index. A cache or storage failure propagates immediately — it is
/// never downgraded to "available".
pub struct CodeAllocator<G, S, R> {
    generator: Arc<G>,
    reservations: Arc<S>,
    repository: Arc<R>,
    metrics: Arc<AllocationMetrics>,
    config: AllocatorConfig,
}

/// Outcome of a batch allocation.
///
/// `error` is set when the batch stopped early; `allocated` then holds the
/// codes reserved before the failure. Those reservations stay live, so the
/// caller may persist them as usual.
#[derive(Debug)]
pub struct BatchAllocation {
    pub allocated: Vec<ShortCode>,
    pub error: Option<AllocateError>,
}

impl<G, S, R> CodeAllocator<G, S, R>
where
    G: CodeGenerator,
    S: ReservationStore,
    R: CodeRepository,
{
    pub fn new(generator: G, reservations: S, repository: R) -> Self {
        Self::with_config(generator, reservations, repository, AllocatorConfig::default())
    }

    pub fn with_config(
        generator: G,
        reservations: S,
        repository: R,
        config: AllocatorConfig,
    ) -> Self {
        Self {
            generator: Arc::new(generator),
            reservations: Arc::new(reservations),
            repository: Arc::new(repository),
            metrics: Arc::new(AllocationMetrics::new()),
            config,
        }
    }

    /// Replaces the owned metrics with a shared instance, e.g. one exported
    /// by the host application.
    pub fn with_metrics(mut self, metrics: Arc<AllocationMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// A point-in-time copy of this allocator's collision statistics.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Initial target length, derived from historical collision pressure.
    fn initial_length(&self) -> usize {
        let average = self.metrics.average_attempts();
        if average > HIGH_PRESSURE {
            BASE_LENGTH + 2
        } else if average > ELEVATED_PRESSURE {
            BASE_LENGTH + 1
        } else {
            BASE_LENGTH
        }
    }

    /// Length for the attempt after `failed_attempts` consumed attempts:
    /// grows by one after every [`GROWTH_INTERVAL`] failures, capped at
    /// `max_length`.
    fn next_length(&self, failed_attempts: u32, current: usize) -> usize {
        if failed_attempts % GROWTH_INTERVAL == 0 {
            (current + 1).min(self.config.max_length)
        } else {
            current
        }
    }

    /// One run of the allocation state machine.
    async fn allocate(&self, holder: &str, origin: &str) -> Result<ShortCode> {
        let mut length = self.initial_length();
        let mut attempts = 0;

        while attempts < self.config.max_attempts {
            attempts += 1;
            let candidate = self.generator.generate(length)?;
            trace!(candidate = %candidate, attempt = attempts, "Trying candidate code");

            if self.reservations.is_reserved(&candidate).await? {
                debug!(candidate = %candidate, "Candidate already reserved");
                length = self.next_length(attempts, length);
                continue;
            }

            if self.repository.exists(&candidate).await? {
                debug!(candidate = %candidate, "Candidate already persisted");
                length = self.next_length(attempts, length);
                continue;
            }

            let reservation = Reservation::new(holder, origin);
            self.reservations
                .reserve(&candidate, &reservation, self.config.reservation_ttl)
                .await?;

            self.metrics.record_success(attempts);
            debug!(code = %candidate, attempts, "Allocated short code");
            return Ok(candidate);
        }

        warn!(attempts, "Short-code allocation exhausted its attempt budget");
        Err(AllocateError::Exhausted { attempts })
    }

    /// Allocates one code and returns its reservation handle.
    ///
    /// The caller must resolve the handle: `commit()` once the durable row
    /// is persisted, `release().await` if persistence failed.
    pub async fn allocate_one(&self, holder: &str) -> Result<ReservedCode<S>> {
        let code = self.allocate(holder, "allocate_one").await?;
        Ok(ReservedCode::new(code, Arc::clone(&self.reservations)))
    }

    /// Allocates a code, runs the caller's persist step, and releases the
    /// reservation on every failing exit of that step.
    ///
    /// The outer `Result` carries allocation failures; the inner one is the
    /// persist outcome. When the inner result is `Err`, the reservation has
    /// already been released.
    pub async fn allocate_with<T, E, F, Fut>(
        &self,
        holder: &str,
        persist: F,
    ) -> Result<std::result::Result<T, E>>
    where
        F: FnOnce(ShortCode) -> Fut + Send,
        Fut: Future<Output = std::result::Result<T, E>> + Send,
    {
        let handle = self.allocate_one(holder).await?;
        let code = handle.code().clone();
        match persist(code).await {
            Ok(value) => {
                let _ = handle.commit();
                Ok(Ok(value))
            }
            Err(e) => {
                handle.release().await;
                Ok(Err(e))
            }
        }
    }

    /// Allocates `count` codes, strictly sequentially.
    ///
    /// Sequential execution is required: each allocation's reservation must
    /// be visible to the next allocation's availability checks, otherwise
    /// the batch could hand out duplicate codes — the exact race this
    /// subsystem exists to prevent.
    ///
    /// On failure the batch stops and returns the codes allocated so far
    /// together with the error; prior successes keep their reservations and
    /// remain valid for the caller to persist.
    pub async fn allocate_batch(&self, count: usize, holder: &str) -> Result<BatchAllocation> {
        if count == 0 {
            return Err(AllocateError::InvalidCount);
        }

        let mut allocated = Vec::with_capacity(count);
        for _ in 0..count {
            match self.allocate(holder, "allocate_batch").await {
                Ok(code) => allocated.push(code),
                Err(error) => {
                    warn!(
                        allocated = allocated.len(),
                        requested = count,
                        error = %error,
                        "Batch allocation stopped early"
                    );
                    return Ok(BatchAllocation {
                        allocated,
                        error: Some(error),
                    });
                }
            }
        }

        Ok(BatchAllocation {
            allocated,
            error: None,
        })
    }

    /// Frees the reservation for `code`.
    ///
    /// Best-effort: failures are logged and swallowed, the TTL is the
    /// backstop. Callers that fail to persist an allocated code should call
    /// this to reduce contention for other allocators.
    pub async fn release(&self, code: &ShortCode) {
        if let Err(e) = self.reservations.release(code).await {
            warn!(code = %code, error = %e, "Failed to release reservation; TTL will reclaim it");
        }
    }
}
