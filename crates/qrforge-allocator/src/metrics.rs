use std::sync::atomic::{AtomicU64, Ordering};

/// Collision-pressure counters for one allocator instance.
///
/// Best-effort, in-memory only, reset on process restart. The moving
/// average feeds the adaptive length policy. Each coordinator owns (or is
/// handed) its own instance, so independently configured allocators never
/// share counters and tests can assert in isolation.
#[derive(Debug, Default)]
pub struct AllocationMetrics {
    total_attempts: AtomicU64,
    successful_allocations: AtomicU64,
    max_attempts_observed: AtomicU64,
}

/// A point-in-time copy of the counters.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub total_attempts: u64,
    pub successful_allocations: u64,
    pub average_attempts: f64,
    pub max_attempts_observed: u64,
}

impl AllocationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful allocation that took `attempts` generation
    /// attempts.
    pub fn record_success(&self, attempts: u32) {
        self.total_attempts
            .fetch_add(u64::from(attempts), Ordering::Relaxed);
        self.successful_allocations.fetch_add(1, Ordering::Relaxed);
        self.max_attempts_observed
            .fetch_max(u64::from(attempts), Ordering::Relaxed);
    }

    /// Moving average of attempts per successful allocation; 0 before the
    /// first success.
    pub fn average_attempts(&self) -> f64 {
        let successes = self.successful_allocations.load(Ordering::Relaxed);
        if successes == 0 {
            return 0.0;
        }
        self.total_attempts.load(Ordering::Relaxed) as f64 / successes as f64
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_attempts: self.total_attempts.load(Ordering::Relaxed),
            successful_allocations: self.successful_allocations.load(Ordering::Relaxed),
            average_attempts: self.average_attempts(),
            max_attempts_observed: self.max_attempts_observed.load(Ordering::Relaxed),
        }
    }
}
