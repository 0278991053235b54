use jiff::Timestamp;

/// A source of the current wall-clock time.
///
/// Reservation TTLs are evaluated against a `Clock` so expiry behavior can
/// be tested with a fake clock instead of real sleeps.
pub trait Clock: Send + Sync {
    /// Returns the current time of the clock.
    fn now(&self) -> Timestamp;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
