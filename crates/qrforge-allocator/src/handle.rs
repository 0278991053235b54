use qrforge_core::ShortCode;
use qrforge_reservation::ReservationStore;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A successfully allocated code whose reservation is still held.
///
/// The caller must resolve the handle: [`commit`](Self::commit) once the
/// code has been durably persisted, or [`release`](Self::release) if
/// persistence failed. A handle dropped unresolved leaves cleanup to the
/// reservation TTL.
#[must_use = "resolve the reservation with `commit` or `release`"]
pub struct ReservedCode<S: ReservationStore> {
    code: ShortCode,
    store: Arc<S>,
    resolved: bool,
}

impl<S: ReservationStore> ReservedCode<S> {
    pub(crate) fn new(code: ShortCode, store: Arc<S>) -> Self {
        Self {
            code,
            store,
            resolved: false,
        }
    }

    /// The allocated code.
    pub fn code(&self) -> &ShortCode {
        &self.code
    }

    /// Marks the reservation as durably backed and returns the code.
    ///
    /// The reservation is left to lapse on its own; the durable row now owns
    /// the code, so nothing else can allocate it in the meantime.
    pub fn commit(mut self) -> ShortCode {
        self.resolved = true;
        self.code.clone()
    }

    /// Frees the reservation so other allocators stop colliding with it.
    ///
    /// Cleanup is best-effort: failures are logged and swallowed, the TTL
    /// is the backstop.
    pub async fn release(mut self) {
        self.resolved = true;
        if let Err(e) = self.store.release(&self.code).await {
            warn!(code = %self.code, error = %e, "Failed to release reservation; TTL will reclaim it");
        }
    }
}

impl<S: ReservationStore> fmt::Debug for ReservedCode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservedCode")
            .field("code", &self.code)
            .field("resolved", &self.resolved)
            .finish_non_exhaustive()
    }
}

impl<S: ReservationStore> Drop for ReservedCode<S> {
    fn drop(&mut self) {
        if !self.resolved {
            debug!(code = %self.code, "Reservation handle dropped unresolved; relying on TTL expiry");
        }
    }
}
