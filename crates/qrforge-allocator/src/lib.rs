//! Allocation coordination for durably unique short codes.
//!
//! The allocator orchestrates generate → check-reservation → check-durable
//! → reserve, adapting code length to observed collision pressure, and
//! exposes single, scoped, and batch allocation entry points.

pub mod allocator;
pub mod error;
pub mod handle;
pub mod metrics;

pub use allocator::{AllocatorConfig, BatchAllocation, CodeAllocator};
pub use error::{AllocateError, Result};
pub use handle::ReservedCode;
pub use metrics::{AllocationMetrics, MetricsSnapshot};
