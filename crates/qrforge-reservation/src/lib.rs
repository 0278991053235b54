//! Short-lived reservation locks over candidate short codes.
//!
//! A reservation claims a candidate between the allocator's availability
//! checks and the caller's durable persistence. The TTL is the safety net
//! against reservations leaked by crashed or abandoned callers.

pub mod memory;
pub mod redis;
pub mod store;

pub use self::memory::InMemoryReservationStore;
pub use self::redis::RedisReservationStore;
pub use self::store::{Reservation, ReservationStore, Result, DEFAULT_TTL, KEY_PREFIX};
