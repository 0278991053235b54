//! Core types and traits for the Qrforge short-code allocation subsystem.
//!
//! This crate provides the shared value types, error taxonomy, and the
//! durable-store contract used by the generator, reservation, and
//! allocator crates.

pub mod alphabet;
pub mod clock;
pub mod error;
pub mod repository;
pub mod shortcode;

pub use clock::{Clock, SystemClock};
pub use error::{CacheError, CoreError, GeneratorError, StorageError};
pub use repository::{CodeRecord, CodeRepository};
pub use shortcode::ShortCode;
