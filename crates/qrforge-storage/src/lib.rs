//! Durable-store implementations of the [`CodeRepository`] contract.
//!
//! [`CodeRepository`]: qrforge_core::CodeRepository

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCodeStore;
pub use postgres::PostgresCodeStore;
