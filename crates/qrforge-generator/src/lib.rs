//! Candidate short-code generation.

pub mod random;

use qrforge_core::{GeneratorError, ShortCode};

pub use random::RandomCodeGenerator;

/// Produces candidate short codes of a requested length.
///
/// Implementations are pure generators that don't interact with storage and
/// make no uniqueness guarantee. Deduplicating candidates against the
/// reservation cache and the durable store is the allocator's job.
pub trait CodeGenerator: Send + Sync + 'static {
    /// Generates one candidate code of exactly `length` characters.
    fn generate(&self, length: usize) -> Result<ShortCode, GeneratorError>;
}
