use crate::CodeGenerator;
use qrforge_core::alphabet;
use qrforge_core::shortcode::{MAX_LENGTH, MIN_LENGTH};
use qrforge_core::{GeneratorError, ShortCode};
use rand::seq::SliceRandom;
use rand::Rng;

/// Digit share of a balanced code, as the fraction 3/10.
const BALANCED_DIGIT_NUMERATOR: usize = 3;
const BALANCED_DIGIT_DENOMINATOR: usize = 10;

/// A random candidate generator over the 54-symbol alphabet.
///
/// Draws are taken from `rand::rng()`, a cryptographically secure RNG, so
/// codes are not guessable from previously issued ones. Every output
/// satisfies the digit-ratio invariant: a code is never all letters, never
/// all digits, and digits never exceed 60% of its length. Draws that violate
/// the invariant are replaced by a deterministic balanced construction
/// instead of being retried, so generation never loops.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl RandomCodeGenerator {
    pub fn new() -> Self {
        Self
    }

    fn draw(rng: &mut impl Rng, length: usize) -> String {
        (0..length)
            .map(|_| alphabet::SYMBOLS[rng.random_range(0..alphabet::SYMBOLS.len())] as char)
            .collect()
    }

    /// Constructs a code with `floor(length * 0.3)` digits and the rest
    /// letters, interleaved by a Fisher-Yates shuffle.
    fn balanced(rng: &mut impl Rng, length: usize) -> String {
        let digit_target = length * BALANCED_DIGIT_NUMERATOR / BALANCED_DIGIT_DENOMINATOR;

        let mut symbols: Vec<u8> = Vec::with_capacity(length);
        for _ in 0..digit_target {
            symbols.push(alphabet::DIGITS[rng.random_range(0..alphabet::DIGITS.len())]);
        }
        for _ in digit_target..length {
            symbols.push(alphabet::LETTERS[rng.random_range(0..alphabet::LETTERS.len())]);
        }
        // `shuffle` is an unbiased Fisher-Yates permutation.
        symbols.shuffle(rng);

        symbols.into_iter().map(char::from).collect()
    }
}

/// A code is acceptable iff its digit count is strictly between 0 and
/// `length`, and the exact fraction `digits / length` does not exceed 0.6.
fn digit_ratio_ok(digits: usize, length: usize) -> bool {
    digits > 0 && digits < length && digits * 10 <= length * 6
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, length: usize) -> Result<ShortCode, GeneratorError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
            return Err(GeneratorError::InvalidLength {
                requested: length,
                min: MIN_LENGTH,
                max: MAX_LENGTH,
            });
        }

        let mut rng = rand::rng();
        let candidate = Self::draw(&mut rng, length);
        let digits = candidate.chars().filter(char::is_ascii_digit).count();

        let code = if digit_ratio_ok(digits, length) {
            candidate
        } else {
            Self::balanced(&mut rng, length)
        };

        Ok(ShortCode::new_unchecked(code))
    }
}
