//! The short-code symbol set.
//!
//! Visually ambiguous characters (`0`, `O`, `I`, `l`, `1`) are excluded so
//! codes survive being read aloud or retyped from print.

/// All 54 symbols a short code may contain.
pub const SYMBOLS: &[u8] = b"abcdefghjkmnpqrstuvwxyzABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// The 46 letter symbols.
pub const LETTERS: &[u8] = b"abcdefghjkmnpqrstuvwxyzABCDEFGHJKMNPQRSTUVWXYZ";

/// The 8 digit symbols.
pub const DIGITS: &[u8] = b"23456789";

/// Returns `true` if `c` belongs to the short-code alphabet.
pub fn contains(c: char) -> bool {
    c.is_ascii() && SYMBOLS.contains(&(c as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_counts() {
        assert_eq!(SYMBOLS.len(), 54);
        assert_eq!(LETTERS.len(), 46);
        assert_eq!(DIGITS.len(), 8);
    }

    #[test]
    fn letters_and_digits_partition_the_alphabet() {
        for b in SYMBOLS {
            assert!(LETTERS.contains(b) ^ DIGITS.contains(b));
        }
    }

    #[test]
    fn ambiguous_characters_are_excluded() {
        for c in ['0', 'O', 'I', 'l', '1'] {
            assert!(!contains(c), "'{c}' should not be in the alphabet");
        }
    }

    #[test]
    fn membership_check() {
        assert!(contains('a'));
        assert!(contains('Z'));
        assert!(contains('2'));
        assert!(!contains('-'));
        assert!(!contains('é'));
    }
}
