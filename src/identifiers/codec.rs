//! Base-64 codec between primary keys and short codes.
//!
//! Short codes are the big-endian base-64 digits of the primary key over a
//! URL-safe alphabet. Only the first [`CODE_LENGTH`] characters are
//! meaningful; some shared links carry a longer code whose tail is noise.

use crate::error::{Error, Result};

/// Code alphabet, in digit order
pub const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Number of leading characters `decode` reads
pub const CODE_LENGTH: usize = 11;

const BASE: u64 = 64;

/// Encode a primary key as a short code
pub fn encode(pk: u64) -> String {
    if pk == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::new();
    let mut n = pk;
    while n > 0 {
        digits.push(ALPHABET[(n % BASE) as usize]);
        n /= BASE;
    }
    digits.reverse();

    // Every byte comes from ALPHABET, which is ASCII
    digits.into_iter().map(char::from).collect()
}

/// Decode a short code into a primary key.
///
/// Characters past [`CODE_LENGTH`] are ignored without validation.
pub fn decode(code: &str) -> Result<u64> {
    if code.is_empty() {
        return Err(Error::format("empty short code"));
    }

    let mut pk: u64 = 0;
    for ch in code.chars().take(CODE_LENGTH) {
        let digit = digit_value(ch)
            .ok_or_else(|| Error::format(format!("invalid character {:?} in short code {:?}", ch, code)))?;

        pk = pk
            .checked_mul(BASE)
            .and_then(|n| n.checked_add(digit))
            .ok_or_else(|| Error::format(format!("short code {:?} is out of range", code)))?;
    }

    Ok(pk)
}

fn digit_value(ch: char) -> Option<u64> {
    match ch {
        'A'..='Z' => Some(ch as u64 - 'A' as u64),
        'a'..='z' => Some(ch as u64 - 'a' as u64 + 26),
        '0'..='9' => Some(ch as u64 - '0' as u64 + 52),
        '-' => Some(62),
        '_' => Some(63),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(decode("B1LbfVPlwIA").unwrap(), 2110901750722920960);
        assert_eq!(decode("B-fKL9qpeab").unwrap(), 2278584739065882267);
        assert_eq!(encode(2110901750722920960), "B1LbfVPlwIA");
        assert_eq!(encode(2278584739065882267), "B-fKL9qpeab");
    }

    #[test]
    fn test_long_code_is_truncated() {
        assert_eq!(
            decode("CCQQsCXjOaBfS3I2PpqsNkxElV9DXj61vzo5xs0").unwrap(),
            2346448800803776129
        );
    }

    #[test]
    fn test_suffix_is_not_validated() {
        assert_eq!(decode("B1LbfVPlwIA?!*").unwrap(), 2110901750722920960);
    }

    #[test]
    fn test_zero() {
        assert_eq!(encode(0), "A");
        assert_eq!(decode("A").unwrap(), 0);
    }

    #[test]
    fn test_invalid_character() {
        assert!(matches!(decode("B1Lb!VPlwIA"), Err(Error::Format(_))));
        assert!(matches!(decode(""), Err(Error::Format(_))));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(decode("__________"), Ok(_)));
        assert!(matches!(decode("___________"), Err(Error::Format(_))));
    }

    #[test]
    fn test_alphabet_matches_digit_value() {
        for (i, b) in ALPHABET.iter().enumerate() {
            assert_eq!(digit_value(*b as char), Some(i as u64));
        }
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(pk in any::<u64>()) {
            prop_assert_eq!(decode(&encode(pk)).unwrap(), pk);
        }

        #[test]
        fn prop_encode_inverts_decode(code in "[B-Za-z0-9_-][A-Za-z0-9_-]{0,9}") {
            prop_assert_eq!(encode(decode(&code).unwrap()), code);
        }

        #[test]
        fn prop_canonical_length_codes_round_trip(code in "[B-O][A-Za-z0-9_-]{10}") {
            prop_assert_eq!(code.len(), CODE_LENGTH);
            prop_assert_eq!(encode(decode(&code).unwrap()), code);
        }
    }
}
