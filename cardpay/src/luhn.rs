//! Luhn checksum validation for card numbers.
//!
//! Besides the checksum itself, [`is_valid_luhn`] enforces the card-number
//! length policy of 13 to 19 digits.

use std::ops::RangeInclusive;

/// Accepted card number lengths, in digits.
pub const CARD_NUMBER_LENGTH: RangeInclusive<usize> = 13..=19;

/// Returns `true` if `digits` is a 13 to 19 digit string that passes the Luhn check.
///
/// The input must already be normalized; any non-digit character makes the
/// number invalid.
///
/// ```rust
/// use cardpay::luhn::is_valid_luhn;
///
/// assert!(is_valid_luhn("4242424242424242"));
/// assert!(!is_valid_luhn("4242424242424241"));
/// assert!(!is_valid_luhn("123"));
/// ```
#[must_use]
pub fn is_valid_luhn(digits: &str) -> bool {
    if !CARD_NUMBER_LENGTH.contains(&digits.len()) {
        return false;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    luhn_sum(digits) % 10 == 0
}

/// Sums the digits right to left, doubling every second one.
fn luhn_sum(digits: &str) -> u32 {
    digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(position, byte)| {
            let digit = u32::from(byte - b'0');
            if position % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_valid_numbers() {
        for number in [
            "4242424242424242",
            "4111111111111111",
            "5105105105105100",
            "378282246310005",
            "6011111111111117",
            "4222222222222",
        ] {
            assert!(is_valid_luhn(number), "{number} should pass");
        }
    }

    #[test]
    fn test_bad_check_digit() {
        assert!(!is_valid_luhn("4242424242424241"));
        assert!(!is_valid_luhn("4111111111111112"));
    }

    #[test]
    fn test_length_policy() {
        assert!(!is_valid_luhn(""));
        assert!(!is_valid_luhn("123"));
        // Passes the checksum but is only 12 digits long.
        assert!(!is_valid_luhn("000000000000"));
        // 20 digits, checksum-valid.
        assert!(!is_valid_luhn("00000000000000000000"));
        assert!(is_valid_luhn("0000000000000"));
        assert!(is_valid_luhn("0000000000000000000"));
    }

    #[test]
    fn test_rejects_non_digits() {
        assert!(!is_valid_luhn("4242 4242 4242 4242"));
        assert!(!is_valid_luhn("424242424242424a"));
    }
}
