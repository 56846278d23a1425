//! Card input normalization and display formatting.
//!
//! Everything the gateway receives is built from [`normalize_digits`] output.
//! The grouped form produced by [`format_card_number`] is for display only.

/// Number of digits per display group.
const GROUP_SIZE: usize = 4;

/// Removes every character that is not an ASCII decimal digit.
///
/// Empty input yields an empty string. The function is idempotent.
///
/// # Example
///
/// ```rust
/// use cardpay::normalize::normalize_digits;
///
/// assert_eq!(normalize_digits("4242 4242-4242.4242"), "4242424242424242");
/// assert_eq!(normalize_digits(""), "");
/// ```
#[must_use]
pub fn normalize_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Formats a card number as groups of four digits separated by a single space.
///
/// The input is normalized first, so re-normalizing the output always yields
/// the original digit string.
///
/// ```rust
/// use cardpay::normalize::format_card_number;
///
/// assert_eq!(format_card_number("4111111111111111"), "4111 1111 1111 1111");
/// assert_eq!(format_card_number("37828"), "3782 8");
/// ```
#[must_use]
pub fn format_card_number(raw: &str) -> String {
    let digits = normalize_digits(raw);
    let mut formatted = String::with_capacity(digits.len() + digits.len() / GROUP_SIZE);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && i % GROUP_SIZE == 0 {
            formatted.push(' ');
        }
        formatted.push(digit);
    }
    formatted
}

/// Returns the last four digits of a card number (fewer if the number is short).
#[must_use]
pub fn last_four(raw: &str) -> String {
    let digits = normalize_digits(raw);
    let start = digits.len().saturating_sub(GROUP_SIZE);
    digits[start..].to_owned()
}

/// Masks a card number down to its last four digits, e.g. `•••• 4242`.
///
/// Safe to write to logs and receipts.
#[must_use]
pub fn mask_card_number(raw: &str) -> String {
    format!("•••• {}", last_four(raw))
}
