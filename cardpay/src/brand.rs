//! Card brand detection from issuer prefixes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Card network associated with a card number prefix.
///
/// Derived from the card number on every change, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    /// Visa (prefix `4`).
    Visa,
    /// Mastercard (prefixes `51`-`55`).
    Mastercard,
    /// American Express (prefixes `34`, `37`).
    Amex,
    /// Discover (prefixes `6011`, `65`, `644`-`649`, `622`).
    Discover,
    /// No known prefix matched.
    #[default]
    #[serde(other)]
    Unknown,
}

impl CardBrand {
    /// Stable lowercase identifier, as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Discover => "discover",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable brand name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::Amex => "American Express",
            Self::Discover => "Discover",
            Self::Unknown => "Unknown",
        }
    }

    /// Security code lengths accepted for this brand.
    #[must_use]
    pub const fn cvc_lengths(self) -> &'static [usize] {
        match self {
            Self::Amex => &[4],
            Self::Visa | Self::Mastercard | Self::Discover => &[3],
            Self::Unknown => &[3, 4],
        }
    }

    /// Returns `true` unless the brand is [`CardBrand::Unknown`].
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detects the card brand of a normalized digit string.
///
/// Patterns are tested in a fixed order and the first match wins: Visa,
/// Mastercard, Amex, Discover. Empty or non-digit input is
/// [`CardBrand::Unknown`]. Works on partial numbers, so it can run on every
/// keystroke.
///
/// ```rust
/// use cardpay::brand::{CardBrand, detect_brand};
///
/// assert_eq!(detect_brand("4242424242424242"), CardBrand::Visa);
/// assert_eq!(detect_brand("1111"), CardBrand::Unknown);
/// ```
#[must_use]
pub fn detect_brand(digits: &str) -> CardBrand {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return CardBrand::Unknown;
    }

    if digits.starts_with('4') {
        return CardBrand::Visa;
    }

    let first_two = leading_number(digits, 2);
    if first_two.is_some_and(|p| (51..=55).contains(&p)) {
        return CardBrand::Mastercard;
    }
    if matches!(first_two, Some(34 | 37)) {
        return CardBrand::Amex;
    }

    let first_three = leading_number(digits, 3);
    if digits.starts_with("6011")
        || first_two == Some(65)
        || first_three.is_some_and(|p| (644..=649).contains(&p))
        || first_three == Some(622)
    {
        return CardBrand::Discover;
    }

    CardBrand::Unknown
}

/// Parses the first `len` digits as a number, if there are that many.
fn leading_number(digits: &str, len: usize) -> Option<u32> {
    digits.get(..len).and_then(|prefix| prefix.parse().ok())
}
