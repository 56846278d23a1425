//! Card expiry parsing.
//!
//! The SDK uses a two-digit year everywhere: users type `MM/YY`, and the
//! gateway receives `expiryMonth: "MM"` and `expiryYear: "YY"`. Four-digit
//! years are rejected rather than silently truncated.

use std::fmt;

use chrono::{Datelike, Utc};

/// Century added to the two-digit year for date comparisons.
const CENTURY: u16 = 2000;

/// Errors produced while parsing or checking an expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExpiryError {
    /// Nothing was entered.
    #[error("expiry date is required")]
    Empty,
    /// The text is not `MM/YY`.
    #[error("expiry date must be in MM/YY format")]
    Malformed,
    /// The month is outside 1-12.
    #[error("expiry month must be between 01 and 12, got {0}")]
    InvalidMonth(u8),
    /// The card expired before the current month.
    #[error("card has expired")]
    Expired,
}

/// A card expiry month and two-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Expiry {
    month: u8,
    year: u8,
}

impl Expiry {
    /// Creates an expiry from a month (1-12) and a two-digit year (0-99).
    ///
    /// # Errors
    ///
    /// Returns [`ExpiryError::InvalidMonth`] for months outside 1-12 and
    /// [`ExpiryError::Malformed`] for years above 99.
    pub const fn new(month: u8, year: u8) -> Result<Self, ExpiryError> {
        if month < 1 || month > 12 {
            return Err(ExpiryError::InvalidMonth(month));
        }
        if year > 99 {
            return Err(ExpiryError::Malformed);
        }
        Ok(Self { month, year })
    }

    /// Parses user-entered expiry text.
    ///
    /// Accepts `MM/YY`, `M/YY`, `MM-YY` and `MMYY`, ignoring whitespace.
    ///
    /// ```rust
    /// use cardpay::expiry::Expiry;
    ///
    /// let expiry = Expiry::parse("12/30").unwrap();
    /// assert_eq!(expiry.month_text(), "12");
    /// assert_eq!(expiry.year_text(), "30");
    /// assert!(Expiry::parse("12/2030").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ExpiryError`] when the text is empty, malformed or has an
    /// out-of-range month.
    pub fn parse(raw: &str) -> Result<Self, ExpiryError> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(ExpiryError::Empty);
        }

        let (month, year) = match compact.find(['/', '-']) {
            Some(idx) => (&compact[..idx], &compact[idx + 1..]),
            None if compact.len() == 4 && compact.is_ascii() => compact.split_at(2),
            None => return Err(ExpiryError::Malformed),
        };

        if month.is_empty() || month.len() > 2 || !is_digits(month) {
            return Err(ExpiryError::Malformed);
        }
        if year.len() != 2 || !is_digits(year) {
            return Err(ExpiryError::Malformed);
        }

        let month: u8 = month.parse().map_err(|_| ExpiryError::Malformed)?;
        let year: u8 = year.parse().map_err(|_| ExpiryError::Malformed)?;
        Self::new(month, year)
    }

    /// Month, 1-12.
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Two-digit year, 0-99.
    #[must_use]
    pub const fn year(&self) -> u8 {
        self.year
    }

    /// Zero-padded month, e.g. `"03"`.
    #[must_use]
    pub fn month_text(&self) -> String {
        format!("{:02}", self.month)
    }

    /// Zero-padded two-digit year, e.g. `"30"`.
    #[must_use]
    pub fn year_text(&self) -> String {
        format!("{:02}", self.year)
    }

    /// Four-digit calendar year.
    #[must_use]
    pub fn full_year(&self) -> u16 {
        CENTURY + u16::from(self.year)
    }

    /// Returns `true` if the card expired before the given year and month.
    ///
    /// A card stays valid through its expiry month.
    #[must_use]
    pub fn is_expired_at(&self, year: i32, month: u32) -> bool {
        (i32::from(self.full_year()), u32::from(self.month)) < (year, month)
    }

    /// Returns `true` if the card expired before the current UTC month.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let now = Utc::now();
        self.is_expired_at(now.year(), now.month())
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year)
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepted_forms() {
        for raw in ["12/30", " 12 / 30 ", "12-30", "1230"] {
            let expiry = Expiry::parse(raw).unwrap();
            assert_eq!((expiry.month(), expiry.year()), (12, 30), "{raw}");
        }
        let expiry = Expiry::parse("3/27").unwrap();
        assert_eq!(expiry.month_text(), "03");
        assert_eq!(expiry.to_string(), "03/27");
    }

    #[test]
    fn test_parse_rejects_four_digit_year() {
        assert_eq!(Expiry::parse("12/2030"), Err(ExpiryError::Malformed));
        assert_eq!(Expiry::parse("122030"), Err(ExpiryError::Malformed));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Expiry::parse(""), Err(ExpiryError::Empty));
        assert_eq!(Expiry::parse("   "), Err(ExpiryError::Empty));
        assert_eq!(Expiry::parse("12/"), Err(ExpiryError::Malformed));
        assert_eq!(Expiry::parse("/30"), Err(ExpiryError::Malformed));
        assert_eq!(Expiry::parse("ab/cd"), Err(ExpiryError::Malformed));
        assert_eq!(Expiry::parse("123"), Err(ExpiryError::Malformed));
        assert_eq!(Expiry::parse("13/30"), Err(ExpiryError::InvalidMonth(13)));
        assert_eq!(Expiry::parse("00/30"), Err(ExpiryError::InvalidMonth(0)));
    }

    #[test]
    fn test_expired_comparison() {
        let expiry = Expiry::new(6, 26).unwrap();
        assert!(!expiry.is_expired_at(2026, 5));
        assert!(!expiry.is_expired_at(2026, 6));
        assert!(expiry.is_expired_at(2026, 7));
        assert!(expiry.is_expired_at(2027, 1));
        assert_eq!(expiry.full_year(), 2026);
    }
}
