//! Full card input validation.
//!
//! [`validate_card`] runs the raw form fields through normalization, the
//! Luhn check, brand detection and the expiry, CVC and holder-name rules. It
//! stops at the first failing field. A [`ValidatedCard`] can only be obtained
//! from here, which is what lets the request assembler trust its input.

use std::fmt;

use chrono::{Datelike, Utc};
use serde_json::json;

use crate::brand::{CardBrand, detect_brand};
use crate::error::ErrorRecord;
use crate::expiry::{Expiry, ExpiryError};
use crate::luhn::{CARD_NUMBER_LENGTH, is_valid_luhn};
use crate::normalize::{mask_card_number, normalize_digits};

/// Longest accepted cardholder name, in characters.
pub const MAX_HOLDER_NAME_LEN: usize = 100;

/// Card form fields, used to point validation errors at their input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardField {
    /// Card number input.
    Number,
    /// Expiry input.
    Expiry,
    /// Security code input.
    Cvc,
    /// Cardholder name input.
    HolderName,
}

impl CardField {
    /// Field identifier as reported in error details.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "cardNumber",
            Self::Expiry => "expiry",
            Self::Cvc => "cvc",
            Self::HolderName => "holderName",
        }
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw, user-entered card fields.
#[derive(Clone, Default)]
pub struct CardInput {
    /// Card number as typed, separators allowed.
    pub number: String,
    /// Expiry as typed, `MM/YY`.
    pub expiry: String,
    /// Security code as typed.
    pub cvc: String,
    /// Cardholder name as typed.
    pub holder_name: String,
}

impl CardInput {
    /// Creates a card input from its four raw fields.
    #[must_use]
    pub fn new(
        number: impl Into<String>,
        expiry: impl Into<String>,
        cvc: impl Into<String>,
        holder_name: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            expiry: expiry.into(),
            cvc: cvc.into(),
            holder_name: holder_name.into(),
        }
    }
}

impl fmt::Debug for CardInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardInput")
            .field("number", &mask_card_number(&self.number))
            .field("expiry", &self.expiry)
            .field("cvc", &"<redacted>")
            .field("holder_name", &self.holder_name)
            .finish()
    }
}

/// Reasons card input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CardValidationError {
    /// The card number field has no digits.
    #[error("card number is required")]
    MissingNumber,
    /// The card number is shorter than 13 or longer than 19 digits.
    #[error("card number must be between 13 and 19 digits, got {0}")]
    InvalidLength(usize),
    /// The card number fails the Luhn check.
    #[error("card number is invalid")]
    InvalidChecksum,
    /// The expiry is missing, malformed or in the past.
    #[error(transparent)]
    Expiry(#[from] ExpiryError),
    /// The security code has the wrong number of digits for the brand.
    #[error("security code must be {expected} digits")]
    InvalidCvc {
        /// Accepted lengths, e.g. `"3"` or `"3 or 4"`.
        expected: &'static str,
    },
    /// The cardholder name is blank.
    #[error("cardholder name is required")]
    MissingHolderName,
    /// The cardholder name is too long.
    #[error("cardholder name must be at most 100 characters")]
    HolderNameTooLong,
}

impl CardValidationError {
    /// The form field this error belongs to.
    #[must_use]
    pub const fn field(&self) -> CardField {
        match self {
            Self::MissingNumber | Self::InvalidLength(_) | Self::InvalidChecksum => {
                CardField::Number
            }
            Self::Expiry(_) => CardField::Expiry,
            Self::InvalidCvc { .. } => CardField::Cvc,
            Self::MissingHolderName | Self::HolderNameTooLong => CardField::HolderName,
        }
    }
}

impl From<CardValidationError> for ErrorRecord {
    fn from(err: CardValidationError) -> Self {
        Self::validation(err.to_string()).with_details(json!({ "field": err.field().as_str() }))
    }
}

/// Card fields that passed validation, in normalized form.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedCard {
    number: String,
    brand: CardBrand,
    expiry: Expiry,
    cvc: String,
    holder_name: String,
}

impl ValidatedCard {
    /// Normalized card number, digits only.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Detected brand.
    #[must_use]
    pub const fn brand(&self) -> CardBrand {
        self.brand
    }

    /// Parsed expiry.
    #[must_use]
    pub const fn expiry(&self) -> Expiry {
        self.expiry
    }

    /// Normalized security code.
    #[must_use]
    pub fn cvc(&self) -> &str {
        &self.cvc
    }

    /// Trimmed cardholder name.
    #[must_use]
    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    /// Masked card number, safe for logs.
    #[must_use]
    pub fn masked_number(&self) -> String {
        mask_card_number(&self.number)
    }
}

impl fmt::Debug for ValidatedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedCard")
            .field("number", &self.masked_number())
            .field("brand", &self.brand)
            .field("expiry", &self.expiry)
            .field("cvc", &"<redacted>")
            .field("holder_name", &self.holder_name)
            .finish()
    }
}

/// Validates card input against the current UTC month.
///
/// # Errors
///
/// Returns the first [`CardValidationError`] found, checking number, expiry,
/// CVC and holder name in that order.
pub fn validate_card(input: &CardInput) -> Result<ValidatedCard, CardValidationError> {
    let now = Utc::now();
    validate_card_at(input, now.year(), now.month())
}

/// Validates card input, treating `year`/`month` as the current month.
///
/// # Errors
///
/// Returns the first [`CardValidationError`] found, checking number, expiry,
/// CVC and holder name in that order.
pub fn validate_card_at(
    input: &CardInput,
    year: i32,
    month: u32,
) -> Result<ValidatedCard, CardValidationError> {
    let number = validate_number(&input.number)?;
    let brand = detect_brand(&number);

    let expiry = Expiry::parse(&input.expiry)?;
    if expiry.is_expired_at(year, month) {
        return Err(ExpiryError::Expired.into());
    }

    let cvc = validate_cvc(&input.cvc, brand)?;
    let holder_name = validate_holder_name(&input.holder_name)?;

    Ok(ValidatedCard {
        number,
        brand,
        expiry,
        cvc,
        holder_name,
    })
}

/// Normalizes and checks a card number on its own.
///
/// # Errors
///
/// Returns [`CardValidationError::MissingNumber`],
/// [`CardValidationError::InvalidLength`] or
/// [`CardValidationError::InvalidChecksum`].
pub fn validate_number(raw: &str) -> Result<String, CardValidationError> {
    let number = normalize_digits(raw);
    if number.is_empty() {
        return Err(CardValidationError::MissingNumber);
    }
    if !CARD_NUMBER_LENGTH.contains(&number.len()) {
        return Err(CardValidationError::InvalidLength(number.len()));
    }
    if !is_valid_luhn(&number) {
        return Err(CardValidationError::InvalidChecksum);
    }
    Ok(number)
}

/// Normalizes and checks a security code for the given brand.
///
/// # Errors
///
/// Returns [`CardValidationError::InvalidCvc`] when the digit count does not
/// match the brand.
pub fn validate_cvc(raw: &str, brand: CardBrand) -> Result<String, CardValidationError> {
    let cvc = normalize_digits(raw);
    // Reject stray characters instead of silently dropping them.
    let has_noise = raw.trim().chars().count() != cvc.len();
    if has_noise || !brand.cvc_lengths().contains(&cvc.len()) {
        let expected = match brand.cvc_lengths() {
            [4] => "4",
            [3] => "3",
            _ => "3 or 4",
        };
        return Err(CardValidationError::InvalidCvc { expected });
    }
    Ok(cvc)
}

fn validate_holder_name(raw: &str) -> Result<String, CardValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CardValidationError::MissingHolderName);
    }
    if name.chars().count() > MAX_HOLDER_NAME_LEN {
        return Err(CardValidationError::HolderNameTooLong);
    }
    Ok(name.to_owned())
}
