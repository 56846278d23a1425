//! Local card check for `cardpay validate`.

use cardpay::brand::detect_brand;
use cardpay::expiry::Expiry;
use cardpay::normalize::{format_card_number, mask_card_number, normalize_digits};
use cardpay::validation::{validate_cvc, validate_number};
use serde::Serialize;

/// Outcome of one field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T, E: ToString> From<Result<T, E>> for FieldCheck {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self {
                valid: true,
                error: None,
            },
            Err(err) => Self {
                valid: false,
                error: Some(err.to_string()),
            },
        }
    }
}

/// What `cardpay validate` prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardReport {
    pub brand: &'static str,
    pub formatted: String,
    pub masked: String,
    pub number: FieldCheck,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<FieldCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvc: Option<FieldCheck>,
}

/// Checks a card number and, if given, an expiry and CVC.
pub fn card_report(number: &str, expiry: Option<&str>, cvc: Option<&str>) -> CardReport {
    let digits = normalize_digits(number);
    let brand = detect_brand(&digits);
    CardReport {
        brand: brand.as_str(),
        formatted: format_card_number(&digits),
        masked: mask_card_number(&digits),
        number: validate_number(number).into(),
        expiry: expiry.map(|raw| {
            Expiry::parse(raw)
                .and_then(|expiry| {
                    if expiry.is_expired() {
                        Err(cardpay::expiry::ExpiryError::Expired)
                    } else {
                        Ok(expiry)
                    }
                })
                .into()
        }),
        cvc: cvc.map(|raw| validate_cvc(raw, brand).into()),
    }
}
