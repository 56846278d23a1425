//! Payment request assembly.
//!
//! Combines merchant transaction fields with a [`ValidatedCard`]. Taking a
//! `ValidatedCard` rather than raw fields means a request can never carry a
//! card number the validator rejected.

use serde_json::json;

use crate::error::ErrorRecord;
use crate::proto::{CardPayload, Metadata, PaymentRequest};
use crate::validation::ValidatedCard;

/// Currency used when the merchant does not pick one.
pub const DEFAULT_CURRENCY: &str = "XCD";

/// Merchant-supplied fields of a payment.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDetails {
    /// Amount in minor units.
    pub amount: u64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Paying account or customer identifier.
    pub source_id: Option<String>,
    /// Receiving account identifier.
    pub destination_id: Option<String>,
    /// Merchant order reference.
    pub order_id: Option<String>,
    /// Statement description.
    pub description: Option<String>,
    /// Merchant metadata.
    pub metadata: Option<Metadata>,
}

impl TransactionDetails {
    /// Details for `amount` minor units of `currency`.
    #[must_use]
    pub fn new(amount: u64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
            source_id: None,
            destination_id: None,
            order_id: None,
            description: None,
            metadata: None,
        }
    }

    /// Details for `amount` minor units of [`DEFAULT_CURRENCY`].
    #[must_use]
    pub fn in_default_currency(amount: u64) -> Self {
        Self::new(amount, DEFAULT_CURRENCY)
    }

    /// Sets the source identifier.
    #[must_use]
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Sets the destination identifier.
    #[must_use]
    pub fn with_destination_id(mut self, destination_id: impl Into<String>) -> Self {
        self.destination_id = Some(destination_id.into());
        self
    }

    /// Sets the order reference.
    #[must_use]
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Builds the body of `POST /payments`.
///
/// The card number is copied verbatim from the validated (normalized) card;
/// amount and currency are passed through, the currency upper-cased.
///
/// # Errors
///
/// Returns a validation record if the amount is zero or the currency is not
/// three ASCII letters.
pub fn assemble_payment_request(
    details: &TransactionDetails,
    card: &ValidatedCard,
) -> Result<PaymentRequest, ErrorRecord> {
    if details.amount == 0 {
        return Err(ErrorRecord::validation("amount must be greater than zero")
            .with_details(json!({ "field": "amount" })));
    }
    let currency = details.currency.trim();
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ErrorRecord::validation(format!(
            "currency must be a three-letter ISO code, got '{currency}'"
        ))
        .with_details(json!({ "field": "currency" })));
    }

    let expiry = card.expiry();
    Ok(PaymentRequest {
        amount: details.amount,
        currency: currency.to_ascii_uppercase(),
        source_id: details.source_id.clone(),
        destination_id: details.destination_id.clone(),
        order_id: details.order_id.clone(),
        description: details.description.clone(),
        metadata: details.metadata.clone(),
        card: CardPayload {
            number: card.number().to_owned(),
            expiry_month: expiry.month_text(),
            expiry_year: expiry.year_text(),
            cvc: card.cvc().to_owned(),
            holder_name: card.holder_name().to_owned(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::validation::{CardInput, validate_card_at};
    use serde_json::Value;

    fn jane_card() -> ValidatedCard {
        validate_card_at(
            &CardInput::new("4111 1111 1111 1111", "12/30", "123", "Jane Doe"),
            2026,
            10,
        )
        .unwrap()
    }

    #[test]
    fn test_assembles_normalized_card_and_unchanged_amount() {
        let details = TransactionDetails::new(4999, "XCD").with_order_id("order-42");
        let request = assemble_payment_request(&details, &jane_card()).unwrap();

        assert_eq!(request.card.number, "4111111111111111");
        assert_eq!(request.card.expiry_month, "12");
        assert_eq!(request.card.expiry_year, "30");
        assert_eq!(request.card.cvc, "123");
        assert_eq!(request.card.holder_name, "Jane Doe");
        assert_eq!(request.amount, 4999);
        assert_eq!(request.currency, "XCD");
        assert_eq!(request.order_id.as_deref(), Some("order-42"));
    }

    #[test]
    fn test_wire_shape() {
        let mut metadata = Metadata::new();
        metadata.insert("cart".into(), Value::from(7));
        let details = TransactionDetails::in_default_currency(100).with_metadata(metadata);
        let value = serde_json::to_value(assemble_payment_request(&details, &jane_card()).unwrap())
            .unwrap();
        assert_eq!(
            value,
            json!({
                "amount": 100,
                "currency": "XCD",
                "metadata": {"cart": 7},
                "card": {
                    "number": "4111111111111111",
                    "expiryMonth": "12",
                    "expiryYear": "30",
                    "cvc": "123",
                    "holderName": "Jane Doe",
                },
            })
        );
    }

    #[test]
    fn test_currency_is_upper_cased() {
        let request =
            assemble_payment_request(&TransactionDetails::new(1, "usd"), &jane_card()).unwrap();
        assert_eq!(request.currency, "USD");
    }

    #[test]
    fn test_rejects_bad_transaction_fields() {
        let err = assemble_payment_request(&TransactionDetails::new(0, "XCD"), &jane_card())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.details(), Some(&json!({"field": "amount"})));

        let err = assemble_payment_request(&TransactionDetails::new(10, "EC$"), &jane_card())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.details(), Some(&json!({"field": "currency"})));
    }
}
