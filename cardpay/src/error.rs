//! Error taxonomy for cardpay operations.
//!
//! Every failure surfaced to a caller is an [`ErrorRecord`] tagged with one
//! of the closed set of [`ErrorKind`]s. Records are created once at the
//! failure site and then passed along unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of reasons an operation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The SDK is missing or has invalid configuration.
    Configuration,
    /// The gateway rejected the credentials (HTTP 401).
    Authentication,
    /// Input was rejected, either client-side or by the gateway (HTTP 400).
    Validation,
    /// The gateway answered with any other error status.
    Api,
    /// No response was received from the gateway.
    Network,
    /// A payment could not be processed.
    PaymentProcessing,
    /// A transaction or transaction list could not be retrieved.
    TransactionRetrieval,
    /// A refund could not be processed.
    RefundProcessing,
    /// Anything else.
    Unknown,
}

impl ErrorKind {
    /// Stable identifier, e.g. `"PAYMENT_PROCESSING"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "CONFIGURATION",
            Self::Authentication => "AUTHENTICATION",
            Self::Validation => "VALIDATION",
            Self::Api => "API",
            Self::Network => "NETWORK",
            Self::PaymentProcessing => "PAYMENT_PROCESSING",
            Self::TransactionRetrieval => "TRANSACTION_RETRIEVAL",
            Self::RefundProcessing => "REFUND_PROCESSING",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform error value handed to callers.
///
/// Fields are read-only once the record exists. The `details` payload is
/// opaque JSON copied from the gateway (typically its `errors` field) or
/// attached by client-side validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ErrorRecord {
    kind: ErrorKind,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
}

impl ErrorRecord {
    /// Creates a record with the given kind and message.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            status_code: None,
        }
    }

    /// Shorthand for a [`ErrorKind::Configuration`] record.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Shorthand for a [`ErrorKind::Validation`] record.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Attaches a details payload.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attaches the HTTP status code that produced this record.
    #[must_use]
    pub const fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// The error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Optional details payload.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// HTTP status code, when the failure came from a gateway response.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Returns a copy of this record under a different kind.
    pub(crate) fn relabel(self, kind: ErrorKind) -> Self {
        Self { kind, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::TransactionRetrieval).unwrap(),
            "\"TRANSACTION_RETRIEVAL\""
        );
        assert_eq!(ErrorKind::PaymentProcessing.to_string(), "PAYMENT_PROCESSING");
    }

    #[test]
    fn test_record_display_is_message() {
        let record = ErrorRecord::validation("card number is required");
        assert_eq!(record.to_string(), "card number is required");
        assert_eq!(record.kind(), ErrorKind::Validation);
        assert!(record.details().is_none());
        assert!(record.status_code().is_none());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = ErrorRecord::new(ErrorKind::Api, "boom")
            .with_status_code(502)
            .with_details(json!({"errors": []}));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "API",
                "message": "boom",
                "details": {"errors": []},
                "statusCode": 502,
            })
        );
    }

    #[test]
    fn test_relabel_keeps_payload() {
        let record = ErrorRecord::new(ErrorKind::Api, "declined")
            .with_status_code(402)
            .relabel(ErrorKind::PaymentProcessing);
        assert_eq!(record.kind(), ErrorKind::PaymentProcessing);
        assert_eq!(record.message(), "declined");
        assert_eq!(record.status_code(), Some(402));
    }
}
