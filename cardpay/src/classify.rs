//! Transport error classification.
//!
//! Raw transport outcomes are turned into [`ErrorRecord`]s exactly once, at
//! the point where the outcome is first observed. [`classify`] applies the
//! generic policy; [`classify_for`] additionally re-labels `API` and
//! `UNKNOWN` results with the kind owned by the [`Operation`] in progress.
//! Authentication, validation and network failures keep their generic kind
//! whatever the operation.

use std::fmt;

use serde_json::{Value, json};

use crate::error::{ErrorKind, ErrorRecord};

/// Message for HTTP 401 responses.
pub const AUTHENTICATION_FAILED_MESSAGE: &str =
    "Authentication failed. Check your API key and merchant ID.";

/// Fallback message for HTTP 400 responses without a `message` field.
pub const VALIDATION_FAILED_MESSAGE: &str = "The request was rejected by payment gateway validation.";

/// Fallback message for other error responses without a `message` field.
pub const API_ERROR_MESSAGE: &str = "The payment gateway returned an error.";

/// Message for requests that never got a response.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to reach the payment gateway. Check your network connection.";

/// Fallback message for unexpected failures without a message of their own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// What the transport observed for a single request.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOutcome {
    /// The gateway answered with a status code and body.
    Response {
        /// HTTP status code.
        status: u16,
        /// Response body, `Value::Null` when empty.
        body: Value,
    },
    /// The request was attempted but no response came back.
    NoResponse {
        /// Description of the connectivity failure, kept in `details`.
        cause: String,
    },
    /// Anything else, e.g. a request that could not be built or a body that
    /// could not be decoded.
    Unexpected {
        /// The failure's own message, if it had one.
        message: Option<String>,
    },
}

/// Gateway operation in whose context a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `POST /payments`
    ProcessPayment,
    /// `GET /transactions/{id}`
    GetTransaction,
    /// `GET /transactions`
    ListTransactions,
    /// `POST /refunds`
    ProcessRefund,
}

impl Operation {
    /// Kind that replaces `API` and `UNKNOWN` for failures of this operation.
    #[must_use]
    pub const fn error_kind(self) -> ErrorKind {
        match self {
            Self::ProcessPayment => ErrorKind::PaymentProcessing,
            Self::GetTransaction | Self::ListTransactions => ErrorKind::TransactionRetrieval,
            Self::ProcessRefund => ErrorKind::RefundProcessing,
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ProcessPayment => "process_payment",
            Self::GetTransaction => "get_transaction",
            Self::ListTransactions => "list_transactions",
            Self::ProcessRefund => "process_refund",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a transport outcome with the generic policy.
///
/// First match wins:
///
/// 1. status 401 → [`ErrorKind::Authentication`], fixed message
/// 2. status 400 → [`ErrorKind::Validation`], body `message`, body `errors` as details
/// 3. any other status → [`ErrorKind::Api`], body `message`, body `errors` as details
/// 4. no response → [`ErrorKind::Network`], fixed message
/// 5. anything else → [`ErrorKind::Unknown`], the failure's own message
///
/// ```rust
/// use cardpay::classify::{TransportOutcome, classify};
/// use cardpay::ErrorKind;
///
/// let outcome = TransportOutcome::Response {
///     status: 400,
///     body: serde_json::json!({"message": "bad field"}),
/// };
/// let record = classify(&outcome);
/// assert_eq!(record.kind(), ErrorKind::Validation);
/// assert_eq!(record.message(), "bad field");
/// ```
#[must_use]
pub fn classify(outcome: &TransportOutcome) -> ErrorRecord {
    match outcome {
        TransportOutcome::Response { status: 401, .. } => {
            ErrorRecord::new(ErrorKind::Authentication, AUTHENTICATION_FAILED_MESSAGE)
                .with_status_code(401)
        }
        TransportOutcome::Response { status, body } => {
            let (kind, fallback) = if *status == 400 {
                (ErrorKind::Validation, VALIDATION_FAILED_MESSAGE)
            } else {
                (ErrorKind::Api, API_ERROR_MESSAGE)
            };
            let message = body_message(body).unwrap_or(fallback);
            let record = ErrorRecord::new(kind, message).with_status_code(*status);
            match body_errors(body) {
                Some(errors) => record.with_details(errors),
                None => record,
            }
        }
        TransportOutcome::NoResponse { cause } => {
            ErrorRecord::new(ErrorKind::Network, NETWORK_ERROR_MESSAGE)
                .with_details(json!({ "cause": cause }))
        }
        TransportOutcome::Unexpected { message } => ErrorRecord::new(
            ErrorKind::Unknown,
            message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(UNKNOWN_ERROR_MESSAGE),
        ),
    }
}

/// Classifies a transport outcome observed while running `operation`.
///
/// `API` and `UNKNOWN` results are re-labelled with
/// [`Operation::error_kind`]; message, details and status code are kept.
#[must_use]
pub fn classify_for(operation: Operation, outcome: &TransportOutcome) -> ErrorRecord {
    let record = classify(outcome);
    match record.kind() {
        ErrorKind::Api | ErrorKind::Unknown => record.relabel(operation.error_kind()),
        _ => record,
    }
}

/// Non-empty `message` string from a response body.
fn body_message(body: &Value) -> Option<&str> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
}

/// `errors` field from a response body, if present and not null.
fn body_errors(body: &Value) -> Option<Value> {
    body.get("errors").filter(|e| !e.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: Value) -> TransportOutcome {
        TransportOutcome::Response { status, body }
    }

    #[test]
    fn test_401_is_authentication_regardless_of_body() {
        for body in [
            Value::Null,
            json!({"message": "token expired"}),
            json!({"errors": ["x"]}),
            json!("plain text"),
        ] {
            let record = classify(&response(401, body));
            assert_eq!(record.kind(), ErrorKind::Authentication);
            assert_eq!(record.message(), AUTHENTICATION_FAILED_MESSAGE);
            assert_eq!(record.status_code(), Some(401));
        }
    }

    #[test]
    fn test_400_takes_message_and_errors_from_body() {
        let record = classify(&response(
            400,
            json!({"message": "bad field", "errors": {"amount": "must be positive"}}),
        ));
        assert_eq!(record.kind(), ErrorKind::Validation);
        assert_eq!(record.message(), "bad field");
        assert_eq!(
            record.details(),
            Some(&json!({"amount": "must be positive"}))
        );
    }

    #[test]
    fn test_400_without_message_uses_fallback() {
        let record = classify(&response(400, Value::Null));
        assert_eq!(record.kind(), ErrorKind::Validation);
        assert_eq!(record.message(), VALIDATION_FAILED_MESSAGE);
        assert!(record.details().is_none());
    }

    #[test]
    fn test_other_status_is_api() {
        let record = classify(&response(503, json!({"message": "maintenance"})));
        assert_eq!(record.kind(), ErrorKind::Api);
        assert_eq!(record.message(), "maintenance");
        assert_eq!(record.status_code(), Some(503));

        let record = classify(&response(404, json!("not json object")));
        assert_eq!(record.kind(), ErrorKind::Api);
        assert_eq!(record.message(), API_ERROR_MESSAGE);
    }

    #[test]
    fn test_no_response_is_network() {
        let record = classify(&TransportOutcome::NoResponse {
            cause: "connection refused".into(),
        });
        assert_eq!(record.kind(), ErrorKind::Network);
        assert_eq!(record.message(), NETWORK_ERROR_MESSAGE);
        assert!(record.status_code().is_none());
    }

    #[test]
    fn test_unexpected_keeps_its_message() {
        let record = classify(&TransportOutcome::Unexpected {
            message: Some("invalid header value".into()),
        });
        assert_eq!(record.kind(), ErrorKind::Unknown);
        assert_eq!(record.message(), "invalid header value");

        let record = classify(&TransportOutcome::Unexpected { message: None });
        assert_eq!(record.message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_operation_relabels_api_and_unknown() {
        let record = classify_for(
            Operation::ProcessPayment,
            &response(500, json!({"message": "issuer unavailable"})),
        );
        assert_eq!(record.kind(), ErrorKind::PaymentProcessing);
        assert_eq!(record.message(), "issuer unavailable");
        assert_eq!(record.status_code(), Some(500));

        let record = classify_for(
            Operation::ProcessRefund,
            &TransportOutcome::Unexpected {
                message: Some("decode failed".into()),
            },
        );
        assert_eq!(record.kind(), ErrorKind::RefundProcessing);
        assert_eq!(record.message(), "decode failed");

        let record = classify_for(Operation::ListTransactions, &response(502, Value::Null));
        assert_eq!(record.kind(), ErrorKind::TransactionRetrieval);
    }

    #[test]
    fn test_operation_keeps_auth_validation_network() {
        for operation in [
            Operation::ProcessPayment,
            Operation::GetTransaction,
            Operation::ListTransactions,
            Operation::ProcessRefund,
        ] {
            assert_eq!(
                classify_for(operation, &response(401, Value::Null)).kind(),
                ErrorKind::Authentication
            );
            assert_eq!(
                classify_for(operation, &response(400, Value::Null)).kind(),
                ErrorKind::Validation
            );
            assert_eq!(
                classify_for(
                    operation,
                    &TransportOutcome::NoResponse {
                        cause: "timeout".into()
                    }
                )
                .kind(),
                ErrorKind::Network
            );
        }
    }
}
