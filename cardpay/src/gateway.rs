//! Gateway operations over a [`Transport`].
//!
//! [`GatewayClient`] implements [`PaymentGateway`] by building transport
//! requests, sending them, and classifying anything that is not a 2xx JSON
//! response with [`classify_for`]. Records that arrive already classified
//! (see [`TransportFailure::Classified`]) are passed through unchanged.
//! Nothing is retried.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::classify::{Operation, TransportOutcome, classify_for};
use crate::error::ErrorRecord;
use crate::proto::{
    PaymentRequest, PaymentResponse, RefundRequest, RefundResponse, Transaction, TransactionList,
    TransactionQuery,
};
use crate::transport::{
    BoxFuture, Transport, TransportFailure, TransportRequest, TransportResponse,
};

#[cfg(feature = "telemetry")]
use tracing::instrument;

/// Path of the payments endpoint.
pub const PAYMENTS_PATH: &str = "/payments";

/// Path of the transactions endpoint.
pub const TRANSACTIONS_PATH: &str = "/transactions";

/// Path of the refunds endpoint.
pub const REFUNDS_PATH: &str = "/refunds";

/// The four operations the gateway exposes.
///
/// Every failure is an [`ErrorRecord`]. This trait is dyn-compatible so form
/// controllers and tests can hold `&dyn PaymentGateway`.
pub trait PaymentGateway: Send + Sync {
    /// Submits a payment.
    fn process_payment<'a>(
        &'a self,
        request: &'a PaymentRequest,
    ) -> BoxFuture<'a, Result<PaymentResponse, ErrorRecord>>;

    /// Fetches one transaction by id.
    fn get_transaction<'a>(
        &'a self,
        transaction_id: &'a str,
    ) -> BoxFuture<'a, Result<Transaction, ErrorRecord>>;

    /// Lists transactions.
    fn list_transactions<'a>(
        &'a self,
        query: &'a TransactionQuery,
    ) -> BoxFuture<'a, Result<TransactionList, ErrorRecord>>;

    /// Refunds all or part of a transaction.
    fn process_refund<'a>(
        &'a self,
        request: &'a RefundRequest,
    ) -> BoxFuture<'a, Result<RefundResponse, ErrorRecord>>;
}

/// Gateway client over any [`Transport`].
pub struct GatewayClient<T> {
    transport: T,
}

impl<T> fmt::Debug for GatewayClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient").finish_non_exhaustive()
    }
}

impl<T: Transport> GatewayClient<T> {
    /// Creates a client that sends through `transport`.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `POST /payments`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ErrorRecord`]; `API` and `UNKNOWN` failures
    /// are reported as `PAYMENT_PROCESSING`.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "cardpay.gateway.process_payment", skip_all, err, fields(
            amount = request.amount,
            currency = %request.currency,
        ))
    )]
    pub async fn process_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, ErrorRecord> {
        let operation = Operation::ProcessPayment;
        let body = encode_body(operation, request)?;
        self.call(operation, TransportRequest::post(PAYMENTS_PATH, body))
            .await
    }

    /// Sends `GET /transactions/{id}`.
    ///
    /// # Errors
    ///
    /// Returns a `VALIDATION` record for an empty id, `.`, `..` or an id
    /// containing `/`, otherwise the classified record (`TRANSACTION_RETRIEVAL` for `API`
    /// and `UNKNOWN` failures).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "cardpay.gateway.get_transaction", skip(self), err)
    )]
    pub async fn get_transaction(&self, transaction_id: &str) -> Result<Transaction, ErrorRecord> {
        let transaction_id = check_id(transaction_id)?;
        self.call(
            Operation::GetTransaction,
            TransportRequest::get(format!("{TRANSACTIONS_PATH}/{transaction_id}")),
        )
        .await
    }

    /// Sends `GET /transactions`.
    ///
    /// # Errors
    ///
    /// Returns the classified record (`TRANSACTION_RETRIEVAL` for `API` and
    /// `UNKNOWN` failures).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "cardpay.gateway.list_transactions", skip(self), err)
    )]
    pub async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<TransactionList, ErrorRecord> {
        self.call(
            Operation::ListTransactions,
            TransportRequest::get(TRANSACTIONS_PATH).with_query(query.to_pairs()),
        )
        .await
    }

    /// Sends `POST /refunds`.
    ///
    /// # Errors
    ///
    /// Returns a `VALIDATION` record for a bad transaction id or a zero
    /// amount, otherwise the classified record (`REFUND_PROCESSING` for
    /// `API` and `UNKNOWN` failures).
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "cardpay.gateway.process_refund", skip(self), err)
    )]
    pub async fn process_refund(
        &self,
        request: &RefundRequest,
    ) -> Result<RefundResponse, ErrorRecord> {
        let transaction_id = check_id(&request.transaction_id)?;
        if request.amount == Some(0) {
            return Err(ErrorRecord::validation("refund amount must be greater than zero"));
        }
        let request = RefundRequest {
            transaction_id: transaction_id.to_owned(),
            ..request.clone()
        };
        let operation = Operation::ProcessRefund;
        let body = encode_body(operation, &request)?;
        self.call(operation, TransportRequest::post(REFUNDS_PATH, body))
            .await
    }

    /// Sends one request and decodes a successful response.
    async fn call<R>(&self, operation: Operation, request: TransportRequest) -> Result<R, ErrorRecord>
    where
        R: DeserializeOwned,
    {
        let result = self.transport.send(request).await;
        let response = settle(operation, result)?;
        serde_json::from_value(response.body).map_err(|e| {
            classify_for(
                operation,
                &TransportOutcome::Unexpected {
                    message: Some(format!("failed to decode gateway response: {e}")),
                },
            )
        })
    }
}

impl<T: Transport> PaymentGateway for GatewayClient<T> {
    fn process_payment<'a>(
        &'a self,
        request: &'a PaymentRequest,
    ) -> BoxFuture<'a, Result<PaymentResponse, ErrorRecord>> {
        Box::pin(Self::process_payment(self, request))
    }

    fn get_transaction<'a>(
        &'a self,
        transaction_id: &'a str,
    ) -> BoxFuture<'a, Result<Transaction, ErrorRecord>> {
        Box::pin(Self::get_transaction(self, transaction_id))
    }

    fn list_transactions<'a>(
        &'a self,
        query: &'a TransactionQuery,
    ) -> BoxFuture<'a, Result<TransactionList, ErrorRecord>> {
        Box::pin(Self::list_transactions(self, query))
    }

    fn process_refund<'a>(
        &'a self,
        request: &'a RefundRequest,
    ) -> BoxFuture<'a, Result<RefundResponse, ErrorRecord>> {
        Box::pin(Self::process_refund(self, request))
    }
}

/// Turns a raw transport result into a successful response or a record.
///
/// This is the only place transport failures are classified.
fn settle(
    operation: Operation,
    result: Result<TransportResponse, TransportFailure>,
) -> Result<TransportResponse, ErrorRecord> {
    let outcome = match result {
        Ok(response) if response.is_success() => return Ok(response),
        Ok(response) => TransportOutcome::Response {
            status: response.status,
            body: response.body,
        },
        Err(TransportFailure::Classified(record)) => return Err(record),
        Err(TransportFailure::Network { message }) => TransportOutcome::NoResponse { cause: message },
        Err(TransportFailure::Unexpected { message }) => TransportOutcome::Unexpected { message },
    };
    let record = classify_for(operation, &outcome);

    #[cfg(feature = "telemetry")]
    tracing::warn!(
        operation = %operation,
        kind = %record.kind(),
        status = ?record.status_code(),
        "gateway call failed"
    );

    Err(record)
}

fn encode_body<B: Serialize>(
    operation: Operation,
    body: &B,
) -> Result<serde_json::Value, ErrorRecord> {
    serde_json::to_value(body).map_err(|e| {
        classify_for(
            operation,
            &TransportOutcome::Unexpected {
                message: Some(format!("failed to encode request body: {e}")),
            },
        )
    })
}

fn check_id(transaction_id: &str) -> Result<&str, ErrorRecord> {
    let transaction_id = transaction_id.trim();
    if transaction_id.is_empty() {
        return Err(ErrorRecord::validation("transaction ID is required"));
    }
    // URL path handling drops `.` and `..` segments.
    if transaction_id.contains('/') || matches!(transaction_id, "." | "..") {
        return Err(ErrorRecord::validation(format!(
            "transaction ID '{transaction_id}' is invalid"
        )));
    }
    Ok(transaction_id)
}
