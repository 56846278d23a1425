//! Wire format types for the gateway REST API.
//!
//! All types serialize with `camelCase` field names. Amounts are integers in
//! the currency's minor unit (cents for `XCD`).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::brand::CardBrand;
use crate::normalize::mask_card_number;

/// Free-form merchant metadata attached to a payment.
pub type Metadata = Map<String, Value>;

/// Card section of a [`PaymentRequest`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPayload {
    /// Normalized card number, digits only.
    pub number: String,
    /// Zero-padded expiry month, `"01"`-`"12"`.
    pub expiry_month: String,
    /// Two-digit expiry year, e.g. `"30"`.
    pub expiry_year: String,
    /// Security code.
    pub cvc: String,
    /// Cardholder name.
    pub holder_name: String,
}

impl fmt::Debug for CardPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardPayload")
            .field("number", &mask_card_number(&self.number))
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvc", &"<redacted>")
            .field("holder_name", &self.holder_name)
            .finish()
    }
}

/// Body of `POST /payments`.
///
/// Built fresh for every submission by
/// [`assemble_payment_request`](crate::assemble::assemble_payment_request).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Amount in minor units.
    pub amount: u64,
    /// ISO 4217 currency code, upper case.
    pub currency: String,
    /// Paying account or customer identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Receiving account identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<String>,
    /// Merchant order reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Statement description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Merchant metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Card details.
    pub card: CardPayload,
}

/// Lifecycle state of a transaction as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Accepted, awaiting completion.
    Pending,
    /// Authorized and captured.
    Approved,
    /// Declined by the issuer.
    Declined,
    /// Failed for a non-issuer reason.
    Failed,
    /// Fully refunded.
    Refunded,
    /// Partially refunded.
    PartiallyRefunded,
    /// Cancelled before settlement.
    Voided,
    /// A status this SDK version does not know about.
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Wire name, e.g. `"partially_refunded"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::PartiallyRefunded => "partially_refunded",
            Self::Voided => "voided",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response of `POST /payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Gateway transaction identifier.
    pub transaction_id: String,
    /// Resulting status.
    pub status: PaymentStatus,
    /// Charged amount in minor units.
    pub amount: u64,
    /// Currency code.
    pub currency: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Receipt reference or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
}

/// Card summary returned with transactions; never contains the full number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    /// Card brand.
    #[serde(default)]
    pub brand: CardBrand,
    /// Last four digits.
    pub last4: String,
}

/// A transaction as returned by `GET /transactions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Gateway transaction identifier.
    pub id: String,
    /// Current status.
    pub status: PaymentStatus,
    /// Amount in minor units.
    pub amount: u64,
    /// Amount refunded so far, in minor units.
    #[serde(default)]
    pub refunded_amount: u64,
    /// Currency code.
    pub currency: String,
    /// Paying account or customer identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Receiving account identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<String>,
    /// Merchant order reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Statement description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Merchant metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Card used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardSummary>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Filters and paging for `GET /transactions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Page size.
    pub limit: Option<u32>,
    /// Number of records to skip.
    pub offset: Option<u32>,
    /// Only transactions in this status.
    pub status: Option<PaymentStatus>,
    /// Only transactions created at or after this time.
    pub from: Option<DateTime<Utc>>,
    /// Only transactions created before this time.
    pub to: Option<DateTime<Utc>>,
}

impl TransactionQuery {
    /// Sets the page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Filters by status.
    #[must_use]
    pub const fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters by creation time range.
    #[must_use]
    pub const fn with_range(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Encodes the query as URL query pairs, skipping unset fields.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_owned(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_owned(), offset.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".to_owned(), status.as_str().to_owned()));
        }
        if let Some(from) = self.from {
            pairs.push(("from".to_owned(), from.to_rfc3339()));
        }
        if let Some(to) = self.to {
            pairs.push(("to".to_owned(), to.to_rfc3339()));
        }
        pairs
    }
}

/// Response of `GET /transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionList {
    /// Transactions on this page.
    pub data: Vec<Transaction>,
    /// Total matching transactions.
    #[serde(default)]
    pub total: u64,
    /// Page size used.
    #[serde(default)]
    pub limit: u32,
    /// Offset used.
    #[serde(default)]
    pub offset: u32,
}

impl TransactionList {
    /// Returns `true` if more transactions follow this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        u64::from(self.offset) + (self.data.len() as u64) < self.total
    }
}

/// Body of `POST /refunds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    /// Transaction to refund.
    pub transaction_id: String,
    /// Amount to refund in minor units; the full remaining amount if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    /// Reason shown to the merchant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RefundRequest {
    /// Full refund of a transaction.
    #[must_use]
    pub fn full(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            amount: None,
            reason: None,
        }
    }

    /// Refund only part of the amount.
    #[must_use]
    pub const fn with_amount(mut self, amount: u64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Attaches a reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Lifecycle state of a refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    /// Accepted, not yet settled.
    Pending,
    /// Completed.
    Succeeded,
    /// Rejected.
    Failed,
    /// A status this SDK version does not know about.
    #[serde(other)]
    Unknown,
}

/// Response of `POST /refunds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    /// Gateway refund identifier.
    pub refund_id: String,
    /// Refunded transaction.
    pub transaction_id: String,
    /// Refund status.
    pub status: RefundStatus,
    /// Refunded amount in minor units.
    pub amount: u64,
    /// Currency code.
    pub currency: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
