//! Transport abstraction.
//!
//! The gateway client talks to the network only through [`Transport`]. The
//! transport owns authentication headers and the base URL; the client owns
//! paths, bodies and error classification. `cardpay-http` provides the
//! `reqwest` implementation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ErrorRecord;

/// A pinned, boxed, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// HTTP methods used by the gateway API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl HttpMethod {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request for the transport to send.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the base URL, e.g. `/transactions/txn_1`.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Query pairs, in order.
    pub query: Vec<(String, String)>,
}

impl TransportRequest {
    /// A `GET` request without query parameters.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    /// A `POST` request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: Some(body),
            query: Vec::new(),
        }
    }

    /// Replaces the query pairs.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// A response received from the gateway, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body; `Value::Null` for an empty body and a JSON string
    /// for a body that is not JSON.
    pub body: Value,
}

impl TransportResponse {
    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Failures where no usable response was received.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportFailure {
    /// The request was sent (or attempted) but nothing came back.
    #[error("network failure: {message}")]
    Network {
        /// Description of the connectivity failure.
        message: String,
    },
    /// The request could not be built or something else went wrong.
    #[error("unexpected transport failure: {}", message.as_deref().unwrap_or("no message"))]
    Unexpected {
        /// The failure's own message, if any.
        message: Option<String>,
    },
    /// A failure already classified further down. Passed through untouched.
    #[error(transparent)]
    Classified(ErrorRecord),
}

/// Sends requests to the gateway.
///
/// Implementations attach the bearer token and merchant identifier and
/// resolve `path` against the environment's base URL. They must not retry.
pub trait Transport: Send + Sync {
    /// Sends one request.
    fn send(&self, request: TransportRequest)
    -> BoxFuture<'_, Result<TransportResponse, TransportFailure>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportFailure>> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportFailure>> {
        (**self).send(request)
    }
}
