//! Errors raised while building the HTTP transport.

use cardpay::ErrorRecord;

/// Failure to construct a [`ReqwestTransport`](crate::transport::ReqwestTransport).
#[derive(Debug, thiserror::Error)]
pub enum TransportBuildError {
    /// The base URL does not parse.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// The base URL cannot have path segments, e.g. `mailto:`.
    #[error("base URL cannot carry a path: {0}")]
    CannotBeABase(String),
    /// A credential contains characters not allowed in a header.
    #[error("invalid value for header {name}")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
        /// The underlying header error.
        #[source]
        source: http::header::InvalidHeaderValue,
    },
    /// The `reqwest` client could not be built.
    #[error("HTTP client error: {source}")]
    Client {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl From<TransportBuildError> for ErrorRecord {
    fn from(err: TransportBuildError) -> Self {
        Self::configuration(err.to_string())
    }
}
