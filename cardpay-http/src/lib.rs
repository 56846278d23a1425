#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport for the cardpay gateway client.
//!
//! [`ReqwestTransport`](transport::ReqwestTransport) implements
//! [`cardpay::transport::Transport`] on top of `reqwest`. It attaches the
//! bearer token and merchant header from an [`SdkConfig`](cardpay::config::SdkConfig),
//! resolves paths against the environment's base URL and reports every
//! response as-is; classification stays in [`cardpay::gateway`].
//!
//! # Modules
//!
//! - [`constants`] - Header names and the user agent
//! - [`error`] - Transport construction errors (feature: `client`)
//! - [`transport`] - The `reqwest` transport (feature: `client`)
//!
//! # Feature Flags
//!
//! - `client` (default) - The `reqwest` transport
//! - `telemetry` - Tracing spans for every request

pub mod constants;

#[cfg(feature = "client")]
pub mod error;
#[cfg(feature = "client")]
pub mod transport;

#[cfg(feature = "client")]
pub use error::TransportBuildError;
#[cfg(feature = "client")]
pub use transport::{ReqwestTransport, connect};
