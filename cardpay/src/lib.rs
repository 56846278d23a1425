#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for the cardpay client SDK.
//!
//! This crate holds everything a merchant integration needs that does not
//! touch the network or a UI toolkit: card input normalization and
//! validation, the error taxonomy shared by every gateway operation, the
//! wire types exchanged with the gateway's REST API, and a gateway client
//! written against an abstract [`Transport`](transport::Transport).
//!
//! # Overview
//!
//! Raw card fields flow through the [`normalize`] helpers, the [`luhn`]
//! checksum and the [`brand`] detector. [`validation::validate_card`] turns a
//! [`validation::CardInput`] into a [`validation::ValidatedCard`], which is the
//! only card value [`assemble::assemble_payment_request`] accepts. Failures
//! coming back from the transport are classified once, at the boundary, into
//! an [`error::ErrorRecord`] by [`classify`].
//!
//! # Modules
//!
//! - [`assemble`] - Builds outbound payment requests from validated input
//! - [`brand`] - Card brand detection from issuer prefixes
//! - [`classify`] - Maps transport outcomes onto the error taxonomy
//! - [`config`] - SDK configuration and gateway environments
//! - [`error`] - Error taxonomy and the uniform error record
//! - [`expiry`] - Card expiry parsing and checks
//! - [`form`] - Payment form controller driven by a host-supplied renderer
//! - [`gateway`] - Gateway operations over a transport
//! - [`luhn`] - Luhn checksum with the card-number length policy
//! - [`normalize`] - Digit normalization and display formatting
//! - [`proto`] - Wire format types for the gateway REST API
//! - [`transport`] - Transport abstraction implemented by `cardpay-http`
//! - [`validation`] - Full card input validation
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for gateway calls

pub mod assemble;
pub mod brand;
pub mod classify;
pub mod config;
pub mod error;
pub mod expiry;
pub mod form;
pub mod gateway;
pub mod luhn;
pub mod normalize;
pub mod proto;
pub mod transport;
pub mod validation;

pub use brand::{CardBrand, detect_brand};
pub use error::{ErrorKind, ErrorRecord};
pub use luhn::is_valid_luhn;
pub use normalize::normalize_digits;
