//! HTTP constants for the gateway REST API.

/// Header carrying the merchant identifier on every request.
pub const MERCHANT_ID_HEADER: &str = "x-merchant-id";

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("cardpay-rs/", env!("CARGO_PKG_VERSION"));

/// Media type of request and response bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";
