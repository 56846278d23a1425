//! SDK configuration.
//!
//! An [`SdkConfig`] is built once at startup and shared by reference with
//! the transport and gateway client. Nothing mutates it afterwards.
//!
//! # Environment Variables
//!
//! [`SdkConfig::from_env`] reads the following; [`SdkConfig::from_lookup`]
//! takes the same names from any lookup function:
//!
//! - `CARDPAY_API_KEY` - Secret API key (required)
//! - `CARDPAY_MERCHANT_ID` - Merchant identifier (required)
//! - `CARDPAY_ENVIRONMENT` - `sandbox` or `production` (default: `sandbox`)
//! - `CARDPAY_BASE_URL` - Override for the gateway base URL
//! - `CARDPAY_TIMEOUT_SECS` - Request timeout in seconds (default: `30`)

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ErrorRecord;

/// Sandbox gateway base URL.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.api.cardpay.dev/v1";

/// Production gateway base URL.
pub const PRODUCTION_BASE_URL: &str = "https://api.cardpay.dev/v1";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test gateway; no real money moves.
    #[default]
    Sandbox,
    /// Live gateway.
    Production,
}

impl Environment {
    /// Default base URL for this environment.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Production => PRODUCTION_BASE_URL,
        }
    }

    /// Lowercase name, e.g. `"sandbox"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ErrorRecord;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(ErrorRecord::configuration(format!(
                "unknown environment '{other}', expected 'sandbox' or 'production'"
            ))),
        }
    }
}

/// Credentials and endpoint selection for the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct SdkConfig {
    api_key: String,
    merchant_id: String,
    environment: Environment,
    base_url: Option<String>,
    timeout: Duration,
}

impl SdkConfig {
    /// Creates a configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ErrorKind::Configuration`](crate::ErrorKind::Configuration)
    /// record if the API key or merchant id is blank.
    pub fn new(
        api_key: impl Into<String>,
        merchant_id: impl Into<String>,
        environment: Environment,
    ) -> Result<Self, ErrorRecord> {
        let api_key = api_key.into().trim().to_owned();
        let merchant_id = merchant_id.into().trim().to_owned();
        if api_key.is_empty() {
            return Err(ErrorRecord::configuration("API key is required"));
        }
        if merchant_id.is_empty() {
            return Err(ErrorRecord::configuration("merchant ID is required"));
        }
        Ok(Self {
            api_key,
            merchant_id,
            environment,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Loads a configuration from `CARDPAY_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, ErrorRecord> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads a configuration from `CARDPAY_*` variables resolved by `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`SdkConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ErrorRecord> {
        let api_key = lookup("CARDPAY_API_KEY")
            .ok_or_else(|| ErrorRecord::configuration("CARDPAY_API_KEY is not set"))?;
        let merchant_id = lookup("CARDPAY_MERCHANT_ID")
            .ok_or_else(|| ErrorRecord::configuration("CARDPAY_MERCHANT_ID is not set"))?;
        let environment = match lookup("CARDPAY_ENVIRONMENT") {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };

        let mut config = Self::new(api_key, merchant_id, environment)?;
        if let Some(url) = lookup("CARDPAY_BASE_URL") {
            config = config.with_base_url(url);
        }
        if let Some(secs) = lookup("CARDPAY_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ErrorRecord::configuration(format!("CARDPAY_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Overrides the environment's base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Secret API key, sent as a bearer token.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Merchant identifier.
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Selected environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Effective base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("api_key", &"<redacted>")
            .field("merchant_id", &self.merchant_id)
            .field("environment", &self.environment)
            .field("base_url", &self.base_url())
            .field("timeout", &self.timeout)
            .finish()
    }
}
