//! Command-line arguments.

use std::time::Duration;

use cardpay::ErrorRecord;
use cardpay::assemble::DEFAULT_CURRENCY;
use cardpay::config::{DEFAULT_TIMEOUT, Environment, SdkConfig};
use cardpay::proto::PaymentStatus;
use clap::{Args, Parser, Subcommand};

/// Card payment gateway client.
#[derive(Debug, Parser)]
#[command(name = "cardpay", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub gateway: GatewayArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Credentials and endpoint selection, shared by every gateway command.
#[derive(Debug, Clone, Args)]
pub struct GatewayArgs {
    /// Secret API key.
    #[arg(long, env = "CARDPAY_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Merchant identifier.
    #[arg(long, env = "CARDPAY_MERCHANT_ID", global = true)]
    pub merchant_id: Option<String>,

    /// Gateway environment: `sandbox` or `production`.
    #[arg(long, env = "CARDPAY_ENVIRONMENT", default_value = "sandbox", global = true)]
    pub environment: Environment,

    /// Override for the gateway base URL.
    #[arg(long, env = "CARDPAY_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "CARDPAY_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs(), global = true)]
    pub timeout_secs: u64,
}

impl GatewayArgs {
    /// Builds the SDK configuration.
    pub fn to_config(&self) -> Result<SdkConfig, ErrorRecord> {
        let config = SdkConfig::new(
            self.api_key.clone().unwrap_or_default(),
            self.merchant_id.clone().unwrap_or_default(),
            self.environment,
        )?
        .with_timeout(Duration::from_secs(self.timeout_secs));
        Ok(match &self.base_url {
            Some(base_url) => config.with_base_url(base_url.clone()),
            None => config,
        })
    }
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a card number locally; nothing is sent to the gateway.
    Validate {
        /// Card number, separators allowed.
        number: String,
        /// Expiry to check as well, `MM/YY`.
        #[arg(long)]
        expiry: Option<String>,
        /// Security code to check against the detected brand.
        #[arg(long)]
        cvc: Option<String>,
    },
    #[command(flatten)]
    Gateway(GatewayCommand),
}

/// Subcommands that call the gateway.
#[derive(Debug, Subcommand)]
pub enum GatewayCommand {
    /// Submit a payment.
    Pay(PayArgs),
    /// Fetch one transaction.
    Transaction {
        /// Transaction identifier.
        id: String,
    },
    /// List transactions.
    Transactions {
        /// Page size.
        #[arg(long)]
        limit: Option<u32>,
        /// Number of transactions to skip.
        #[arg(long)]
        offset: Option<u32>,
        /// Only transactions in this status, e.g. `approved`.
        #[arg(long, value_parser = parse_status)]
        status: Option<PaymentStatus>,
    },
    /// Refund a transaction, fully unless `--amount` is given.
    Refund {
        /// Transaction identifier.
        id: String,
        /// Amount to refund, in minor units.
        #[arg(long)]
        amount: Option<u64>,
        /// Reason recorded with the refund.
        #[arg(long)]
        reason: Option<String>,
    },
}

/// Arguments of `cardpay pay`.
#[derive(Debug, Args)]
pub struct PayArgs {
    /// Amount in minor units, e.g. `4999` for 49.99.
    #[arg(long)]
    pub amount: u64,

    /// Currency code.
    #[arg(long, default_value = DEFAULT_CURRENCY)]
    pub currency: String,

    /// Card number, separators allowed.
    #[arg(long)]
    pub number: String,

    /// Card expiry, `MM/YY`.
    #[arg(long)]
    pub expiry: String,

    /// Security code.
    #[arg(long)]
    pub cvc: String,

    /// Cardholder name.
    #[arg(long)]
    pub name: String,

    /// Merchant order reference.
    #[arg(long)]
    pub order_id: Option<String>,

    /// Statement description.
    #[arg(long)]
    pub description: Option<String>,
}

fn parse_status(raw: &str) -> Result<PaymentStatus, String> {
    let value = serde_json::Value::String(raw.trim().to_ascii_lowercase());
    match serde_json::from_value(value) {
        Ok(PaymentStatus::Unknown) | Err(_) => Err(format!("unknown transaction status '{raw}'")),
        Ok(status) => Ok(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardpay::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transactions() {
        let cli = Cli::try_parse_from([
            "cardpay",
            "transactions",
            "--limit",
            "5",
            "--status",
            "Partially_Refunded",
        ])
        .unwrap();
        match cli.command {
            Command::Gateway(GatewayCommand::Transactions {
                limit,
                offset,
                status,
            }) => {
                assert_eq!(limit, Some(5));
                assert_eq!(offset, None);
                assert_eq!(status, Some(PaymentStatus::PartiallyRefunded));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_status() {
        assert!(parse_status("under_review").is_err());
        assert!(parse_status("unknown").is_err());
        assert_eq!(parse_status("approved"), Ok(PaymentStatus::Approved));
    }

    #[test]
    fn test_pay_defaults_currency() {
        let cli = Cli::try_parse_from([
            "cardpay",
            "pay",
            "--amount",
            "4999",
            "--number",
            "4111 1111 1111 1111",
            "--expiry",
            "12/30",
            "--cvc",
            "123",
            "--name",
            "Jane Doe",
        ])
        .unwrap();
        let Command::Gateway(GatewayCommand::Pay(args)) = cli.command else {
            panic!("expected pay");
        };
        assert_eq!(args.currency, "XCD");
        assert_eq!(args.amount, 4999);
    }

    #[test]
    fn test_to_config() {
        let args = GatewayArgs {
            api_key: Some("sk_test".into()),
            merchant_id: Some("m_1".into()),
            environment: Environment::Production,
            base_url: Some("http://localhost:9000/v1".into()),
            timeout_secs: 5,
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.base_url(), "http://localhost:9000/v1");
        assert_eq!(config.timeout(), Duration::from_secs(5));

        let missing = GatewayArgs {
            api_key: None,
            ..args
        };
        let err = missing.to_config().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
