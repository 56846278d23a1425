//! Command-line client for the cardpay gateway.
//!
//! # Usage
//!
//! ```bash
//! # Check a card locally
//! cardpay validate "4111 1111 1111 1111" --expiry 12/30 --cvc 123
//!
//! # Talk to the sandbox gateway
//! export CARDPAY_API_KEY=sk_test_...
//! export CARDPAY_MERCHANT_ID=m_...
//! cardpay transactions --limit 10 --status approved
//! cardpay refund txn_123 --amount 500 --reason duplicate
//! ```
//!
//! # Environment Variables
//!
//! A `.env` file in the working directory is loaded first.
//!
//! - `CARDPAY_API_KEY` - Secret API key
//! - `CARDPAY_MERCHANT_ID` - Merchant identifier
//! - `CARDPAY_ENVIRONMENT` - `sandbox` (default) or `production`
//! - `CARDPAY_BASE_URL` - Override for the gateway base URL
//! - `CARDPAY_TIMEOUT_SECS` - Request timeout in seconds (default: `30`)
//! - `RUST_LOG` - Log level filter (default: `info`)

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod report;

use std::error::Error;

use cardpay::ErrorRecord;
use cardpay::assemble::{TransactionDetails, assemble_payment_request};
use cardpay::gateway::GatewayClient;
use cardpay::proto::{RefundRequest, TransactionQuery};
use cardpay::validation::{CardInput, validate_card};
use cardpay_http::ReqwestTransport;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, GatewayCommand, PayArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Populate the environment before clap reads its env fallbacks.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{}", failure_line(e.as_ref()));
        std::process::exit(1);
    }
}

/// The single line printed for a failed command: `KIND: message` for an
/// [`ErrorRecord`], `error: ...` for anything else.
fn failure_line(err: &(dyn Error + 'static)) -> String {
    match err.downcast_ref::<ErrorRecord>() {
        Some(record) => format!("{}: {}", record.kind(), record.message()),
        None => format!("error: {err}"),
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Validate {
            number,
            expiry,
            cvc,
        } => print_json(&report::card_report(
            &number,
            expiry.as_deref(),
            cvc.as_deref(),
        )),
        Command::Gateway(command) => {
            let config = cli.gateway.to_config()?;
            tracing::info!(
                environment = %config.environment(),
                base_url = config.base_url(),
                "Loaded configuration"
            );
            let client = cardpay_http::connect(&config)?;
            dispatch(&client, command).await
        }
    }
}

async fn dispatch(
    client: &GatewayClient<ReqwestTransport>,
    command: GatewayCommand,
) -> Result<(), Box<dyn Error>> {
    match command {
        GatewayCommand::Pay(args) => {
            let (details, input) = payment_input(args);
            let card = validate_card(&input).map_err(ErrorRecord::from)?;
            let request = assemble_payment_request(&details, &card)?;
            tracing::info!(
                card = %card.masked_number(),
                amount = request.amount,
                currency = %request.currency,
                "Submitting payment"
            );
            print_json(&client.process_payment(&request).await?)
        }
        GatewayCommand::Transaction { id } => print_json(&client.get_transaction(&id).await?),
        GatewayCommand::Transactions {
            limit,
            offset,
            status,
        } => {
            let query = TransactionQuery {
                limit,
                offset,
                status,
                ..TransactionQuery::default()
            };
            print_json(&client.list_transactions(&query).await?)
        }
        GatewayCommand::Refund { id, amount, reason } => {
            let request = RefundRequest {
                transaction_id: id,
                amount,
                reason,
            };
            print_json(&client.process_refund(&request).await?)
        }
    }
}

fn payment_input(args: PayArgs) -> (TransactionDetails, CardInput) {
    let mut details = TransactionDetails::new(args.amount, args.currency);
    details.order_id = args.order_id;
    details.description = args.description;
    let input = CardInput::new(args.number, args.expiry, args.cvc, args.name);
    (details, input)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
