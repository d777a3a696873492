//! usdt-transfer
//!
//! Sends one ERC-20 stablecoin transfer and waits for its receipt.
//!
//! ```text
//! config.toml ──▶ TransferConfig ──▶ RpcChainClient::connect (chain id check)
//!                                          │
//! $TRANSFER_SENDER_PRIVATE_KEY ──▶ SenderKey
//!                                          ▼
//!        TransferPipeline: decimals → nonce → build → sign → send → poll
//!                                          │
//!                                          ▼
//!                          tx hash + block number on stdout
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use usdt_transfer::config::load_config;
use usdt_transfer::lifecycle::signals::trigger_on_ctrl_c;
use usdt_transfer::observability::logging;
use usdt_transfer::{RpcChainClient, SenderKey, Shutdown, TransferError, TransferPipeline};

#[derive(Parser)]
#[command(name = "usdt-transfer")]
#[command(about = "Send one ERC-20 stablecoin transfer and wait for confirmation", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "transfer.toml")]
    config: PathBuf,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.observability.log_level) {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(
        config = %cli.config.display(),
        chain_id = config.rpc.chain_id,
        token = %config.token.address,
        recipient = %config.transfer.recipient,
        amount = %config.transfer.amount,
        "usdt-transfer v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    match run(config, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_indeterminate() {
                eprintln!("The transaction may still be mined; query its hash before retrying.");
            } else if e.is_fresh_nonce_retryable() {
                eprintln!("Nothing was sent; rerun to retry with a fresh nonce.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(
    config: usdt_transfer::TransferConfig,
    json: bool,
) -> Result<(), TransferError> {
    let key = SenderKey::from_env(&config.signer.private_key_env)?;
    let client = RpcChainClient::connect(&config.rpc).await?;
    let pipeline = TransferPipeline::new(client, config);

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move { trigger_on_ctrl_c(&shutdown).await });

    let outcome = pipeline
        .execute_with(&key, receiver, |tx_hash| {
            if !json {
                println!("Sent! Tx hash: {}", tx_hash);
            }
        })
        .await?;

    if json {
        let rendered = serde_json::to_string_pretty(&outcome)
            .map_err(|e| TransferError::Encoding(e.to_string()))?;
        println!("{}", rendered);
    } else {
        println!("Confirmed in block: {}", outcome.block_number);
    }

    Ok(())
}
