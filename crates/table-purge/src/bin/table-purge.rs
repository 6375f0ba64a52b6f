//! # Table Purge
//!
//! Deletes every record from a DynamoDB table after the operator types the
//! confirmation token. Used to clear test orders before going to production.
//!
//! ## Usage
//! ```bash
//! # Defaults: table natal-orders in us-east-1, keyed by orderId
//! cargo run --bin table-purge
//!
//! # Another table, against DynamoDB Local
//! cargo run --bin table-purge -- --table staging-orders --endpoint-url http://localhost:8000
//! ```
//!
//! Exit status is 0 when the run completes, the table is already empty, or the
//! operator declines. It is 1 on Ctrl+C or any unhandled error.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use table_purge::config::{
    DEFAULT_CONFIRMATION_TOKEN, DEFAULT_KEY_ATTRIBUTE, DEFAULT_PROGRESS_INTERVAL, DEFAULT_REGION,
    DEFAULT_TABLE_NAME,
};
use table_purge::prelude::*;

#[derive(Parser)]
#[command(name = "table-purge")]
#[command(about = "Delete every record from a DynamoDB table after explicit confirmation")]
struct Args {
    /// Table to empty
    #[arg(long, default_value = DEFAULT_TABLE_NAME)]
    table: String,

    /// AWS region of the table
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,

    /// Primary (hash) key attribute
    #[arg(long, default_value = DEFAULT_KEY_ATTRIBUTE)]
    key_attribute: String,

    /// Exact text the operator must type to proceed
    #[arg(long = "confirm-token", default_value = DEFAULT_CONFIRMATION_TOKEN)]
    confirmation_token: String,

    /// Print progress every N successful deletions
    #[arg(long = "progress-every", default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: usize,

    /// Items per scan request (defaults to the service's 1 MB pages)
    #[arg(long)]
    page_size: Option<i32>,

    /// DynamoDB endpoint override (e.g. http://localhost:8000)
    #[arg(long)]
    endpoint_url: Option<String>,
}

impl From<Args> for PurgeConfig {
    fn from(args: Args) -> Self {
        PurgeConfig {
            table_name: args.table,
            region: args.region,
            key_attribute: args.key_attribute,
            confirmation_token: args.confirmation_token,
            progress_interval: args.progress_interval,
            page_size: args.page_size,
            endpoint_url: args.endpoint_url,
        }
    }
}

async fn run(config: PurgeConfig) -> PurgeResult<PurgeOutcome> {
    let table = DynamoDbTable::with_config(config.clone()).await?;

    let mut confirmation = StdinConfirmation::stdio();
    let mut console = ConsoleObserver::stdout();

    TablePurger::new(&table, &config)
        .run(&mut confirmation, &mut console)
        .await
}

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries the operator-facing text
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = PurgeConfig::from(Args::parse());

    tokio::select! {
        result = run(config) => {
            match &result {
                Ok(outcome) => debug!(?outcome, "Purge finished"),
                Err(e) => {
                    error!("Purge failed: {}", e);
                    println!("\n❌ Error: {e}\n");
                }
            }
            ExitCode::from(exit_status(&result))
        }
        Ok(()) = tokio::signal::ctrl_c() => {
            println!("\n\n❌ Operation cancelled by user.\n");
            // A pending stdin read would keep the runtime from shutting down
            std::process::exit(i32::from(EXIT_FAILURE));
        }
    }
}
