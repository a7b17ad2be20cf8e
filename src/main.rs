//! Perpetual futures PnL report
//!
//! Rebuilds an account's realized PnL and funding totals per market from its
//! full fill, position and funding payment history.

mod api;
mod config;
mod error;
mod fetch;
mod metrics;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::api::{mask, Credentials, FtxClient, DEFAULT_BASE_URL};
use crate::config::ReportConfig;
use crate::fetch::fetch_orders;
use crate::report::build_report;

/// Perpetual futures PnL report CLI.
#[derive(Parser)]
#[command(name = "perp-pnl")]
#[command(about = "Reconstruct per-market PnL and funding from account history", long_about = None)]
struct Cli {
    /// API key
    #[arg(long, env = "FTX_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API secret
    #[arg(long, env = "FTX_API_SECRET", hide_env_values = true)]
    api_secret: Option<String>,

    /// Subaccount to report on
    #[arg(long, env = "FTX_SUBACCOUNT")]
    subaccount: Option<String>,

    /// REST API base URL
    #[arg(long, env = "FTX_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigOverrides {
    /// Order history page size
    #[arg(long, global = true)]
    order_page_size: Option<u32>,

    /// Fill page size
    #[arg(long, global = true)]
    fill_page_size: Option<u32>,

    /// Funding payment page size
    #[arg(long, global = true)]
    funding_page_size: Option<u32>,

    /// Market suffix that marks perpetual futures
    #[arg(long, global = true)]
    perp_suffix: Option<String>,

    /// Recent funding window in seconds
    #[arg(long, global = true)]
    funding_window_secs: Option<i64>,
}

impl ConfigOverrides {
    fn apply(self, mut config: ReportConfig) -> ReportConfig {
        if let Some(size) = self.order_page_size {
            config.order_page_size = size;
        }
        if let Some(size) = self.fill_page_size {
            config.fill_page_size = size;
        }
        if let Some(size) = self.funding_page_size {
            config.funding_page_size = size;
        }
        if let Some(suffix) = self.perp_suffix {
            config.perp_suffix = suffix;
        }
        if let Some(secs) = self.funding_window_secs {
            config.funding_window_secs = secs;
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print per-market PnL, funding and account totals
    Report {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List closed, filled orders
    Orders,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.overrides.apply(ReportConfig::default());

    match cli.command {
        Commands::Report { json } => {
            let client = connect(cli.api_key, cli.api_secret, cli.subaccount, &cli.base_url)?;

            info!(base_url = %cli.base_url, "Building PnL report");
            let report = build_report(&client, &config, Utc::now()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
        }

        Commands::Orders => {
            let client = connect(cli.api_key, cli.api_secret, cli.subaccount, &cli.base_url)?;

            let orders = fetch_orders(&client, &config).await?;
            info!(orders = orders.len(), "Closed orders fetched");

            println!("\n{:<20} {:<14} {}", "TIME", "MARKET", "ORDER");
            println!("{}", "-".repeat(60));
            for order in &orders {
                println!(
                    "{:<20} {:<14} {}",
                    order.time.format("%Y-%m-%d %H:%M:%S"),
                    order.market,
                    order
                );
            }
        }

        Commands::Config => {
            println!("\n=== Connection ===\n");
            println!("  Base URL:             {}", cli.base_url);
            println!(
                "  API Key:              {}",
                cli.api_key.as_deref().map(mask).unwrap_or_else(|| "(not set)".to_string())
            );
            println!(
                "  API Secret:           {}",
                if cli.api_secret.is_some() { "***" } else { "(not set)" }
            );
            println!(
                "  Subaccount:           {}",
                cli.subaccount.as_deref().unwrap_or("(main account)")
            );

            println!("\n=== Report Configuration ===\n");
            println!("Pagination:");
            println!("  Order Page Size:      {}", config.order_page_size);
            println!("  Fill Page Size:       {}", config.fill_page_size);
            println!("  Funding Page Size:    {}", config.funding_page_size);

            println!("\nFiltering:");
            println!("  Perp Suffix:          {}", config.perp_suffix);
            println!("  Funding Window:       {}s", config.funding_window_secs);
        }
    }

    Ok(())
}

fn connect(
    api_key: Option<String>,
    api_secret: Option<String>,
    subaccount: Option<String>,
    base_url: &str,
) -> Result<FtxClient> {
    let credentials = Credentials {
        api_key: api_key.context("API key missing: pass --api-key or set FTX_API_KEY")?,
        api_secret: api_secret.context("API secret missing: pass --api-secret or set FTX_API_SECRET")?,
        subaccount: subaccount.filter(|s| !s.is_empty()),
    };
    FtxClient::new(base_url, credentials)
}
