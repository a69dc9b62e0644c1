//! Futures Testnet Bot — Entry Point
//!
//! Wiring sequence:
//! 1. Parse CLI (config path, credentials from flags or env)
//! 2. Load config.toml (defaults when absent) + validate
//! 3. Init process log (file truncated per run + stderr)
//! 4. Run the interactive console, or a one-shot `balance` / `order`

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::io::BufReader;
use tracing::{info, warn};

use futures_testnet_bot::adapters::api::FuturesVenue;
use futures_testnet_bot::adapters::console::Console;
use futures_testnet_bot::adapters::logging::init_logging;
use futures_testnet_bot::config::AppConfig;
use futures_testnet_bot::config::loader::load_config_or_default;
use futures_testnet_bot::domain::{Credentials, OrderKind, OrderRequest, Side};
use futures_testnet_bot::usecases::{FuturesConnector, TradingBot};

#[derive(Parser)]
#[command(name = "futures-bot")]
#[command(about = "Place and query orders on the futures testnet")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file (defaults are used when it is missing)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// API key
    #[arg(long, env = "BINANCE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API secret
    #[arg(long, env = "BINANCE_API_SECRET", hide_env_values = true)]
    api_secret: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive order form (default)
    Interactive,

    /// Print the futures account balance
    Balance,

    /// Place one order
    Order {
        /// Symbol, e.g. BTCUSDT (defaults to the configured symbol)
        #[arg(long)]
        symbol: Option<String>,

        /// BUY or SELL
        #[arg(long, default_value = "BUY")]
        side: Side,

        /// MARKET or LIMIT
        #[arg(long = "type", default_value = "MARKET")]
        kind: OrderKind,

        /// Quantity (defaults to the configured quantity)
        #[arg(long)]
        quantity: Option<Decimal>,

        /// Limit price
        #[arg(long)]
        price: Option<Decimal>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── 1. Configuration ────────────────────────────────────
    let (config, from_file) =
        load_config_or_default(&cli.config).context("Failed to load configuration")?;

    // ── 2. Process log ──────────────────────────────────────
    init_logging(&config.bot).context("Failed to initialize logging")?;

    info!(
        name = %config.bot.name,
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.venue.environment,
        config = %cli.config.display(),
        from_file,
        "Starting futures bot"
    );

    // ── 3. Dispatch ─────────────────────────────────────────
    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            let mut console = Console::new(FuturesConnector::new(config.clone()), &config.orders)
                .with_credentials(cli.api_key, cli.api_secret);
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            console.run(stdin, &mut stdout).await?;
            info!("Session ended");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Balance => {
            let Some(bot) = connect(cli.api_key, cli.api_secret, &config).await? else {
                return Ok(ExitCode::from(2));
            };
            print_result(bot.get_balance().await.ok())
        }
        Commands::Order {
            symbol,
            side,
            kind,
            quantity,
            price,
        } => {
            let request = OrderRequest::new(
                symbol.as_deref().unwrap_or(config.orders.default_symbol.as_str()),
                side,
                kind,
                quantity.unwrap_or(config.orders.default_quantity),
                price,
            )
            .context("Invalid order")?;

            let Some(bot) = connect(cli.api_key, cli.api_secret, &config).await? else {
                return Ok(ExitCode::from(2));
            };
            print_result(bot.place_order(&request).await.ok())
        }
    }
}

/// Connect a REST-backed bot, or explain that credentials are missing.
async fn connect(
    api_key: Option<String>,
    api_secret: Option<String>,
    config: &AppConfig,
) -> Result<Option<TradingBot<FuturesVenue>>> {
    let credentials = match Credentials::new(
        api_key.as_deref().unwrap_or_default(),
        api_secret.as_deref().unwrap_or_default(),
    ) {
        Ok(credentials) => credentials,
        Err(e) => {
            warn!(error = %e, "No credentials supplied");
            eprintln!("Set --api-key/--api-secret or BINANCE_API_KEY/BINANCE_API_SECRET.");
            return Ok(None);
        }
    };

    let bot = TradingBot::connect(credentials, config)
        .await
        .context("Failed to connect to venue")?;
    Ok(Some(bot))
}

/// Print the result as JSON (`null` when absent). Absent exits with 1.
fn print_result<T: Serialize>(value: Option<T>) -> Result<ExitCode> {
    let json = serde_json::to_string_pretty(&value).context("Failed to render result")?;
    println!("{json}");
    Ok(if value.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
