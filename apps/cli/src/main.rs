//! tradegate - exchange adapter smoke test.
//!
//! Builds one adapter over a real HTTP client, runs a single command and
//! prints the normalized result as JSON.

mod config;

use clap::{Parser, Subcommand};
use config::{default_credentials_path, AppConfig};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use tradegate_core::ExchangeId;
use tradegate_exchanges::{
    create_exchange, Exchange, ExchangeResult, HttpTransport, Kabus, ReqwestTransport,
    TransportConfig,
};

/// Exchange adapter smoke test
#[derive(Parser, Debug)]
#[command(name = "tradegate")]
#[command(about = "Query a kabus or paymium adapter and print the result", long_about = None)]
struct Args {
    /// Exchange: kabus, paymium
    #[arg(short, long, default_value = "kabus")]
    exchange: ExchangeId,

    /// Credentials file holding KABUSAPI_HOST and KABUSAPI_LIVE_PW
    #[arg(short, long)]
    credentials: Option<PathBuf>,

    /// Candle fixture for kabus ohlcv
    #[arg(long)]
    ohlcv_fixture: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Print the static exchange descriptor
    Describe,
    /// List markets
    Markets,
    /// Fetch a ticker
    Ticker { symbol: Option<String> },
    /// Fetch an order book
    OrderBook {
        symbol: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Fetch recent public trades
    Trades {
        symbol: Option<String>,
        /// Only trades at or after this time (ms since epoch)
        #[arg(long)]
        since: Option<i64>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Fetch account balances
    Balance,
    /// Fetch candles
    Ohlcv {
        symbol: Option<String>,
        #[arg(long, default_value = "1m")]
        timeframe: String,
        #[arg(long)]
        since: Option<i64>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn default_symbol(exchange: ExchangeId) -> &'static str {
    match exchange {
        ExchangeId::Kabus => "8897@1",
        ExchangeId::Paymium => "BTC/EUR",
    }
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run one command and return its JSON rendering.
async fn run(exchange: &dyn Exchange, command: Command) -> ExchangeResult<Value> {
    let symbol_or_default =
        |symbol: Option<String>| symbol.unwrap_or_else(|| default_symbol(exchange.id()).to_string());

    let value = match command {
        Command::Describe => serde_json::to_value(exchange.describe())?,
        Command::Markets => {
            let markets = exchange.load_markets(false).await?;
            serde_json::to_value(markets.iter().map(|m| m.as_ref()).collect::<Vec<_>>())?
        }
        Command::Ticker { symbol } => {
            serde_json::to_value(exchange.fetch_ticker(&symbol_or_default(symbol)).await?)?
        }
        Command::OrderBook { symbol, limit } => serde_json::to_value(
            exchange
                .fetch_order_book(&symbol_or_default(symbol), limit)
                .await?,
        )?,
        Command::Trades {
            symbol,
            since,
            limit,
        } => serde_json::to_value(
            exchange
                .fetch_trades(&symbol_or_default(symbol), since, limit)
                .await?,
        )?,
        Command::Balance => serde_json::to_value(exchange.fetch_balance().await?)?,
        Command::Ohlcv {
            symbol,
            timeframe,
            since,
            limit,
        } => serde_json::to_value(
            exchange
                .fetch_ohlcv(&symbol_or_default(symbol), &timeframe, since, limit)
                .await?,
        )?,
    };
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args.log_level);

    println!("tradegate {}", env!("CARGO_PKG_VERSION"));

    let credentials_path = args.credentials.unwrap_or_else(default_credentials_path);
    let config = AppConfig::load(&credentials_path)?;
    let credentials = config.credentials(args.exchange);

    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(TransportConfig {
        timeout: Duration::from_secs(args.timeout_secs),
        ..Default::default()
    })?);

    let exchange: Box<dyn Exchange> = match (args.exchange, args.ohlcv_fixture) {
        (ExchangeId::Kabus, Some(fixture)) => {
            Box::new(Kabus::new(credentials, transport).with_ohlcv_fixture(fixture))
        }
        (id, _) => create_exchange(id, credentials, transport),
    };

    let command = args.command.unwrap_or(Command::Ticker { symbol: None });
    info!("{}: running {:?}", args.exchange, command);

    let output = run(exchange.as_ref(), command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
