//! Protocol Scanner CLI
//!
//! Usage:
//!   protocol_scanner <query> [contract-address] [--json] [--concurrent] [--simulate]
//!
//! Exit codes: 0 report produced, 2 query could not be resolved, 1 other error.

use clap::Parser;
use eyre::Result;
use protocol_scanner::{render_text, Collectors, FetchMode, Scanner, ScannerConfig};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "protocol_scanner", version, about = "DeFi protocol safety scanner")]
struct Cli {
    /// Protocol name (e.g. "aave") or contract address
    query: String,

    /// Contract address to analyze alongside a protocol name
    contract_address: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Run the four fetch stages concurrently
    #[arg(long)]
    concurrent: bool,

    /// Use simulated data for every source
    #[arg(long)]
    simulate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays parseable
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let mut config = ScannerConfig::from_env()?;
    if cli.simulate {
        config.simulate = true;
    }
    if cli.concurrent {
        config.fetch_mode = FetchMode::Concurrent;
    }

    let collectors = Collectors::from_config(&config)?;
    let scanner = Scanner::new(collectors, &config);

    let state = scanner
        .run_scan(&cli.query, cli.contract_address.as_deref())
        .await;

    match state.into_outcome() {
        Ok(report) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", render_text(&report));
            }
            Ok(())
        }
        Err(error) => {
            eprintln!("❌ {}", error);
            std::process::exit(2);
        }
    }
}
