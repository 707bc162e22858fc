//! Candlelab CLI — run a backtest from a TOML config and a CSV bar file,
//! writing the ledger artifacts to an output directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use candlelab_core::engine::CancelToken;
use candlelab_runner::config::RunConfig;
use candlelab_runner::data::load_bars_csv;
use candlelab_runner::reporting;
use candlelab_runner::runner::run_symbol;

#[derive(Parser)]
#[command(name = "candlelab", about = "Deterministic candlestick backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a backtest and write artifacts.
    Run {
        /// TOML strategy configuration.
        #[arg(long)]
        config: PathBuf,
        /// CSV bar file (timestamp_ms,open,high,low,close,volume).
        #[arg(long)]
        data: PathBuf,
        /// Output directory for artifacts.
        #[arg(long, default_value = "out")]
        out: PathBuf,
        /// Override the symbol named in the config.
        #[arg(long)]
        symbol: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { config, data, out, symbol } => run(config, data, out, symbol),
    }
}

fn run(config_path: PathBuf, data_path: PathBuf, out: PathBuf, symbol: Option<String>) -> Result<()> {
    let run_config = RunConfig::from_file(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let symbol = symbol.unwrap_or_else(|| run_config.symbol().to_string());
    let strategy_config = run_config.to_strategy_config()?;

    let source = load_bars_csv(&data_path)?;
    info!(
        symbol,
        bars = source.len(),
        cadence_ms = source.cadence_ms(),
        gaps = source.gap_count(),
        "loaded bar stream"
    );

    let artifacts = run_symbol(&symbol, strategy_config, &source, &CancelToken::new())?;
    reporting::write_all(&out, &symbol, &artifacts)?;

    let summary = &artifacts.outcome.summary;
    println!("=== TRADE SUMMARY ===");
    println!("Total Trades: {}", summary.total_trades);
    println!("Wins: {}", summary.wins);
    println!("Losses: {}", summary.losses);
    println!("Win Rate: {}", summary.win_rate);
    println!("Net PnL: ${}", summary.net_pnl);
    println!("Average Win: ${}", summary.avg_win);
    println!("Average Loss: ${}", summary.avg_loss);
    println!("Expectancy: ${}", summary.expectancy);
    match summary.profit_factor {
        Some(pf) => println!("Profit Factor: {pf}"),
        None => println!("Profit Factor: n/a"),
    }
    println!("Max Drawdown: {}", summary.max_drawdown);
    println!("Max TP Streak: {}", summary.max_tp_streak);
    println!("Max SL Streak: {}", summary.max_sl_streak);
    println!("Artifacts written to {}", out.display());

    Ok(())
}
