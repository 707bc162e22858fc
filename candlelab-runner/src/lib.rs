//! Candlelab runner: the filesystem-facing shell around the core engine.
//!
//! Loads TOML run configurations and CSV bar files, executes single- or
//! multi-symbol backtests (one engine per symbol, fanned out with rayon),
//! and writes the ledger artifacts.

pub mod config;
pub mod data;
pub mod reporting;
pub mod runner;
