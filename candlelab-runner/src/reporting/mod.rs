//! Ledger artifact writers.

pub mod artifacts;

use std::path::Path;

use anyhow::Result;

use crate::runner::RunArtifacts;

/// Write the full artifact set for one run into `out_dir`.
pub fn write_all(out_dir: &Path, symbol: &str, artifacts: &RunArtifacts) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    artifacts::trades::write_trades_csv(
        &out_dir.join("trades.csv"),
        symbol,
        &artifacts.ledger.trades,
    )?;
    artifacts::trades::write_trades_json(&out_dir.join("trades.json"), &artifacts.ledger.trades)?;
    artifacts::equity::write_equity_csv(
        &out_dir.join("equity.csv"),
        &artifacts.ledger.equity_curve,
    )?;
    artifacts::diagnostics::write_diagnostics_csv(
        &out_dir.join("diagnostics.csv"),
        &artifacts.ledger.diagnostics,
    )?;
    artifacts::diagnostics::write_events_json(
        &out_dir.join("events.json"),
        &artifacts.ledger.events,
    )?;
    artifacts::manifest::write_manifest_json(
        &out_dir.join("manifest.json"),
        &artifacts.outcome.manifest,
    )?;
    artifacts::manifest::write_summary_json(
        &out_dir.join("summary.json"),
        &artifacts.outcome.summary,
    )?;
    Ok(())
}
