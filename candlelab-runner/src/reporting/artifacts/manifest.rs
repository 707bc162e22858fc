//! Run manifest and summary export (JSON).

use std::path::Path;

use anyhow::{Context, Result};

use candlelab_core::engine::RunManifest;
use candlelab_core::report::Summary;

pub fn write_manifest_json(path: &Path, manifest: &RunManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest).context("failed to serialize manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write manifest {}", path.display()))?;
    Ok(())
}

pub fn write_summary_json(path: &Path, summary: &Summary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("failed to serialize summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write summary {}", path.display()))?;
    Ok(())
}
