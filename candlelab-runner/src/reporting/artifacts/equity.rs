//! Equity curve export (CSV).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use candlelab_core::report::EquityPoint;

use super::format_ts;

pub fn write_equity_csv(path: &Path, curve: &[EquityPoint]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create equity CSV {}", path.display()))?;

    writeln!(file, "time_utc,timestamp_ms,equity,drawdown")?;
    for point in curve {
        writeln!(
            file,
            "{},{},{},{}",
            format_ts(point.timestamp_ms),
            point.timestamp_ms,
            point.equity,
            point.drawdown,
        )?;
    }

    Ok(())
}
