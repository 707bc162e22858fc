//! Per-bar scan row export (CSV) and run event export (JSON).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use candlelab_core::report::{DiagnosticRow, RunEvent};

use super::format_ts;

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

pub fn write_diagnostics_csv(path: &Path, rows: &[DiagnosticRow]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create diagnostics CSV {}", path.display()))?;

    writeln!(
        file,
        "bar_index,time_utc,open,high,low,close,volume,ema_fast,ema_slow,atr,rsi,donchian_mid,kijun,state,reason,long_trend,long_trigger,long_filter,short_trend,short_trigger,short_filter"
    )?;

    for row in rows {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            row.bar_index,
            format_ts(row.timestamp_ms),
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume,
            fmt_opt(row.indicators.ema_fast),
            fmt_opt(row.indicators.ema_slow),
            fmt_opt(row.indicators.atr),
            fmt_opt(row.indicators.rsi),
            fmt_opt(row.indicators.donchian_mid),
            fmt_opt(row.indicators.kijun),
            row.state.as_str(),
            row.reason.as_str(),
            row.scan.long_trend,
            row.scan.long_trigger,
            row.scan.long_filter,
            row.scan.short_trend,
            row.scan.short_trigger,
            row.scan.short_filter,
        )?;
    }

    Ok(())
}

pub fn write_events_json(path: &Path, events: &[RunEvent]) -> Result<()> {
    let json = serde_json::to_string_pretty(events).context("failed to serialize events")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write events JSON {}", path.display()))?;
    Ok(())
}
