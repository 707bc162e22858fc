//! CSV bar loading.
//!
//! Expected layout: `timestamp_ms,open,high,low,close,volume`, header row
//! and UTF-8 BOM tolerated. Rows that fail to parse are skipped and counted;
//! hard stream-quality guards (monotonicity, cadence) are applied by the
//! core `BarSource` after loading. Duplicate timestamps keep the last row,
//! matching exchange-archive repair dumps.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::warn;

use candlelab_core::data::BarSource;
use candlelab_core::domain::Bar;

pub fn load_bars_csv(path: &Path) -> Result<BarSource> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open bar file {}", path.display()))?;

    let mut bars: Vec<Bar> = Vec::new();
    let mut skipped = 0usize;

    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("CSV read error at line {line}"))?;
        if record.len() < 6 {
            skipped += 1;
            continue;
        }

        let ts_field = record[0].trim().trim_start_matches('\u{feff}');
        let Ok(timestamp_ms) = ts_field.parse::<i64>() else {
            // Header row or junk line.
            skipped += 1;
            continue;
        };

        let prices: Option<[Decimal; 4]> = (|| {
            Some([
                Decimal::from_str(record[1].trim()).ok()?,
                Decimal::from_str(record[2].trim()).ok()?,
                Decimal::from_str(record[3].trim()).ok()?,
                Decimal::from_str(record[4].trim()).ok()?,
            ])
        })();
        let Some([open, high, low, close]) = prices else {
            skipped += 1;
            continue;
        };
        let volume = Decimal::from_str(record[5].trim()).unwrap_or(Decimal::ZERO);

        bars.push(Bar::new(timestamp_ms, open, high, low, close, volume));
    }

    if skipped > 0 {
        warn!(skipped, path = %path.display(), "skipped unparseable CSV rows");
    }

    // Sort by timestamp; for duplicate timestamps the last row wins.
    bars.sort_by_key(|bar| bar.timestamp_ms);
    bars.dedup_by(|next, prev| {
        if next.timestamp_ms == prev.timestamp_ms {
            *prev = next.clone();
            true
        } else {
            false
        }
    });

    let source = BarSource::new(bars)?;
    Ok(source)
}
