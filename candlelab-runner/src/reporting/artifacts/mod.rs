//! Individual artifact writers: trade tape, equity curve, diagnostics,
//! manifest, summary.

pub mod diagnostics;
pub mod equity;
pub mod manifest;
pub mod trades;

use chrono::DateTime;

/// Format epoch milliseconds as a UTC timestamp string for CSV artifacts.
pub(crate) fn format_ts(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}
