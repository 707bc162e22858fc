//! Bar source: validated, strictly-ordered OHLCV stream with cadence
//! detection and data-quality gates.
//!
//! The core does not fetch data. Callers hand over a pre-materialized,
//! timestamp-sorted vector of bars; construction refuses streams that fail
//! the hard quality guards and reports the detected cadence for the rest of
//! the engine to use.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::domain::{Bar, BarError};

/// How many leading timestamp deltas participate in cadence detection.
const CADENCE_SAMPLE: usize = 2000;

/// Fraction of short-cadence deltas above which the stream is refused.
const MAX_SHORT_DELTA_RATIO: f64 = 0.05;

/// Fatal input problems. Any of these aborts the run before a single trade
/// is produced.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("bar stream requires at least 2 bars, got {0}")]
    TooShort(usize),

    #[error("non-monotonic timestamp at index {index}: {timestamp_ms} follows {prev_timestamp_ms}")]
    NonMonotonic {
        index: usize,
        timestamp_ms: i64,
        prev_timestamp_ms: i64,
    },

    #[error("{ratio:.1}% of deltas are shorter than the {cadence_ms}ms cadence")]
    CadenceViolation { ratio: f64, cadence_ms: i64 },

    #[error(transparent)]
    Bar(#[from] BarError),
}

/// Ordered bar stream, validated at construction.
///
/// Guarantees after `new` succeeds: strictly increasing timestamps, positive
/// prices, OHLC consistency, and a detected modal cadence. Gaps (deltas
/// larger than the cadence) are counted and logged, never fatal.
#[derive(Debug, Clone)]
pub struct BarSource {
    bars: Vec<Bar>,
    cadence_ms: i64,
    gap_count: usize,
}

impl BarSource {
    pub fn new(bars: Vec<Bar>) -> Result<Self, InputError> {
        if bars.len() < 2 {
            return Err(InputError::TooShort(bars.len()));
        }

        for (index, bar) in bars.iter().enumerate() {
            bar.validate()?;
            if index > 0 {
                let prev = bars[index - 1].timestamp_ms;
                if bar.timestamp_ms <= prev {
                    return Err(InputError::NonMonotonic {
                        index,
                        timestamp_ms: bar.timestamp_ms,
                        prev_timestamp_ms: prev,
                    });
                }
            }
        }

        let cadence_ms = detect_cadence(&bars);

        let mut short_deltas = 0usize;
        let mut gap_count = 0usize;
        let delta_count = bars.len() - 1;
        for pair in bars.windows(2) {
            let delta = pair[1].timestamp_ms - pair[0].timestamp_ms;
            if delta < cadence_ms {
                short_deltas += 1;
            } else if delta > cadence_ms {
                gap_count += 1;
            }
        }

        let ratio = short_deltas as f64 / delta_count as f64;
        if ratio > MAX_SHORT_DELTA_RATIO {
            return Err(InputError::CadenceViolation { ratio: ratio * 100.0, cadence_ms });
        }

        if gap_count > 0 {
            warn!(gap_count, cadence_ms, "bar stream contains gaps");
        }

        Ok(Self { bars, cadence_ms, gap_count })
    }

    /// Detected modal timestamp delta in milliseconds.
    pub fn cadence_ms(&self) -> i64 {
        self.cadence_ms
    }

    /// Number of deltas larger than the cadence.
    pub fn gap_count(&self) -> usize {
        self.gap_count
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }
}

/// Modal delta over the first `CADENCE_SAMPLE` consecutive deltas.
/// Ties resolve to the smaller delta so detection is deterministic.
fn detect_cadence(bars: &[Bar]) -> i64 {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for pair in bars.windows(2).take(CADENCE_SAMPLE) {
        let delta = pair[1].timestamp_ms - pair[0].timestamp_ms;
        if delta > 0 {
            *counts.entry(delta).or_insert(0) += 1;
        }
    }

    let mut best_delta = 0i64;
    let mut best_count = 0usize;
    for (delta, count) in counts {
        if count > best_count {
            best_count = count;
            best_delta = delta;
        }
    }
    best_delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar_at(ts: i64) -> Bar {
        Bar::new(ts, dec!(100), dec!(101), dec!(99), dec!(100), dec!(10))
    }

    fn regular_bars(count: usize, cadence: i64) -> Vec<Bar> {
        (0..count).map(|i| bar_at(i as i64 * cadence)).collect()
    }

    #[test]
    fn detects_modal_cadence() {
        let source = BarSource::new(regular_bars(50, 60_000)).unwrap();
        assert_eq!(source.cadence_ms(), 60_000);
        assert_eq!(source.gap_count(), 0);
    }

    #[test]
    fn gaps_are_counted_not_fatal() {
        let mut bars = regular_bars(50, 60_000);
        // Remove two bars to create gaps.
        bars.remove(10);
        bars.remove(20);
        let source = BarSource::new(bars).unwrap();
        assert_eq!(source.cadence_ms(), 60_000);
        assert_eq!(source.gap_count(), 2);
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let mut bars = regular_bars(10, 60_000);
        bars[5].timestamp_ms = bars[4].timestamp_ms;
        let err = BarSource::new(bars).unwrap_err();
        assert!(matches!(err, InputError::NonMonotonic { index: 5, .. }));
    }

    #[test]
    fn rejects_out_of_order_timestamps() {
        let mut bars = regular_bars(10, 60_000);
        bars[3].timestamp_ms = 1;
        assert!(matches!(
            BarSource::new(bars),
            Err(InputError::NonMonotonic { .. })
        ));
    }

    #[test]
    fn rejects_excessive_short_deltas() {
        // Mostly 60s bars with >5% of deltas at 30s.
        let mut bars = Vec::new();
        let mut ts = 0i64;
        for i in 0..40 {
            bars.push(bar_at(ts));
            ts += if i % 10 == 0 { 30_000 } else { 60_000 };
        }
        assert!(matches!(
            BarSource::new(bars),
            Err(InputError::CadenceViolation { .. })
        ));
    }

    #[test]
    fn rejects_invalid_bar() {
        let mut bars = regular_bars(10, 60_000);
        bars[2].low = dec!(200);
        assert!(matches!(BarSource::new(bars), Err(InputError::Bar(_))));
    }

    #[test]
    fn rejects_single_bar() {
        assert!(matches!(
            BarSource::new(vec![bar_at(0)]),
            Err(InputError::TooShort(1))
        ));
    }
}
