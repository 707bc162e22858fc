//! Per-bar diagnostic rows and structured run events.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Bar, ExitReason, Side};
use crate::signal::{ConditionScan, IndicatorSnapshot, ReasonCode};

/// Position state descriptor for a diagnostic row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionState {
    Warmup,
    Flat,
    Scheduled,
    Long,
    Short,
}

impl PositionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionState::Warmup => "warmup",
            PositionState::Flat => "flat",
            PositionState::Scheduled => "scheduled",
            PositionState::Long => "long",
            PositionState::Short => "short",
        }
    }
}

/// One structured row per bar: the bar itself, current indicator values, the
/// position state, the signal reason, and the predicate scanner booleans.
/// Used for regression validation and chart parity checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticRow {
    pub bar_index: usize,
    pub timestamp_ms: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub indicators: IndicatorSnapshot,
    pub state: PositionState,
    pub reason: ReasonCode,
    pub scan: ConditionScan,
}

impl DiagnosticRow {
    pub fn from_bar(
        bar_index: usize,
        bar: &Bar,
        indicators: IndicatorSnapshot,
        state: PositionState,
        reason: ReasonCode,
        scan: ConditionScan,
    ) -> Self {
        Self {
            bar_index,
            timestamp_ms: bar.timestamp_ms,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            indicators,
            state,
            reason,
            scan,
        }
    }
}

/// Equity curve point, one per bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp_ms: i64,
    pub equity: Decimal,
    /// Current drawdown from the running peak, as a fraction.
    pub drawdown: Decimal,
}

/// Structured events: signals, entries, exits, rejections, drops.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum RunEvent {
    Signal {
        bar_index: usize,
        timestamp_ms: i64,
        side: Side,
        reason: ReasonCode,
    },
    Entry {
        bar_index: usize,
        timestamp_ms: i64,
        side: Side,
        price: Decimal,
        quantity: Decimal,
        take_profit: Decimal,
        stop_loss: Decimal,
        fee: Decimal,
    },
    Exit {
        bar_index: usize,
        timestamp_ms: i64,
        side: Side,
        price: Decimal,
        reason: ExitReason,
        pnl: Decimal,
        tp_streak: u32,
        sl_streak: u32,
        equity_before: Decimal,
        equity_after: Decimal,
    },
    /// Min-notional check failed after quantization; no position opened.
    OrderRejected {
        bar_index: usize,
        timestamp_ms: i64,
        side: Side,
        price: Decimal,
        quantity: Decimal,
        notional: Decimal,
    },
    /// The next bar's timestamp did not match the scheduled activation.
    ScheduledEntryDropped {
        bar_index: usize,
        timestamp_ms: i64,
        expected_ts: i64,
        side: Side,
    },
    Cancelled {
        bar_index: usize,
        timestamp_ms: i64,
    },
}
