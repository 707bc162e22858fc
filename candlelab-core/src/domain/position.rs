use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::side::Side;
use crate::signal::ReasonCode;

/// An open position. At most one exists per simulation at any time.
///
/// Created by the position manager on entry, read by the intrabar resolver,
/// destroyed on closure. `entry_price`, `quantity`, `take_profit` and
/// `stop_loss` are post-slippage, tick/lot-quantized values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePosition {
    pub side: Side,
    pub entry_bar_index: usize,
    pub entry_ts: i64,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
    pub entry_fee: Decimal,
    /// entry_price * quantity at fill time.
    pub notional: Decimal,
    /// Bar index at which the position times out, when max_holding_bars > 0.
    pub expiry_bar_index: Option<usize>,
    /// ATR captured at the signal (or entry) bar, for attribution.
    pub atr_at_entry: Option<f64>,
}

impl ActivePosition {
    /// True when `bar_index` has reached the TTL boundary.
    pub fn is_expired(&self, bar_index: usize) -> bool {
        self.expiry_bar_index.is_some_and(|expiry| bar_index >= expiry)
    }
}

/// An intent to enter on a future bar's open (next-bar-open entry mode).
///
/// Created when a signal fires at the close of bar *i*; consumed when the
/// next bar's timestamp equals `activate_at_ts`, dropped (with an event) when
/// a data gap pushes the next bar past the expected cadence boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEntry {
    pub activate_at_ts: i64,
    pub side: Side,
    pub reason: ReasonCode,
    /// ATR at the signal bar, carried so ATR-based TP/SL distances use the
    /// signal bar's volatility by default.
    pub atr_at_signal: Option<f64>,
}
