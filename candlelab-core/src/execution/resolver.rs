//! First-touch TP/SL resolution inside a single OHLC bar.
//!
//! When only one level lies inside the bar's range the answer is trivial.
//! When both do, the bar alone cannot tell which was struck first, so the
//! policy decides:
//!
//! - `SlFirst`: the stop wins (conservative). SL wins exact ties.
//! - `TpFirst`: the target wins. TP wins exact ties.
//! - `ChartOrder`: approximate the intrabar path from the candle shape.
//!   An up bar (close >= open) is modeled as open → low → high → close, a
//!   down bar as open → high → low → close; the first extremum visited
//!   decides which level was touched first. If neither level actually lies
//!   inside [low, high] (floating-equality defense; hit detection should
//!   preclude it), fall back to whichever level is nearer the entry price,
//!   TP winning an exact distance tie.
//!
//! The resolver is a pure function of its inputs; all comparisons are on
//! fixed-precision decimals.

use serde::{Deserialize, Serialize};

use crate::domain::{ActivePosition, Bar, ExitReason, Side};

/// Same-bar TP+SL disambiguation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstTouchPolicy {
    SlFirst,
    TpFirst,
    ChartOrder,
}

impl FirstTouchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirstTouchPolicy::SlFirst => "sl_first",
            FirstTouchPolicy::TpFirst => "tp_first",
            FirstTouchPolicy::ChartOrder => "chart_order",
        }
    }
}

/// A resolved exit: the fill price and its reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub exit_price: rust_decimal::Decimal,
    pub reason: ExitReason,
}

/// Resolve whether the bar touched the position's TP or SL, and which first.
/// Returns `None` when neither level was hit.
pub fn resolve_first_touch(
    bar: &Bar,
    position: &ActivePosition,
    policy: FirstTouchPolicy,
) -> Option<Resolution> {
    let tp = position.take_profit;
    let sl = position.stop_loss;

    let (hit_tp, hit_sl) = match position.side {
        Side::Long => (bar.high >= tp, bar.low <= sl),
        Side::Short => (bar.low <= tp, bar.high >= sl),
    };

    match (hit_tp, hit_sl) {
        (false, false) => None,
        (true, false) => Some(Resolution { exit_price: tp, reason: ExitReason::TakeProfit }),
        (false, true) => Some(Resolution { exit_price: sl, reason: ExitReason::StopLoss }),
        (true, true) => Some(resolve_both_hit(bar, position, policy)),
    }
}

fn resolve_both_hit(
    bar: &Bar,
    position: &ActivePosition,
    policy: FirstTouchPolicy,
) -> Resolution {
    let tp = position.take_profit;
    let sl = position.stop_loss;

    match policy {
        FirstTouchPolicy::SlFirst => Resolution { exit_price: sl, reason: ExitReason::StopLoss },
        FirstTouchPolicy::TpFirst => Resolution { exit_price: tp, reason: ExitReason::TakeProfit },
        FirstTouchPolicy::ChartOrder => {
            // Defend against levels outside the bar range despite both hit
            // flags; then the path walk cannot place them.
            let tp_in_range = tp >= bar.low && tp <= bar.high;
            let sl_in_range = sl >= bar.low && sl <= bar.high;
            if !tp_in_range || !sl_in_range {
                return nearer_to_entry(position);
            }

            // Up bar visits the low before the high; down bar the reverse.
            // For a long the SL sits at the low side and the TP at the high
            // side; a short mirrors.
            let low_side_first = bar.is_up();
            let sl_on_low_side = position.side == Side::Long;
            let sl_first = low_side_first == sl_on_low_side;

            if sl_first {
                Resolution { exit_price: sl, reason: ExitReason::StopLoss }
            } else {
                Resolution { exit_price: tp, reason: ExitReason::TakeProfit }
            }
        }
    }
}

/// Distance fallback: whichever level is nearer the entry wins; TP takes an
/// exact tie.
fn nearer_to_entry(position: &ActivePosition) -> Resolution {
    let tp_distance = (position.take_profit - position.entry_price).abs();
    let sl_distance = (position.entry_price - position.stop_loss).abs();
    if tp_distance <= sl_distance {
        Resolution { exit_price: position.take_profit, reason: ExitReason::TakeProfit }
    } else {
        Resolution { exit_price: position.stop_loss, reason: ExitReason::StopLoss }
    }
}
