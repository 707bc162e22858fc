//! Kijun baseline cross: the bar opens on one side of the Kijun-sen and
//! closes on the other.
//!
//! Scan mapping: trigger = open/close straddle of the baseline; trend and
//! filter are unused for this strategy (always true when the trigger holds).

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::signal::{
    ConditionScan, ReasonCode, Signal, SignalContext, SignalEvaluation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KijunCrossParams {}

pub(crate) fn evaluate(_params: &KijunCrossParams, ctx: &SignalContext<'_>) -> SignalEvaluation {
    let Some(kijun) = ctx.snapshot.kijun else {
        return SignalEvaluation::none();
    };
    let Some(kijun) = Decimal::from_f64(kijun) else {
        return SignalEvaluation::none();
    };

    let bar = ctx.bar;
    let scan = ConditionScan {
        long_trend: true,
        long_trigger: bar.open < kijun && bar.close > kijun,
        long_filter: true,
        short_trend: true,
        short_trigger: bar.open > kijun && bar.close < kijun,
        short_filter: true,
    };

    let signal = if scan.long_trigger {
        Signal::Long(ReasonCode::KijunCrossUp)
    } else if scan.short_trigger {
        Signal::Short(ReasonCode::KijunCrossDown)
    } else {
        Signal::None(ReasonCode::NoSignal)
    };

    SignalEvaluation { signal, scan }
}
