//! EMA trend strategy: fast/slow EMA alignment, close confirmation, and an
//! inclusive body-size band, with an optional RSI band gate.
//!
//! Long when fast EMA > slow EMA, close > fast EMA, and the signed body
//! fraction lies inside [body_min_long, body_max_long]. Short mirrors with
//! the (negative) short band. Scan mapping: trend = EMA alignment,
//! trigger = close beyond fast EMA, filter = body band (and RSI when set).

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::signal::{
    ConditionScan, ReasonCode, Signal, SignalContext, SignalEvaluation,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmaCrossParams {
    /// Inclusive signed body band for longs, e.g. 0.002..=0.008.
    pub body_min_long: Decimal,
    pub body_max_long: Decimal,
    /// Inclusive signed body band for shorts, e.g. -0.008..=-0.002.
    pub body_min_short: Decimal,
    pub body_max_short: Decimal,
    /// Optional RSI gate: signal only when rsi_min <= RSI <= rsi_max.
    #[serde(default)]
    pub rsi_min: Option<f64>,
    #[serde(default)]
    pub rsi_max: Option<f64>,
}

impl Default for EmaCrossParams {
    fn default() -> Self {
        Self {
            body_min_long: Decimal::new(2, 3),   // 0.002
            body_max_long: Decimal::new(8, 3),   // 0.008
            body_min_short: Decimal::new(-8, 3), // -0.008
            body_max_short: Decimal::new(-2, 3), // -0.002
            rsi_min: None,
            rsi_max: None,
        }
    }
}

pub(crate) fn evaluate(params: &EmaCrossParams, ctx: &SignalContext<'_>) -> SignalEvaluation {
    let (Some(fast), Some(slow)) = (ctx.snapshot.ema_fast, ctx.snapshot.ema_slow) else {
        return SignalEvaluation::none();
    };
    let (Some(fast), Some(slow)) = (Decimal::from_f64(fast), Decimal::from_f64(slow)) else {
        return SignalEvaluation::none();
    };

    let bar = ctx.bar;
    let body = bar.body_fraction();

    let rsi_ok = match (params.rsi_min, params.rsi_max, ctx.snapshot.rsi) {
        (None, None, _) => true,
        (lo, hi, Some(rsi)) => {
            rsi >= lo.unwrap_or(f64::NEG_INFINITY) && rsi <= hi.unwrap_or(f64::INFINITY)
        }
        // RSI gate configured but kernel not warm: block.
        (_, _, None) => false,
    };

    let scan = ConditionScan {
        long_trend: fast > slow,
        long_trigger: bar.close > fast,
        long_filter: body >= params.body_min_long && body <= params.body_max_long,
        short_trend: fast < slow,
        short_trigger: bar.close < fast,
        short_filter: body >= params.body_min_short && body <= params.body_max_short,
    };

    let signal = if scan.long_trend && scan.long_trigger {
        if !scan.long_filter {
            if body < params.body_min_long {
                Signal::None(ReasonCode::BodyTooSmall)
            } else {
                Signal::None(ReasonCode::BodyTooLarge)
            }
        } else if !rsi_ok {
            Signal::None(ReasonCode::RsiOutOfBand)
        } else {
            Signal::Long(ReasonCode::EmaCrossUp)
        }
    } else if scan.short_trend && scan.short_trigger {
        if !scan.short_filter {
            if body > params.body_max_short {
                Signal::None(ReasonCode::BodyTooSmall)
            } else {
                Signal::None(ReasonCode::BodyTooLarge)
            }
        } else if !rsi_ok {
            Signal::None(ReasonCode::RsiOutOfBand)
        } else {
            Signal::Short(ReasonCode::EmaCrossDown)
        }
    } else {
        Signal::None(ReasonCode::NoSignal)
    };

    SignalEvaluation { signal, scan }
}
