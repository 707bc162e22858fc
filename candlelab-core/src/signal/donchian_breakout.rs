//! Donchian basis breakout: the bar crosses the channel midline in the
//! direction of the slow-EMA regime.
//!
//! Long when basis > slow EMA and the bar opened below the basis but closed
//! above it; short mirrors. Scan mapping: trend = basis vs slow EMA,
//! trigger = open/close straddle of the basis, filter unused (always true
//! when the trigger holds).

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::signal::{
    ConditionScan, ReasonCode, Signal, SignalContext, SignalEvaluation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DonchianBreakoutParams {}

pub(crate) fn evaluate(
    _params: &DonchianBreakoutParams,
    ctx: &SignalContext<'_>,
) -> SignalEvaluation {
    let (Some(basis), Some(slow)) = (ctx.snapshot.donchian_mid, ctx.snapshot.ema_slow) else {
        return SignalEvaluation::none();
    };
    let (Some(basis), Some(slow)) = (Decimal::from_f64(basis), Decimal::from_f64(slow)) else {
        return SignalEvaluation::none();
    };

    let bar = ctx.bar;
    let scan = ConditionScan {
        long_trend: basis > slow,
        long_trigger: bar.open < basis && bar.close > basis,
        long_filter: true,
        short_trend: basis < slow,
        short_trigger: bar.open > basis && bar.close < basis,
        short_filter: true,
    };

    let signal = if scan.long_trend && scan.long_trigger {
        Signal::Long(ReasonCode::DonchianBreakoutLong)
    } else if scan.short_trend && scan.short_trigger {
        Signal::Short(ReasonCode::DonchianBreakoutShort)
    } else {
        Signal::None(ReasonCode::NoSignal)
    };

    SignalEvaluation { signal, scan }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use crate::signal::IndicatorSnapshot;
    use rust_decimal_macros::dec;

    fn snapshot(basis: f64, slow: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            donchian_mid: Some(basis),
            ema_slow: Some(slow),
            ..Default::default()
        }
    }

    fn bar(open: Decimal, close: Decimal) -> Bar {
        let high = open.max(close) + dec!(1);
        let low = open.min(close) - dec!(1);
        Bar::new(0, open, high, low, close, dec!(1000))
    }

    #[test]
    fn long_breakout_through_basis() {
        let b = bar(dec!(99), dec!(101));
        let prev = bar(dec!(99), dec!(99));
        let snap = snapshot(100.0, 95.0);
        let eval = evaluate(
            &DonchianBreakoutParams::default(),
            &SignalContext { bar: &b, prev: &prev, snapshot: &snap },
        );
        assert_eq!(eval.signal, Signal::Long(ReasonCode::DonchianBreakoutLong));
    }

    #[test]
    fn no_signal_against_regime() {
        // Crossing up through the basis while basis < slow EMA.
        let b = bar(dec!(99), dec!(101));
        let prev = bar(dec!(99), dec!(99));
        let snap = snapshot(100.0, 105.0);
        let eval = evaluate(
            &DonchianBreakoutParams::default(),
            &SignalContext { bar: &b, prev: &prev, snapshot: &snap },
        );
        assert_eq!(eval.signal, Signal::None(ReasonCode::NoSignal));
    }

    #[test]
    fn short_breakdown_through_basis() {
        let b = bar(dec!(101), dec!(99));
        let prev = bar(dec!(101), dec!(101));
        let snap = snapshot(100.0, 105.0);
        let eval = evaluate(
            &DonchianBreakoutParams::default(),
            &SignalContext { bar: &b, prev: &prev, snapshot: &snap },
        );
        assert_eq!(eval.signal, Signal::Short(ReasonCode::DonchianBreakoutShort));
    }

    #[test]
    fn close_on_basis_does_not_trigger() {
        let b = bar(dec!(99), dec!(100));
        let prev = bar(dec!(99), dec!(99));
        let snap = snapshot(100.0, 95.0);
        let eval = evaluate(
            &DonchianBreakoutParams::default(),
            &SignalContext { bar: &b, prev: &prev, snapshot: &snap },
        );
        assert_eq!(eval.signal, Signal::None(ReasonCode::NoSignal));
    }
}
