//! Exchange microstructure: tick/lot quantization, the min-notional filter,
//! maker/taker fees, and slippage models.

pub mod slippage;

pub use slippage::SlippageMode;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Trading rules of the venue the simulation executes against.
///
/// Invariant downstream: every executed price is an integer multiple of
/// `tick_size`, every quantity an integer multiple of `lot_size`, and
/// `price * quantity >= min_notional` or the order is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRules {
    pub tick_size: Decimal,
    pub lot_size: Decimal,
    pub min_notional: Decimal,
    /// Fee rate as a fraction, e.g. 0.001 = 0.1%.
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
}

impl ExchangeRules {
    /// Snap a price to the nearest tick multiple (round half to even).
    pub fn quantize_price(&self, price: Decimal) -> Decimal {
        quantize_step(price, self.tick_size)
    }

    /// Snap a quantity to the nearest lot multiple (round half to even).
    pub fn quantize_qty(&self, qty: Decimal) -> Decimal {
        quantize_step(qty, self.lot_size)
    }

    pub fn meets_min_notional(&self, price: Decimal, qty: Decimal) -> bool {
        price * qty >= self.min_notional
    }

    /// Fee on a notional amount.
    pub fn fee(&self, notional: Decimal, is_maker: bool) -> Decimal {
        let rate = if is_maker { self.maker_fee } else { self.taker_fee };
        notional * rate
    }
}

fn quantize_step(value: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return value;
    }
    (value / step).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven) * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rules() -> ExchangeRules {
        ExchangeRules {
            tick_size: dec!(0.01),
            lot_size: dec!(0.1),
            min_notional: dec!(100),
            maker_fee: dec!(0.0001),
            taker_fee: dec!(0.001),
        }
    }

    #[test]
    fn price_snaps_to_tick() {
        let r = rules();
        assert_eq!(r.quantize_price(dec!(100.123)), dec!(100.12));
        assert_eq!(r.quantize_price(dec!(100.126)), dec!(100.13));
    }

    #[test]
    fn midpoint_rounds_to_even() {
        let r = rules();
        // 100.125 / 0.01 = 10012.5 → rounds to 10012 (even), not 10013.
        assert_eq!(r.quantize_price(dec!(100.125)), dec!(100.12));
        // 100.135 / 0.01 = 10013.5 → rounds to 10014 (even).
        assert_eq!(r.quantize_price(dec!(100.135)), dec!(100.14));
    }

    #[test]
    fn qty_snaps_to_lot() {
        let r = rules();
        assert_eq!(r.quantize_qty(dec!(5.04)), dec!(5.0));
        assert_eq!(r.quantize_qty(dec!(5.07)), dec!(5.1));
    }

    #[test]
    fn min_notional_boundary_is_inclusive() {
        let r = rules();
        assert!(r.meets_min_notional(dec!(10), dec!(10)));
        assert!(!r.meets_min_notional(dec!(10), dec!(9.9)));
    }

    #[test]
    fn fee_selects_maker_or_taker_rate() {
        let r = rules();
        assert_eq!(r.fee(dec!(1000), true), dec!(0.1));
        assert_eq!(r.fee(dec!(1000), false), dec!(1.0));
    }
}
