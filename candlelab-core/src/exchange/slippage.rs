//! Slippage models: adverse execution-price adjustment.
//!
//! Buys pay up, sells receive less. Rates approximate what sweeping recent
//! trades (`TradeSweep`) or walking a synthetic order book (`SyntheticBook`)
//! would have cost; limit-book matching itself is out of scope.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::Side;

const TRADE_SWEEP_RATE: Decimal = dec!(0.0001);
const SYNTHETIC_BOOK_RATE: Decimal = dec!(0.0005);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlippageMode {
    None,
    TradeSweep,
    SyntheticBook,
}

impl SlippageMode {
    /// Execution price after slippage. Entering long and exiting short are
    /// buys; the caller passes the side of the *order*, not the position.
    pub fn apply(&self, base_price: Decimal, order_side: Side) -> Decimal {
        let rate = match self {
            SlippageMode::None => return base_price,
            SlippageMode::TradeSweep => TRADE_SWEEP_RATE,
            SlippageMode::SyntheticBook => SYNTHETIC_BOOK_RATE,
        };
        match order_side {
            Side::Long => base_price * (Decimal::ONE + rate),
            Side::Short => base_price * (Decimal::ONE - rate),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlippageMode::None => "none",
            SlippageMode::TradeSweep => "trade_sweep",
            SlippageMode::SyntheticBook => "synthetic_book",
        }
    }
}
