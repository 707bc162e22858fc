//! Position sizing: translate a dollar amount into quantity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    /// `risk_amount` is the notional to deploy: qty = risk / price.
    Notional,
    /// `risk_amount` is the dollar loss at the stop:
    /// qty = risk / |entry - stop|. Falls back to notional sizing when the
    /// stop distance is zero.
    Risk,
}

impl SizingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizingMode::Notional => "notional",
            SizingMode::Risk => "risk",
        }
    }

    /// Pre-quantization quantity for an entry.
    pub fn quantity(
        &self,
        risk_amount: Decimal,
        exec_price: Decimal,
        stop_loss: Decimal,
    ) -> Decimal {
        match self {
            SizingMode::Notional => risk_amount / exec_price,
            SizingMode::Risk => {
                let distance = (exec_price - stop_loss).abs();
                if distance > Decimal::ZERO {
                    risk_amount / distance
                } else {
                    risk_amount / exec_price
                }
            }
        }
    }
}

/// TP/SL distance specification. `Pct` is a fraction of the execution price;
/// `AtrMultiple` is a multiple of the ATR captured for the entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSpec {
    Pct(Decimal),
    AtrMultiple(Decimal),
}

impl LevelSpec {
    /// Unsigned distance from the execution price.
    pub fn distance(&self, exec_price: Decimal, atr: Option<Decimal>) -> Option<Decimal> {
        match self {
            LevelSpec::Pct(p) => Some(exec_price * *p),
            LevelSpec::AtrMultiple(m) => atr.map(|atr| atr * *m),
        }
    }
}
