use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Single OHLCV bar. `timestamp_ms` is the bar's open time in Unix epoch
/// milliseconds. Prices and volume are fixed-precision decimals so that all
/// money arithmetic downstream stays exact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bar {
    pub timestamp_ms: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    pub fn new(
        timestamp_ms: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self { timestamp_ms, open, high, low, close, volume }
    }

    /// Validate bar invariants: positive prices, OHLC consistency,
    /// non-negative volume.
    pub fn validate(&self) -> Result<(), BarError> {
        if self.open <= Decimal::ZERO
            || self.high <= Decimal::ZERO
            || self.low <= Decimal::ZERO
            || self.close <= Decimal::ZERO
        {
            return Err(BarError::NonPositivePrice { timestamp_ms: self.timestamp_ms });
        }
        if self.high < self.low {
            return Err(BarError::InvalidRange { high: self.high, low: self.low });
        }
        if self.high < self.open.max(self.close) {
            return Err(BarError::HighBelowBody { timestamp_ms: self.timestamp_ms });
        }
        if self.low > self.open.min(self.close) {
            return Err(BarError::LowAboveBody { timestamp_ms: self.timestamp_ms });
        }
        if self.volume < Decimal::ZERO {
            return Err(BarError::NegativeVolume { timestamp_ms: self.timestamp_ms });
        }
        Ok(())
    }

    /// Check if bar closed at or above its open.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }

    /// Signed body fraction relative to the open: (close - open) / open.
    /// 0.002 means a +0.2% body.
    pub fn body_fraction(&self) -> Decimal {
        if self.open.is_zero() {
            return Decimal::ZERO;
        }
        (self.close - self.open) / self.open
    }

    pub fn open_f64(&self) -> f64 {
        self.open.to_f64().unwrap_or(f64::NAN)
    }

    pub fn high_f64(&self) -> f64 {
        self.high.to_f64().unwrap_or(f64::NAN)
    }

    pub fn low_f64(&self) -> f64 {
        self.low.to_f64().unwrap_or(f64::NAN)
    }

    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Error)]
pub enum BarError {
    #[error("invalid bar range: high={high}, low={low}")]
    InvalidRange { high: Decimal, low: Decimal },

    #[error("non-positive price at {timestamp_ms}")]
    NonPositivePrice { timestamp_ms: i64 },

    #[error("high below max(open, close) at {timestamp_ms}")]
    HighBelowBody { timestamp_ms: i64 },

    #[error("low above min(open, close) at {timestamp_ms}")]
    LowAboveBody { timestamp_ms: i64 },

    #[error("negative volume at {timestamp_ms}")]
    NegativeVolume { timestamp_ms: i64 },
}
