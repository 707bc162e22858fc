//! Equity and drawdown tracking.

use rust_decimal::Decimal;

use crate::domain::Trade;
use crate::engine::config::EquityUpdate;

/// Run-scoped equity state. Realized PnL moves equity on trade closure under
/// the configured discipline; the peak and max drawdown are marked on every
/// bar.
#[derive(Debug, Clone)]
pub struct EquityState {
    mode: EquityUpdate,
    initial: Decimal,
    current: Decimal,
    peak: Decimal,
    max_drawdown: Decimal,
    realized_total: Decimal,
}

impl EquityState {
    pub fn new(initial: Decimal, mode: EquityUpdate) -> Self {
        Self {
            mode,
            initial,
            current: initial,
            peak: initial,
            max_drawdown: Decimal::ZERO,
            realized_total: Decimal::ZERO,
        }
    }

    pub fn current(&self) -> Decimal {
        self.current
    }

    pub fn peak(&self) -> Decimal {
        self.peak
    }

    /// Largest peak-to-trough decline seen so far, as a fraction of the peak.
    pub fn max_drawdown(&self) -> Decimal {
        self.max_drawdown
    }

    /// Apply a closed trade's realized PnL.
    pub fn apply_trade(&mut self, trade: &Trade) {
        self.realized_total += trade.pnl;
        match self.mode {
            EquityUpdate::Compounding => {
                self.current *= Decimal::ONE + trade.pnl_fraction;
            }
            EquityUpdate::Accumulating => {
                self.current = self.initial + self.realized_total;
            }
        }
    }

    /// Mark peak/drawdown state; called once per bar. Returns the current
    /// drawdown fraction.
    pub fn mark(&mut self) -> Decimal {
        if self.current > self.peak {
            self.peak = self.current;
        }
        let drawdown = if self.peak.is_zero() {
            Decimal::ZERO
        } else {
            (self.peak - self.current) / self.peak
        };
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
        drawdown
    }
}
