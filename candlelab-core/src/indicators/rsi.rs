//! Relative Strength Index (RSI), Wilder-smoothed.
//!
//! Seed: average gain/loss = mean over the first `period` close changes.
//! Then Wilder smoothing on gains and losses;
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), RSI = 100 when avg_loss = 0.

use crate::domain::Bar;
use crate::indicators::Kernel;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev_close: Option<f64>,
    changes_seen: usize,
    gain_sum: f64,
    loss_sum: f64,
    avg_gain: f64,
    avg_loss: f64,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            prev_close: None,
            changes_seen: 0,
            gain_sum: 0.0,
            loss_sum: 0.0,
            avg_gain: f64::NAN,
            avg_loss: f64::NAN,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Kernel for Rsi {
    fn push(&mut self, bar: &Bar) {
        let close = bar.close_f64();

        if let Some(prev_close) = self.prev_close {
            let change = close - prev_close;
            let gain = if change > 0.0 { change } else { 0.0 };
            let loss = if change < 0.0 { -change } else { 0.0 };
            self.changes_seen += 1;

            if self.changes_seen < self.period {
                self.gain_sum += gain;
                self.loss_sum += loss;
            } else if self.changes_seen == self.period {
                self.gain_sum += gain;
                self.loss_sum += loss;
                self.avg_gain = self.gain_sum / self.period as f64;
                self.avg_loss = self.loss_sum / self.period as f64;
            } else {
                let n = self.period as f64;
                self.avg_gain = (self.avg_gain * (n - 1.0) + gain) / n;
                self.avg_loss = (self.avg_loss * (n - 1.0) + loss) / n;
            }
        }

        self.prev_close = Some(close);
    }

    fn value(&self) -> Option<f64> {
        if !self.is_warm() {
            return None;
        }
        if self.avg_loss == 0.0 {
            return Some(100.0);
        }
        let rs = self.avg_gain / self.avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }

    fn is_warm(&self) -> bool {
        self.changes_seen >= self.period
    }

    fn warmup_bars(&self) -> usize {
        self.period + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains_is_100() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let mut rsi = Rsi::new(3);
        for bar in &bars {
            rsi.push(bar);
        }
        assert_approx(rsi.value().unwrap(), 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0]);
        let mut rsi = Rsi::new(3);
        for bar in &bars {
            rsi.push(bar);
        }
        assert_approx(rsi.value().unwrap(), 0.0, 1e-9);
    }

    #[test]
    fn rsi_mixed_known_value() {
        // Closes: 44, 44.34, 44.09, 43.61, changes: +0.34, -0.25, -0.48.
        // avg_gain = 0.34/3, avg_loss = 0.73/3
        // RSI = 100 - 100/(1 + 0.34/0.73) = 31.7757...
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61]);
        let mut rsi = Rsi::new(3);
        for bar in &bars {
            rsi.push(bar);
        }
        assert_approx(rsi.value().unwrap(), 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);
    }

    #[test]
    fn rsi_stays_in_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let mut rsi = Rsi::new(3);
        for bar in &bars {
            rsi.push(bar);
            if let Some(v) = rsi.value() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds: {v}");
            }
        }
    }

    #[test]
    fn rsi_warm_after_period_plus_one_bars() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let mut rsi = Rsi::new(3);
        for bar in &bars[..3] {
            rsi.push(bar);
            assert!(rsi.value().is_none());
        }
        rsi.push(&bars[3]);
        assert!(rsi.value().is_some());
        assert_eq!(rsi.warmup_bars(), 4);
    }
}
