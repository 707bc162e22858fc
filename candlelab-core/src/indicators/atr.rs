//! Average True Range (ATR), Wilder-smoothed (RMA).
//!
//! TR[t] = max(high - low, |high - prev_close|, |low - prev_close|).
//! Seed: ATR at bar `period` = mean of the first `period` true ranges
//! (indices 1..=period). Recursion: ATR[t] = (ATR[t-1]*(period-1) + TR[t]) / period.
//! Warm after period + 1 bars: the first bar has no previous close.

use crate::domain::Bar;
use crate::indicators::Kernel;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_close: Option<f64>,
    tr_seen: usize,
    seed_sum: f64,
    value: f64,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            prev_close: None,
            tr_seen: 0,
            seed_sum: 0.0,
            value: f64::NAN,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Kernel for Atr {
    fn push(&mut self, bar: &Bar) {
        let high = bar.high_f64();
        let low = bar.low_f64();
        let close = bar.close_f64();

        if let Some(prev_close) = self.prev_close {
            let tr = (high - low)
                .max((high - prev_close).abs())
                .max((low - prev_close).abs());
            self.tr_seen += 1;

            if self.tr_seen < self.period {
                self.seed_sum += tr;
            } else if self.tr_seen == self.period {
                self.seed_sum += tr;
                self.value = self.seed_sum / self.period as f64;
            } else {
                self.value = (self.value * (self.period as f64 - 1.0) + tr) / self.period as f64;
            }
        }

        self.prev_close = Some(close);
    }

    fn value(&self) -> Option<f64> {
        self.is_warm().then_some(self.value)
    }

    fn is_warm(&self) -> bool {
        self.tr_seen >= self.period
    }

    fn warmup_bars(&self) -> usize {
        self.period + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn atr_seed_is_mean_of_true_ranges() {
        // make_bars: open = prev close, high = max(o,c)+1, low = min(o,c)-1.
        // Closes 10, 12, 14: bar1 has h=13, l=9, pc=10 → TR=4; bar2 h=15, l=11,
        // pc=12 → TR=4. Seed ATR(2) = (4+4)/2 = 4.
        let bars = make_bars(&[10.0, 12.0, 14.0]);
        let mut atr = Atr::new(2);
        atr.push(&bars[0]);
        assert!(atr.value().is_none());
        atr.push(&bars[1]);
        assert!(atr.value().is_none());
        atr.push(&bars[2]);
        assert_approx(atr.value().unwrap(), 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_wilder_recursion() {
        // Continue from the seed above with close 14 → 14: bar3 has open 14,
        // h=15, l=13, pc=14 → TR=2. ATR = (4*1 + 2)/2 = 3.
        let bars = make_bars(&[10.0, 12.0, 14.0, 14.0]);
        let mut atr = Atr::new(2);
        for bar in &bars {
            atr.push(bar);
        }
        assert_approx(atr.value().unwrap(), 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_true_range_uses_prev_close_on_gap() {
        use rust_decimal_macros::dec;
        use crate::domain::Bar;

        // Gap up: prev close 10, next bar entirely above it.
        let bars = vec![
            Bar::new(0, dec!(10), dec!(11), dec!(9), dec!(10), dec!(1)),
            Bar::new(60_000, dec!(20), dec!(21), dec!(19), dec!(20), dec!(1)),
        ];
        let mut atr = Atr::new(1);
        atr.push(&bars[0]);
        atr.push(&bars[1]);
        // TR = max(21-19, |21-10|, |19-10|) = 11
        assert_approx(atr.value().unwrap(), 11.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_warmup_is_period_plus_one() {
        assert_eq!(Atr::new(14).warmup_bars(), 15);
    }
}
