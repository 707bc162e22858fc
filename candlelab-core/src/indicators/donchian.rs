//! Donchian midline: (highest high + lowest low) / 2 over the last `period`
//! bars.
//!
//! Rolling extrema are tracked with monotonic deques, so each push is O(1)
//! amortized instead of rescanning the window.

use std::collections::VecDeque;

use crate::domain::Bar;
use crate::indicators::Kernel;

/// Rolling max/min over a fixed-size window via monotonic deques.
#[derive(Debug, Clone)]
pub(crate) struct RollingExtrema {
    period: usize,
    index: usize,
    // Front holds the current extremum; entries are (bar index, value).
    max_deque: VecDeque<(usize, f64)>,
    min_deque: VecDeque<(usize, f64)>,
}

impl RollingExtrema {
    pub(crate) fn new(period: usize) -> Self {
        assert!(period >= 1, "window must be >= 1");
        Self {
            period,
            index: 0,
            max_deque: VecDeque::new(),
            min_deque: VecDeque::new(),
        }
    }

    pub(crate) fn push(&mut self, high: f64, low: f64) {
        while self.max_deque.back().is_some_and(|&(_, v)| v <= high) {
            self.max_deque.pop_back();
        }
        self.max_deque.push_back((self.index, high));

        while self.min_deque.back().is_some_and(|&(_, v)| v >= low) {
            self.min_deque.pop_back();
        }
        self.min_deque.push_back((self.index, low));

        // Expire entries that fell out of the window.
        let cutoff = self.index + 1;
        while self.max_deque.front().is_some_and(|&(i, _)| i + self.period < cutoff) {
            self.max_deque.pop_front();
        }
        while self.min_deque.front().is_some_and(|&(i, _)| i + self.period < cutoff) {
            self.min_deque.pop_front();
        }

        self.index += 1;
    }

    pub(crate) fn seen(&self) -> usize {
        self.index
    }

    pub(crate) fn max(&self) -> Option<f64> {
        self.max_deque.front().map(|&(_, v)| v)
    }

    pub(crate) fn min(&self) -> Option<f64> {
        self.min_deque.front().map(|&(_, v)| v)
    }
}

#[derive(Debug, Clone)]
pub struct DonchianMid {
    period: usize,
    extrema: RollingExtrema,
}

impl DonchianMid {
    pub fn new(period: usize) -> Self {
        Self { period, extrema: RollingExtrema::new(period) }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Kernel for DonchianMid {
    fn push(&mut self, bar: &Bar) {
        self.extrema.push(bar.high_f64(), bar.low_f64());
    }

    fn value(&self) -> Option<f64> {
        if !self.is_warm() {
            return None;
        }
        match (self.extrema.max(), self.extrema.min()) {
            (Some(hh), Some(ll)) => Some((hh + ll) / 2.0),
            _ => None,
        }
    }

    fn is_warm(&self) -> bool {
        self.extrema.seen() >= self.period
    }

    fn warmup_bars(&self) -> usize {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn midline_tracks_window_extrema() {
        // make_bars: highs = max(open, close) + 1, lows = min(open, close) - 1.
        // Closes 10, 20, 15 → highs 11, 21, 21; lows 9, 9, 14.
        let bars = make_bars(&[10.0, 20.0, 15.0]);
        let mut mid = DonchianMid::new(3);
        for bar in &bars {
            mid.push(bar);
        }
        // HH = 21, LL = 9 → midline 15.
        assert_approx(mid.value().unwrap(), 15.0, DEFAULT_EPSILON);
    }

    #[test]
    fn old_extrema_expire_from_window() {
        let bars = make_bars(&[100.0, 10.0, 11.0, 12.0]);
        let mut mid = DonchianMid::new(2);
        for bar in &bars {
            mid.push(bar);
        }
        // Window is the last 2 bars: highs 12, 13 and lows 9, 10.
        // HH = 13, LL = 9 → 11. The early 100-level spike must be gone.
        assert_approx(mid.value().unwrap(), 11.0, DEFAULT_EPSILON);
    }

    #[test]
    fn not_warm_before_period_bars() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let mut mid = DonchianMid::new(3);
        mid.push(&bars[0]);
        assert!(mid.value().is_none());
        mid.push(&bars[1]);
        assert!(mid.value().is_none());
        mid.push(&bars[2]);
        assert!(mid.value().is_some());
    }

    #[test]
    fn rolling_extrema_constant_series() {
        let mut ext = RollingExtrema::new(3);
        for _ in 0..10 {
            ext.push(5.0, 5.0);
        }
        assert_eq!(ext.max(), Some(5.0));
        assert_eq!(ext.min(), Some(5.0));
    }
}
