//! Kijun-sen (Ichimoku baseline): (highest high + lowest low) / 2 over the
//! last `period` bars. The same midline computation as the Donchian basis,
//! kept as its own kernel because strategies select it by name.

use crate::domain::Bar;
use crate::indicators::donchian::DonchianMid;
use crate::indicators::Kernel;

#[derive(Debug, Clone)]
pub struct Kijun {
    inner: DonchianMid,
}

impl Kijun {
    pub fn new(period: usize) -> Self {
        Self { inner: DonchianMid::new(period) }
    }

    pub fn period(&self) -> usize {
        self.inner.period()
    }
}

impl Kernel for Kijun {
    fn push(&mut self, bar: &Bar) {
        self.inner.push(bar);
    }

    fn value(&self) -> Option<f64> {
        self.inner.value()
    }

    fn is_warm(&self) -> bool {
        self.inner.is_warm()
    }

    fn warmup_bars(&self) -> usize {
        self.inner.warmup_bars()
    }
}
