//! The indicator kernels a run advances, assembled from configuration.
//!
//! Kernel advancement order is fixed (every kernel advances by exactly one
//! per bar, in declaration order); optional kernels are only instantiated
//! when the strategy reads them, which also keeps them out of the effective
//! warmup computation.

use crate::domain::Bar;
use crate::engine::config::StrategyConfig;
use crate::indicators::{Atr, DonchianMid, Ema, Kernel, Kijun, Rsi};
use crate::signal::IndicatorSnapshot;

#[derive(Debug)]
pub struct KernelSet {
    ema_fast: Ema,
    ema_slow: Ema,
    atr: Atr,
    rsi: Option<Rsi>,
    donchian: Option<DonchianMid>,
    kijun: Option<Kijun>,
}

impl KernelSet {
    pub fn for_config(config: &StrategyConfig) -> Self {
        let periods = &config.indicator_periods;
        Self {
            ema_fast: Ema::new(periods.ema_fast),
            ema_slow: Ema::new(periods.ema_slow),
            atr: Atr::new(periods.atr),
            rsi: config.strategy.uses_rsi().then(|| Rsi::new(periods.rsi)),
            donchian: config
                .strategy
                .uses_donchian()
                .then(|| DonchianMid::new(periods.donchian)),
            kijun: config.strategy.uses_kijun().then(|| Kijun::new(periods.kijun)),
        }
    }

    /// Advance every kernel by one bar.
    pub fn push(&mut self, bar: &Bar) {
        self.ema_fast.push(bar);
        self.ema_slow.push(bar);
        self.atr.push(bar);
        if let Some(rsi) = &mut self.rsi {
            rsi.push(bar);
        }
        if let Some(donchian) = &mut self.donchian {
            donchian.push(bar);
        }
        if let Some(kijun) = &mut self.kijun {
            kijun.push(bar);
        }
    }

    pub fn snapshot(&self) -> IndicatorSnapshot {
        IndicatorSnapshot {
            ema_fast: self.ema_fast.value(),
            ema_slow: self.ema_slow.value(),
            atr: self.atr.value(),
            rsi: self.rsi.as_ref().and_then(|k| k.value()),
            donchian_mid: self.donchian.as_ref().and_then(|k| k.value()),
            kijun: self.kijun.as_ref().and_then(|k| k.value()),
        }
    }

    /// Bars required before every instantiated kernel is warm.
    pub fn slowest_warmup(&self) -> usize {
        let mut warmup = self
            .ema_fast
            .warmup_bars()
            .max(self.ema_slow.warmup_bars())
            .max(self.atr.warmup_bars());
        if let Some(rsi) = &self.rsi {
            warmup = warmup.max(rsi.warmup_bars());
        }
        if let Some(donchian) = &self.donchian {
            warmup = warmup.max(donchian.warmup_bars());
        }
        if let Some(kijun) = &self.kijun {
            warmup = warmup.max(kijun.warmup_bars());
        }
        warmup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::test_support::config_with;
    use crate::signal::{DonchianBreakoutParams, StrategyKind};

    #[test]
    fn ema_cross_config_skips_unused_kernels() {
        let config = config_with(|_| {});
        let kernels = KernelSet::for_config(&config);
        assert!(kernels.rsi.is_none());
        assert!(kernels.donchian.is_none());
        assert!(kernels.kijun.is_none());
    }

    #[test]
    fn donchian_config_instantiates_midline() {
        let config = config_with(|c| {
            c.strategy = StrategyKind::DonchianBreakout(DonchianBreakoutParams::default());
        });
        let kernels = KernelSet::for_config(&config);
        assert!(kernels.donchian.is_some());
        assert!(kernels.kijun.is_none());
    }

    #[test]
    fn slowest_warmup_covers_all_kernels() {
        // Defaults: ema_slow = 100, atr = 14 (+1). Slowest is the EMA.
        let config = config_with(|_| {});
        let kernels = KernelSet::for_config(&config);
        assert_eq!(kernels.slowest_warmup(), 100);
    }
}
