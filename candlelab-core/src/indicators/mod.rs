//! Incremental indicator kernels.
//!
//! Each kernel advances one bar at a time via `push`, exposes its current
//! output through `value` (defined only once warm), and never looks ahead.
//! Values are double precision; every accumulation runs in chronological
//! order so output is deterministic under nearest-even rounding.

pub mod atr;
pub mod donchian;
pub mod ema;
pub mod kijun;
pub mod rsi;

pub use atr::Atr;
pub use donchian::DonchianMid;
pub use ema::Ema;
pub use kijun::Kijun;
pub use rsi::Rsi;

use crate::domain::Bar;

/// Incremental indicator contract.
pub trait Kernel {
    /// Advance state by one bar.
    fn push(&mut self, bar: &Bar);

    /// Current output. `None` until the kernel is warm.
    fn value(&self) -> Option<f64>;

    fn is_warm(&self) -> bool;

    /// Number of bars this kernel must see before `value` is defined.
    fn warmup_bars(&self) -> usize;
}

/// Create synthetic bars from close prices for kernel tests.
///
/// open = prev close (or close for the first bar), high/low bracket the body
/// by 1.0, volume fixed.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal::Decimal;

    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar::new(
                i as i64 * 60_000,
                Decimal::from_f64(open).unwrap(),
                Decimal::from_f64(high).unwrap(),
                Decimal::from_f64(low).unwrap(),
                Decimal::from_f64(close).unwrap(),
                Decimal::from(1000),
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
