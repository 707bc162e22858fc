//! Strategy configuration: the single structured input that selects the
//! predicate, execution behavior, sizing, exchange rules, and indicator
//! periods for a run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::exchange::{ExchangeRules, SlippageMode};
use crate::execution::FirstTouchPolicy;
use crate::position::{LevelSpec, SizingMode};
use crate::signal::StrategyKind;

/// When to enter after a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// Enter immediately at the signal bar's close.
    SignalClose,
    /// Schedule an entry at the next bar's open.
    NextBarOpen,
}

impl EntryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::SignalClose => "signal_close",
            EntryMode::NextBarOpen => "next_bar_open",
        }
    }
}

/// Which bar's ATR feeds ATR-based TP/SL distances for next-bar-open
/// entries: the signal bar's (default) or the entry bar's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtrTiming {
    Signal,
    Entry,
}

/// How realized PnL moves equity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquityUpdate {
    /// current <- current * (1 + pnl_fraction)
    Compounding,
    /// current <- initial + sum(realized pnl)
    Accumulating,
}

impl EquityUpdate {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquityUpdate::Compounding => "compounding",
            EquityUpdate::Accumulating => "accumulating",
        }
    }
}

/// Lookback periods per indicator kernel. Optional kernels are only
/// instantiated when the strategy reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorPeriods {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub atr: usize,
    pub rsi: usize,
    pub donchian: usize,
    pub kijun: usize,
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            ema_fast: 26,
            ema_slow: 100,
            atr: 14,
            rsi: 14,
            donchian: 20,
            kijun: 26,
        }
    }
}

/// Full configuration of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub strategy: StrategyKind,
    pub entry_mode: EntryMode,
    pub first_touch: FirstTouchPolicy,
    pub sizing_mode: SizingMode,
    /// Notional USD (notional sizing) or risk USD (risk sizing).
    pub risk_amount: Decimal,
    pub tp_spec: LevelSpec,
    pub sl_spec: LevelSpec,
    /// TTL in bars; 0 = unlimited.
    pub max_holding_bars: usize,
    /// Minimum bars before trading. The effective warmup is the maximum of
    /// this and the slowest instantiated kernel's requirement.
    pub warmup_bars: usize,
    pub slippage_mode: SlippageMode,
    pub exchange_rules: ExchangeRules,
    pub indicator_periods: IndicatorPeriods,
    pub equity_update: EquityUpdate,
    /// Allow exits on the entry bar for next-bar-open entries.
    pub same_bar_exits_on_entry: bool,
    pub atr_timing: AtrTiming,
    pub initial_equity: Decimal,
}

/// Contradictory strategy parameters. Fatal at setup, before any bar is
/// processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: Decimal },

    #[error("{name} period must be >= 1")]
    ZeroPeriod { name: &'static str },

    #[error("ema_fast period ({fast}) must be shorter than ema_slow ({slow})")]
    EmaPeriodsInverted { fast: usize, slow: usize },

    #[error("body band inverted: min {min} > max {max}")]
    BodyBandInverted { min: Decimal, max: Decimal },

    #[error("rsi band inverted: min {min} > max {max}")]
    RsiBandInverted { min: f64, max: f64 },

    #[error("warmup needs {required} bars but the stream has {available}")]
    InsufficientData { required: usize, available: usize },
}

impl StrategyConfig {
    /// Validate parameter consistency. Data-dependent checks (warmup vs
    /// stream length) run at engine start instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("risk_amount", self.risk_amount)?;
        require_positive("initial_equity", self.initial_equity)?;
        require_positive("tick_size", self.exchange_rules.tick_size)?;
        require_positive("lot_size", self.exchange_rules.lot_size)?;
        require_non_negative("min_notional", self.exchange_rules.min_notional)?;
        require_non_negative("maker_fee", self.exchange_rules.maker_fee)?;
        require_non_negative("taker_fee", self.exchange_rules.taker_fee)?;

        for (name, spec) in [("tp_spec", &self.tp_spec), ("sl_spec", &self.sl_spec)] {
            let value = match spec {
                LevelSpec::Pct(p) => *p,
                LevelSpec::AtrMultiple(m) => *m,
            };
            require_positive(name, value)?;
        }

        let p = &self.indicator_periods;
        for (name, period) in [
            ("ema_fast", p.ema_fast),
            ("ema_slow", p.ema_slow),
            ("atr", p.atr),
            ("rsi", p.rsi),
            ("donchian", p.donchian),
            ("kijun", p.kijun),
        ] {
            if period == 0 {
                return Err(ConfigError::ZeroPeriod { name });
            }
        }
        if p.ema_fast >= p.ema_slow {
            return Err(ConfigError::EmaPeriodsInverted { fast: p.ema_fast, slow: p.ema_slow });
        }

        if let StrategyKind::EmaCross(params) = &self.strategy {
            for (min, max) in [
                (params.body_min_long, params.body_max_long),
                (params.body_min_short, params.body_max_short),
            ] {
                if min > max {
                    return Err(ConfigError::BodyBandInverted { min, max });
                }
            }
            if let (Some(lo), Some(hi)) = (params.rsi_min, params.rsi_max) {
                if lo > hi {
                    return Err(ConfigError::RsiBandInverted { min: lo, max: hi });
                }
            }
        }

        Ok(())
    }
}

fn require_positive(name: &'static str, value: Decimal) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO {
        return Err(ConfigError::NonPositive { name, value });
    }
    Ok(())
}

fn require_non_negative(name: &'static str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::NonPositive { name, value });
    }
    Ok(())
}

pub mod test_support {
    //! Baseline configuration for tests. Kept unconditionally compiled so
    //! integration tests and downstream crates can share the same fixture.

    use super::*;
    use crate::signal::EmaCrossParams;
    use rust_decimal_macros::dec;

    /// A permissive baseline config: EMA-cross strategy, frictionless
    /// exchange, percent levels. Tests override what they exercise.
    pub fn base_config() -> StrategyConfig {
        StrategyConfig {
            strategy: StrategyKind::EmaCross(EmaCrossParams::default()),
            entry_mode: EntryMode::SignalClose,
            first_touch: FirstTouchPolicy::SlFirst,
            sizing_mode: SizingMode::Notional,
            risk_amount: dec!(1000),
            tp_spec: LevelSpec::Pct(dec!(0.05)),
            sl_spec: LevelSpec::Pct(dec!(0.02)),
            max_holding_bars: 0,
            warmup_bars: 0,
            slippage_mode: SlippageMode::None,
            exchange_rules: ExchangeRules {
                tick_size: dec!(0.00000001),
                lot_size: dec!(0.00000001),
                min_notional: Decimal::ZERO,
                maker_fee: Decimal::ZERO,
                taker_fee: Decimal::ZERO,
            },
            indicator_periods: IndicatorPeriods::default(),
            equity_update: EquityUpdate::Accumulating,
            same_bar_exits_on_entry: false,
            atr_timing: AtrTiming::Signal,
            initial_equity: dec!(10000),
        }
    }

    /// Baseline config with overrides applied.
    pub fn config_with(adjust: impl FnOnce(&mut StrategyConfig)) -> StrategyConfig {
        let mut config = base_config();
        adjust(&mut config);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::config_with;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn baseline_validates() {
        assert!(config_with(|_| {}).validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_sl() {
        let config = config_with(|c| c.sl_spec = LevelSpec::Pct(Decimal::ZERO));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { name: "sl_spec", .. })
        ));
    }

    #[test]
    fn rejects_inverted_ema_periods() {
        let config = config_with(|c| {
            c.indicator_periods.ema_fast = 100;
            c.indicator_periods.ema_slow = 26;
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmaPeriodsInverted { .. })
        ));
    }

    #[test]
    fn rejects_inverted_body_band() {
        let config = config_with(|c| {
            if let StrategyKind::EmaCross(params) = &mut c.strategy {
                params.body_min_long = dec!(0.01);
                params.body_max_long = dec!(0.001);
            }
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BodyBandInverted { .. })
        ));
    }

    #[test]
    fn rejects_zero_period() {
        let config = config_with(|c| c.indicator_periods.atr = 0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroPeriod { name: "atr" })
        ));
    }
}
