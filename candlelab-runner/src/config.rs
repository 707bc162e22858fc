//! TOML config parsing — loads run configurations from TOML files and
//! converts them into the core `StrategyConfig`.

use std::path::Path;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use candlelab_core::engine::{
    AtrTiming, EntryMode, EquityUpdate, IndicatorPeriods, StrategyConfig,
};
use candlelab_core::exchange::{ExchangeRules, SlippageMode};
use candlelab_core::execution::FirstTouchPolicy;
use candlelab_core::position::{LevelSpec, SizingMode};
use candlelab_core::signal::{
    DonchianBreakoutParams, EmaCrossParams, KijunCrossParams, StrategyKind,
};

/// Top-level backtest configuration from a TOML file.
#[derive(Debug, Deserialize)]
pub struct RunConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategySection,
    #[serde(default)]
    pub execution: ExecutionSection,
    #[serde(default)]
    pub exchange: ExchangeSection,
    #[serde(default)]
    pub indicators: IndicatorSection,
}

#[derive(Debug, Deserialize)]
pub struct BacktestSection {
    pub symbol: String,
    #[serde(default = "default_initial_equity")]
    pub initial_equity: f64,
    #[serde(default)]
    pub warmup_bars: usize,
    #[serde(default = "default_equity_update")]
    pub equity_update: String,
}

#[derive(Debug, Deserialize)]
pub struct StrategySection {
    #[serde(rename = "type")]
    pub strategy_type: String,
    pub body_min_long: Option<f64>,
    pub body_max_long: Option<f64>,
    pub body_min_short: Option<f64>,
    pub body_max_short: Option<f64>,
    pub rsi_min: Option<f64>,
    pub rsi_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExecutionSection {
    pub entry_mode: String,
    pub first_touch: String,
    pub sizing: String,
    pub risk_amount: f64,
    /// TP distance: a price fraction or an ATR multiple, at most one of
    /// each pair; unset falls back to the stock ATR bracket.
    pub tp_pct: Option<f64>,
    pub tp_atr: Option<f64>,
    pub sl_pct: Option<f64>,
    pub sl_atr: Option<f64>,
    pub max_holding_bars: usize,
    pub slippage: String,
    pub same_bar_exits_on_entry: bool,
    pub atr_timing: String,
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            entry_mode: "next_bar_open".to_string(),
            first_touch: "chart_order".to_string(),
            sizing: "notional".to_string(),
            risk_amount: 1000.0,
            tp_pct: None,
            tp_atr: None,
            sl_pct: None,
            sl_atr: None,
            max_holding_bars: 72,
            slippage: "trade_sweep".to_string(),
            same_bar_exits_on_entry: false,
            atr_timing: "signal".to_string(),
        }
    }
}

/// Exchange rules. Defaults approximate BTCUSDT spot filters.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExchangeSection {
    pub tick_size: f64,
    pub lot_size: f64,
    pub min_notional: f64,
    pub maker_fee: f64,
    pub taker_fee: f64,
}

impl Default for ExchangeSection {
    fn default() -> Self {
        Self {
            tick_size: 0.01,
            lot_size: 0.00001,
            min_notional: 10.0,
            maker_fee: 0.0001,
            taker_fee: 0.001,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IndicatorSection {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub atr: usize,
    pub rsi: usize,
    pub donchian: usize,
    pub kijun: usize,
}

impl Default for IndicatorSection {
    fn default() -> Self {
        let defaults = IndicatorPeriods::default();
        Self {
            ema_fast: defaults.ema_fast,
            ema_slow: defaults.ema_slow,
            atr: defaults.atr,
            rsi: defaults.rsi,
            donchian: defaults.donchian,
            kijun: defaults.kijun,
        }
    }
}

fn default_initial_equity() -> f64 {
    10_000.0
}

fn default_equity_update() -> String {
    "accumulating".to_string()
}

/// Config loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("unknown {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },

    #[error("{field} must not specify both a pct and an atr multiple")]
    AmbiguousLevelSpec { field: &'static str },

    #[error("{field} is not representable as a decimal: {value}")]
    BadDecimal { field: &'static str, value: f64 },
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn symbol(&self) -> &str {
        &self.backtest.symbol
    }

    /// Convert into the core engine configuration.
    pub fn to_strategy_config(&self) -> Result<StrategyConfig, ConfigError> {
        let strategy = self.strategy_kind()?;

        let entry_mode = match self.execution.entry_mode.as_str() {
            "signal_close" => EntryMode::SignalClose,
            "next_bar_open" => EntryMode::NextBarOpen,
            other => {
                return Err(ConfigError::UnknownVariant {
                    field: "entry_mode",
                    value: other.to_string(),
                })
            }
        };

        let first_touch = match self.execution.first_touch.as_str() {
            "sl_first" => FirstTouchPolicy::SlFirst,
            "tp_first" => FirstTouchPolicy::TpFirst,
            "chart_order" => FirstTouchPolicy::ChartOrder,
            other => {
                return Err(ConfigError::UnknownVariant {
                    field: "first_touch",
                    value: other.to_string(),
                })
            }
        };

        let sizing_mode = match self.execution.sizing.as_str() {
            "notional" => SizingMode::Notional,
            "risk" => SizingMode::Risk,
            other => {
                return Err(ConfigError::UnknownVariant {
                    field: "sizing",
                    value: other.to_string(),
                })
            }
        };

        let slippage_mode = match self.execution.slippage.as_str() {
            "none" => SlippageMode::None,
            "trade_sweep" => SlippageMode::TradeSweep,
            "synthetic_book" => SlippageMode::SyntheticBook,
            other => {
                return Err(ConfigError::UnknownVariant {
                    field: "slippage",
                    value: other.to_string(),
                })
            }
        };

        let atr_timing = match self.execution.atr_timing.as_str() {
            "signal" => AtrTiming::Signal,
            "entry" => AtrTiming::Entry,
            other => {
                return Err(ConfigError::UnknownVariant {
                    field: "atr_timing",
                    value: other.to_string(),
                })
            }
        };

        let equity_update = match self.backtest.equity_update.as_str() {
            "compounding" => EquityUpdate::Compounding,
            "accumulating" => EquityUpdate::Accumulating,
            other => {
                return Err(ConfigError::UnknownVariant {
                    field: "equity_update",
                    value: other.to_string(),
                })
            }
        };

        // Defaults reproduce the stock ATR bracket: TP at 4.5 ATR, SL at
        // 2.5 ATR.
        let tp_spec = level_spec("tp", self.execution.tp_pct, self.execution.tp_atr, 4.5)?;
        let sl_spec = level_spec("sl", self.execution.sl_pct, self.execution.sl_atr, 2.5)?;

        Ok(StrategyConfig {
            strategy,
            entry_mode,
            first_touch,
            sizing_mode,
            risk_amount: decimal("risk_amount", self.execution.risk_amount)?,
            tp_spec,
            sl_spec,
            max_holding_bars: self.execution.max_holding_bars,
            warmup_bars: self.backtest.warmup_bars,
            slippage_mode,
            exchange_rules: ExchangeRules {
                tick_size: decimal("tick_size", self.exchange.tick_size)?,
                lot_size: decimal("lot_size", self.exchange.lot_size)?,
                min_notional: decimal("min_notional", self.exchange.min_notional)?,
                maker_fee: decimal("maker_fee", self.exchange.maker_fee)?,
                taker_fee: decimal("taker_fee", self.exchange.taker_fee)?,
            },
            indicator_periods: IndicatorPeriods {
                ema_fast: self.indicators.ema_fast,
                ema_slow: self.indicators.ema_slow,
                atr: self.indicators.atr,
                rsi: self.indicators.rsi,
                donchian: self.indicators.donchian,
                kijun: self.indicators.kijun,
            },
            equity_update,
            same_bar_exits_on_entry: self.execution.same_bar_exits_on_entry,
            atr_timing,
            initial_equity: decimal("initial_equity", self.backtest.initial_equity)?,
        })
    }

    fn strategy_kind(&self) -> Result<StrategyKind, ConfigError> {
        match self.strategy.strategy_type.as_str() {
            "ema_cross" => {
                let defaults = EmaCrossParams::default();
                Ok(StrategyKind::EmaCross(EmaCrossParams {
                    body_min_long: opt_decimal(
                        "body_min_long",
                        self.strategy.body_min_long,
                        defaults.body_min_long,
                    )?,
                    body_max_long: opt_decimal(
                        "body_max_long",
                        self.strategy.body_max_long,
                        defaults.body_max_long,
                    )?,
                    body_min_short: opt_decimal(
                        "body_min_short",
                        self.strategy.body_min_short,
                        defaults.body_min_short,
                    )?,
                    body_max_short: opt_decimal(
                        "body_max_short",
                        self.strategy.body_max_short,
                        defaults.body_max_short,
                    )?,
                    rsi_min: self.strategy.rsi_min,
                    rsi_max: self.strategy.rsi_max,
                }))
            }
            "donchian_breakout" => Ok(StrategyKind::DonchianBreakout(
                DonchianBreakoutParams::default(),
            )),
            "kijun_cross" => Ok(StrategyKind::KijunCross(KijunCrossParams::default())),
            other => Err(ConfigError::UnknownVariant {
                field: "strategy type",
                value: other.to_string(),
            }),
        }
    }
}

fn decimal(field: &'static str, value: f64) -> Result<Decimal, ConfigError> {
    Decimal::from_f64(value).ok_or(ConfigError::BadDecimal { field, value })
}

fn opt_decimal(
    field: &'static str,
    value: Option<f64>,
    default: Decimal,
) -> Result<Decimal, ConfigError> {
    match value {
        Some(v) => decimal(field, v),
        None => Ok(default),
    }
}

fn level_spec(
    field: &'static str,
    pct: Option<f64>,
    atr: Option<f64>,
    default_atr: f64,
) -> Result<LevelSpec, ConfigError> {
    match (pct, atr) {
        (Some(p), None) => Ok(LevelSpec::Pct(decimal(field, p)?)),
        (None, Some(m)) => Ok(LevelSpec::AtrMultiple(decimal(field, m)?)),
        (None, None) => Ok(LevelSpec::AtrMultiple(decimal(field, default_atr)?)),
        (Some(_), Some(_)) => Err(ConfigError::AmbiguousLevelSpec { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FULL_TOML: &str = r#"
[backtest]
symbol = "BTCUSDT"
initial_equity = 25000.0
warmup_bars = 300
equity_update = "compounding"

[strategy]
type = "ema_cross"
body_min_long = 0.002
body_max_long = 0.008
body_min_short = -0.008
body_max_short = -0.002
rsi_min = 30.0
rsi_max = 70.0

[execution]
entry_mode = "next_bar_open"
first_touch = "chart_order"
sizing = "risk"
risk_amount = 500.0
tp_atr = 4.5
sl_atr = 2.5
max_holding_bars = 72
slippage = "trade_sweep"

[exchange]
tick_size = 0.01
lot_size = 0.00001
min_notional = 10.0
maker_fee = 0.0001
taker_fee = 0.001

[indicators]
ema_fast = 26
ema_slow = 100
atr = 14
"#;

    const MINIMAL_TOML: &str = r#"
[backtest]
symbol = "ETHUSDT"

[strategy]
type = "kijun_cross"
"#;

    #[test]
    fn parse_full_toml() {
        let config = RunConfig::from_toml(FULL_TOML).unwrap();
        assert_eq!(config.symbol(), "BTCUSDT");

        let strategy_config = config.to_strategy_config().unwrap();
        assert_eq!(strategy_config.entry_mode, EntryMode::NextBarOpen);
        assert_eq!(strategy_config.first_touch, FirstTouchPolicy::ChartOrder);
        assert_eq!(strategy_config.sizing_mode, SizingMode::Risk);
        assert_eq!(strategy_config.risk_amount, dec!(500));
        assert_eq!(strategy_config.tp_spec, LevelSpec::AtrMultiple(dec!(4.5)));
        assert_eq!(strategy_config.sl_spec, LevelSpec::AtrMultiple(dec!(2.5)));
        assert_eq!(strategy_config.warmup_bars, 300);
        assert_eq!(strategy_config.equity_update, EquityUpdate::Compounding);
        assert_eq!(strategy_config.exchange_rules.tick_size, dec!(0.01));
        assert_eq!(strategy_config.indicator_periods.ema_slow, 100);

        let StrategyKind::EmaCross(ref params) = strategy_config.strategy else {
            panic!("expected ema_cross strategy");
        };
        assert_eq!(params.body_min_long, dec!(0.002));
        assert_eq!(params.rsi_min, Some(30.0));

        assert!(strategy_config.validate().is_ok());
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = RunConfig::from_toml(MINIMAL_TOML).unwrap();
        let strategy_config = config.to_strategy_config().unwrap();
        assert_eq!(strategy_config.entry_mode, EntryMode::NextBarOpen);
        assert_eq!(strategy_config.risk_amount, dec!(1000));
        assert_eq!(strategy_config.initial_equity, dec!(10000));
        assert_eq!(strategy_config.equity_update, EquityUpdate::Accumulating);
        assert!(matches!(strategy_config.strategy, StrategyKind::KijunCross(_)));
        assert_eq!(strategy_config.max_holding_bars, 72);
    }

    #[test]
    fn both_pct_and_atr_is_rejected() {
        let toml_str = FULL_TOML.replace("tp_atr = 4.5", "tp_atr = 4.5\ntp_pct = 0.05");
        let config = RunConfig::from_toml(&toml_str).unwrap();
        assert!(matches!(
            config.to_strategy_config(),
            Err(ConfigError::AmbiguousLevelSpec { field: "tp" })
        ));
    }

    #[test]
    fn unknown_entry_mode_is_rejected() {
        let toml_str = FULL_TOML.replace("next_bar_open", "teleport");
        let config = RunConfig::from_toml(&toml_str).unwrap();
        assert!(matches!(
            config.to_strategy_config(),
            Err(ConfigError::UnknownVariant { field: "entry_mode", .. })
        ));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let result = RunConfig::from_toml("this is not [valid toml !!!");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
