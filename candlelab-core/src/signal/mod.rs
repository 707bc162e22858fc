//! Signal evaluation: pure, look-ahead-free, reason-coded.
//!
//! The evaluator is a pure function of the current bar, the prior bar, and
//! the indicator snapshot. It never mutates state and never sees future
//! bars. Every outcome carries a reason code naming the filter that fired or
//! blocked, and the per-condition booleans it scanned are surfaced for the
//! diagnostic row.

pub mod donchian_breakout;
pub mod ema_cross;
pub mod kijun_cross;

pub use donchian_breakout::DonchianBreakoutParams;
pub use ema_cross::EmaCrossParams;
pub use kijun_cross::KijunCrossParams;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Side};

/// Indicator values visible to the evaluator at one bar. `None` means the
/// kernel is either not configured or not yet warm.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub atr: Option<f64>,
    pub rsi: Option<f64>,
    pub donchian_mid: Option<f64>,
    pub kijun: Option<f64>,
}

/// Evaluator input for one bar.
#[derive(Debug, Clone, Copy)]
pub struct SignalContext<'a> {
    pub bar: &'a Bar,
    pub prev: &'a Bar,
    pub snapshot: &'a IndicatorSnapshot,
}

/// Why a signal fired, or which filter blocked it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    EmaCrossUp,
    EmaCrossDown,
    BodyTooSmall,
    BodyTooLarge,
    RsiOutOfBand,
    DonchianBreakoutLong,
    DonchianBreakoutShort,
    KijunCrossUp,
    KijunCrossDown,
    NoSignal,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::EmaCrossUp => "ema_cross_up",
            ReasonCode::EmaCrossDown => "ema_cross_down",
            ReasonCode::BodyTooSmall => "body_too_small",
            ReasonCode::BodyTooLarge => "body_too_large",
            ReasonCode::RsiOutOfBand => "rsi_out_of_band",
            ReasonCode::DonchianBreakoutLong => "donchian_breakout_long",
            ReasonCode::DonchianBreakoutShort => "donchian_breakout_short",
            ReasonCode::KijunCrossUp => "kijun_cross_up",
            ReasonCode::KijunCrossDown => "kijun_cross_down",
            ReasonCode::NoSignal => "no_signal",
        }
    }
}

/// Evaluator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "signal", content = "reason")]
pub enum Signal {
    None(ReasonCode),
    Long(ReasonCode),
    Short(ReasonCode),
}

impl Signal {
    pub fn side(&self) -> Option<Side> {
        match self {
            Signal::None(_) => None,
            Signal::Long(_) => Some(Side::Long),
            Signal::Short(_) => Some(Side::Short),
        }
    }

    pub fn reason(&self) -> ReasonCode {
        match self {
            Signal::None(r) | Signal::Long(r) | Signal::Short(r) => *r,
        }
    }
}

/// Per-condition booleans the evaluator scanned, one set per side.
/// `trend` is the regime condition, `trigger` the bar-level condition, and
/// `filter` the body/band gate; their meaning per strategy is documented on
/// the strategy's params type.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConditionScan {
    pub long_trend: bool,
    pub long_trigger: bool,
    pub long_filter: bool,
    pub short_trend: bool,
    pub short_trigger: bool,
    pub short_filter: bool,
}

/// Evaluation result: the signal plus the scanned conditions.
#[derive(Debug, Clone, Copy)]
pub struct SignalEvaluation {
    pub signal: Signal,
    pub scan: ConditionScan,
}

impl SignalEvaluation {
    pub fn none() -> Self {
        Self {
            signal: Signal::None(ReasonCode::NoSignal),
            scan: ConditionScan::default(),
        }
    }
}

/// Strategy predicate, selected by configuration. Tagged variants with a
/// switch in a pure function rather than a trait hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum StrategyKind {
    EmaCross(EmaCrossParams),
    DonchianBreakout(DonchianBreakoutParams),
    KijunCross(KijunCrossParams),
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::EmaCross(_) => "ema_cross",
            StrategyKind::DonchianBreakout(_) => "donchian_breakout",
            StrategyKind::KijunCross(_) => "kijun_cross",
        }
    }

    /// Evaluate the predicate for one bar. Pure.
    pub fn evaluate(&self, ctx: &SignalContext<'_>) -> SignalEvaluation {
        match self {
            StrategyKind::EmaCross(params) => ema_cross::evaluate(params, ctx),
            StrategyKind::DonchianBreakout(params) => donchian_breakout::evaluate(params, ctx),
            StrategyKind::KijunCross(params) => kijun_cross::evaluate(params, ctx),
        }
    }

    /// Which optional kernels this strategy reads.
    pub fn uses_rsi(&self) -> bool {
        matches!(self, StrategyKind::EmaCross(p) if p.rsi_min.is_some() || p.rsi_max.is_some())
    }

    pub fn uses_donchian(&self) -> bool {
        matches!(self, StrategyKind::DonchianBreakout(_))
    }

    pub fn uses_kijun(&self) -> bool {
        matches!(self, StrategyKind::KijunCross(_))
    }

    /// Flat string map of parameters for the run manifest.
    pub fn params_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        match self {
            StrategyKind::EmaCross(p) => {
                map.insert("body_min_long".into(), p.body_min_long.to_string());
                map.insert("body_max_long".into(), p.body_max_long.to_string());
                map.insert("body_min_short".into(), p.body_min_short.to_string());
                map.insert("body_max_short".into(), p.body_max_short.to_string());
                if let Some(lo) = p.rsi_min {
                    map.insert("rsi_min".into(), lo.to_string());
                }
                if let Some(hi) = p.rsi_max {
                    map.insert("rsi_max".into(), hi.to_string());
                }
            }
            StrategyKind::DonchianBreakout(_) | StrategyKind::KijunCross(_) => {}
        }
        map
    }
}
