//! Run manifest: the configuration snapshot emitted alongside the ledger.
//!
//! Two runs with identical manifests and identical input bar streams must
//! produce byte-identical ledgers. The `config_hash` is a BLAKE3 digest of
//! the canonical JSON form of every configuration-derived field, so it is
//! stable across platforms and builds; run-scoped fields (`cancelled`,
//! `bar_count`) stay outside the digest.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::data::BarSource;
use crate::engine::config::{
    AtrTiming, EntryMode, EquityUpdate, IndicatorPeriods, StrategyConfig,
};
use crate::exchange::{ExchangeRules, SlippageMode};
use crate::execution::FirstTouchPolicy;
use crate::position::{LevelSpec, SizingMode};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub engine_version: String,
    pub symbol: String,
    pub strategy: String,
    pub strategy_params: BTreeMap<String, String>,
    pub entry_mode: EntryMode,
    pub first_touch: FirstTouchPolicy,
    pub sizing_mode: SizingMode,
    pub risk_amount: Decimal,
    pub tp_spec: LevelSpec,
    pub sl_spec: LevelSpec,
    pub max_holding_bars: usize,
    pub warmup_bars: usize,
    pub effective_warmup_bars: usize,
    pub slippage_mode: SlippageMode,
    pub exchange_rules: ExchangeRules,
    pub indicator_periods: IndicatorPeriods,
    pub equity_update: EquityUpdate,
    pub same_bar_exits_on_entry: bool,
    pub atr_timing: AtrTiming,
    pub initial_equity: Decimal,
    pub cadence_ms: i64,
    pub bar_count: usize,
    /// Set when the run was stopped by the caller's cancellation token; the
    /// ledger is then partial.
    pub cancelled: bool,
    pub config_hash: String,
}

impl RunManifest {
    pub fn new(
        symbol: &str,
        config: &StrategyConfig,
        source: &BarSource,
        effective_warmup_bars: usize,
    ) -> Self {
        let mut manifest = Self {
            engine_version: ENGINE_VERSION.to_string(),
            symbol: symbol.to_string(),
            strategy: config.strategy.name().to_string(),
            strategy_params: config.strategy.params_map(),
            entry_mode: config.entry_mode,
            first_touch: config.first_touch,
            sizing_mode: config.sizing_mode,
            risk_amount: config.risk_amount,
            tp_spec: config.tp_spec,
            sl_spec: config.sl_spec,
            max_holding_bars: config.max_holding_bars,
            warmup_bars: config.warmup_bars,
            effective_warmup_bars,
            slippage_mode: config.slippage_mode,
            exchange_rules: config.exchange_rules.clone(),
            indicator_periods: config.indicator_periods.clone(),
            equity_update: config.equity_update,
            same_bar_exits_on_entry: config.same_bar_exits_on_entry,
            atr_timing: config.atr_timing,
            initial_equity: config.initial_equity,
            cadence_ms: source.cadence_ms(),
            bar_count: source.len(),
            cancelled: false,
            config_hash: String::new(),
        };
        manifest.config_hash = manifest.compute_hash();
        manifest
    }

    /// BLAKE3 over the canonical JSON of all configuration-derived fields.
    /// BTreeMap parameter ordering keeps the serialization deterministic.
    fn compute_hash(&self) -> String {
        let canonical = json!({
            "engine_version": self.engine_version,
            "symbol": self.symbol,
            "strategy": self.strategy,
            "strategy_params": self.strategy_params,
            "entry_mode": self.entry_mode,
            "first_touch": self.first_touch,
            "sizing_mode": self.sizing_mode,
            "risk_amount": self.risk_amount,
            "tp_spec": self.tp_spec,
            "sl_spec": self.sl_spec,
            "max_holding_bars": self.max_holding_bars,
            "warmup_bars": self.warmup_bars,
            "effective_warmup_bars": self.effective_warmup_bars,
            "slippage_mode": self.slippage_mode,
            "exchange_rules": self.exchange_rules,
            "indicator_periods": self.indicator_periods,
            "equity_update": self.equity_update,
            "same_bar_exits_on_entry": self.same_bar_exits_on_entry,
            "atr_timing": self.atr_timing,
            "initial_equity": self.initial_equity,
            "cadence_ms": self.cadence_ms,
        });
        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }

    /// Verify the stored hash matches the present configuration fields.
    pub fn verify_hash(&self) -> bool {
        self.config_hash == self.compute_hash()
    }
}
