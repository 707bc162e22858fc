//! Simulator driver: the per-bar loop over a validated bar stream.
//!
//! Within a bar the operation sequence is fixed: advance kernels, warmup
//! gate, scheduled-entry activation, exit resolution (timeout, gap-open,
//! first-touch), signal evaluation, equity mark, diagnostic row. This
//! ordering is part of the deterministic contract. The loop is strictly
//! sequential and single-threaded; parallelism belongs across symbols, one
//! engine per symbol.

pub mod cancel;
pub mod config;
pub mod equity;
pub mod kernels;
pub mod manifest;

pub use cancel::CancelToken;
pub use config::{
    AtrTiming, ConfigError, EntryMode, EquityUpdate, IndicatorPeriods, StrategyConfig,
};
pub use equity::EquityState;
pub use kernels::KernelSet;
pub use manifest::RunManifest;

use thiserror::Error;
use tracing::{debug, info};

use crate::data::{BarSource, InputError};
use crate::domain::{Bar, ExitReason, ScheduledEntry, Side, Trade};
use crate::execution::{check_gap_open, resolve_first_touch};
use crate::position::{EntryOutcome, PositionManager};
use crate::report::{
    DiagnosticRow, EquityPoint, LedgerSink, PositionState, RunEvent, Summary,
};
use crate::signal::{SignalContext, SignalEvaluation};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result of a completed (or cancelled) run. Trades are also streamed into
/// the sink as they close.
#[derive(Debug)]
pub struct RunOutcome {
    pub manifest: RunManifest,
    pub summary: Summary,
    pub trades: Vec<Trade>,
    pub cancelled: bool,
}

/// One backtest over one symbol's bar stream.
pub struct Engine {
    symbol: String,
    config: StrategyConfig,
}

impl Engine {
    /// Validates the configuration; contradictory parameters fail here,
    /// before any data is touched.
    pub fn new(symbol: impl Into<String>, config: StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { symbol: symbol.into(), config })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Run the per-bar loop to completion (or cancellation), streaming
    /// records into `sink`.
    pub fn run(
        &self,
        source: &BarSource,
        sink: &mut dyn LedgerSink,
        cancel: &CancelToken,
    ) -> Result<RunOutcome, EngineError> {
        let config = &self.config;
        let mut kernels = KernelSet::for_config(config);
        let warmup = kernels.slowest_warmup().max(config.warmup_bars);
        if warmup >= source.len() {
            return Err(ConfigError::InsufficientData {
                required: warmup + 1,
                available: source.len(),
            }
            .into());
        }

        let mut manifest = RunManifest::new(&self.symbol, config, source, warmup);
        let mut pm = PositionManager::new();
        let mut equity = EquityState::new(config.initial_equity, config.equity_update);
        let mut trades: Vec<Trade> = Vec::new();
        let cadence_ms = source.cadence_ms();
        let bars = source.bars();
        let mut cancelled = false;

        info!(
            symbol = %self.symbol,
            strategy = config.strategy.name(),
            bars = bars.len(),
            warmup,
            "starting backtest"
        );

        for (i, bar) in bars.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                // Flush exactly like end-of-data, at the last fully
                // processed bar.
                if i > 0 {
                    let last = &bars[i - 1];
                    sink.event(RunEvent::Cancelled {
                        bar_index: i - 1,
                        timestamp_ms: last.timestamp_ms,
                    });
                    if !pm.is_flat() {
                        let trade = Self::close_position(
                            config, &mut pm, &mut equity, sink, last, i - 1, last.close,
                            ExitReason::EndOfData,
                        );
                        trades.push(trade);
                    }
                }
                break;
            }

            kernels.push(bar);

            if i < warmup {
                sink.diagnostic(DiagnosticRow::from_bar(
                    i,
                    bar,
                    kernels.snapshot(),
                    PositionState::Warmup,
                    crate::signal::ReasonCode::NoSignal,
                    Default::default(),
                ));
                let drawdown = equity.mark();
                sink.equity(EquityPoint {
                    timestamp_ms: bar.timestamp_ms,
                    equity: equity.current(),
                    drawdown,
                });
                continue;
            }

            let snapshot = kernels.snapshot();

            // Activate or drop a pending next-bar-open entry.
            if pm.is_flat() {
                if let Some(scheduled) = pm.take_scheduled() {
                    if scheduled.activate_at_ts == bar.timestamp_ms {
                        let atr = match config.atr_timing {
                            AtrTiming::Signal => scheduled.atr_at_signal,
                            AtrTiming::Entry => snapshot.atr,
                        };
                        Self::try_open(
                            config, &mut pm, sink, scheduled.side, bar, i, bar.open, atr,
                        );
                    } else {
                        debug!(
                            expected = scheduled.activate_at_ts,
                            actual = bar.timestamp_ms,
                            "scheduled entry dropped on cadence gap"
                        );
                        sink.event(RunEvent::ScheduledEntryDropped {
                            bar_index: i,
                            timestamp_ms: bar.timestamp_ms,
                            expected_ts: scheduled.activate_at_ts,
                            side: scheduled.side,
                        });
                    }
                }
            }

            // Exit resolution: timeout, then gap-open, then first-touch.
            if let Some(position) = pm.active().cloned() {
                if position.is_expired(i) {
                    let trade = Self::close_position(
                        config, &mut pm, &mut equity, sink, bar, i, bar.close,
                        ExitReason::Timeout,
                    );
                    trades.push(trade);
                } else {
                    let suppress_same_bar = config.entry_mode == EntryMode::NextBarOpen
                        && !config.same_bar_exits_on_entry
                        && i == position.entry_bar_index;
                    if !suppress_same_bar {
                        let resolution = check_gap_open(bar, &position).or_else(|| {
                            resolve_first_touch(bar, &position, config.first_touch)
                        });
                        if let Some(resolution) = resolution {
                            let trade = Self::close_position(
                                config,
                                &mut pm,
                                &mut equity,
                                sink,
                                bar,
                                i,
                                resolution.exit_price,
                                resolution.reason,
                            );
                            trades.push(trade);
                        }
                    }
                }
            }

            // Signal evaluation is pure and runs on every trading bar so the
            // diagnostic row always carries the scanner; it is only acted on
            // when flat with nothing scheduled.
            let evaluation = if i > 0 {
                config.strategy.evaluate(&SignalContext {
                    bar,
                    prev: &bars[i - 1],
                    snapshot: &snapshot,
                })
            } else {
                SignalEvaluation::none()
            };

            if pm.is_flat() && pm.scheduled().is_none() {
                if let Some(side) = evaluation.signal.side() {
                    sink.event(RunEvent::Signal {
                        bar_index: i,
                        timestamp_ms: bar.timestamp_ms,
                        side,
                        reason: evaluation.signal.reason(),
                    });
                    match config.entry_mode {
                        EntryMode::SignalClose => {
                            Self::try_open(
                                config, &mut pm, sink, side, bar, i, bar.close, snapshot.atr,
                            );
                        }
                        EntryMode::NextBarOpen => {
                            pm.schedule(ScheduledEntry {
                                activate_at_ts: bar.timestamp_ms + cadence_ms,
                                side,
                                reason: evaluation.signal.reason(),
                                atr_at_signal: snapshot.atr,
                            });
                        }
                    }
                }
            }

            let state = if let Some(position) = pm.active() {
                match position.side {
                    Side::Long => PositionState::Long,
                    Side::Short => PositionState::Short,
                }
            } else if pm.scheduled().is_some() {
                PositionState::Scheduled
            } else {
                PositionState::Flat
            };

            sink.diagnostic(DiagnosticRow::from_bar(
                i,
                bar,
                snapshot,
                state,
                evaluation.signal.reason(),
                evaluation.scan,
            ));

            let drawdown = equity.mark();
            sink.equity(EquityPoint {
                timestamp_ms: bar.timestamp_ms,
                equity: equity.current(),
                drawdown,
            });
        }

        // End-of-stream flush.
        if !cancelled && !pm.is_flat() {
            let last_index = bars.len() - 1;
            let last = &bars[last_index];
            let trade = Self::close_position(
                config, &mut pm, &mut equity, sink, last, last_index, last.close,
                ExitReason::EndOfData,
            );
            trades.push(trade);
            equity.mark();
        }

        manifest.cancelled = cancelled;
        let summary = Summary::from_trades(&trades, equity.max_drawdown(), pm.streaks());
        sink.summary(&summary);

        info!(
            trades = summary.total_trades,
            net_pnl = %summary.net_pnl,
            cancelled,
            "backtest finished"
        );

        Ok(RunOutcome { manifest, summary, trades, cancelled })
    }

    /// Attempt an entry, emitting the entry or rejection event.
    #[allow(clippy::too_many_arguments)]
    fn try_open(
        config: &StrategyConfig,
        pm: &mut PositionManager,
        sink: &mut dyn LedgerSink,
        side: Side,
        bar: &Bar,
        bar_index: usize,
        base_price: rust_decimal::Decimal,
        atr: Option<f64>,
    ) {
        match pm.open(config, side, base_price, atr, bar_index, bar.timestamp_ms) {
            EntryOutcome::Opened => {
                if let Some(position) = pm.active() {
                    sink.event(RunEvent::Entry {
                        bar_index,
                        timestamp_ms: bar.timestamp_ms,
                        side,
                        price: position.entry_price,
                        quantity: position.quantity,
                        take_profit: position.take_profit,
                        stop_loss: position.stop_loss,
                        fee: position.entry_fee,
                    });
                }
            }
            EntryOutcome::Rejected(rejected) => {
                debug!(
                    side = rejected.side.as_str(),
                    notional = %rejected.notional,
                    "order rejected below min notional"
                );
                sink.event(RunEvent::OrderRejected {
                    bar_index,
                    timestamp_ms: bar.timestamp_ms,
                    side: rejected.side,
                    price: rejected.price,
                    quantity: rejected.quantity,
                    notional: rejected.notional,
                });
            }
        }
    }

    /// Close the active position, apply equity, and emit the exit event.
    #[allow(clippy::too_many_arguments)]
    fn close_position(
        config: &StrategyConfig,
        pm: &mut PositionManager,
        equity: &mut EquityState,
        sink: &mut dyn LedgerSink,
        bar: &Bar,
        bar_index: usize,
        exit_price: rust_decimal::Decimal,
        reason: ExitReason,
    ) -> Trade {
        let equity_before = equity.current();
        let trade = pm.close(config, bar, bar_index, exit_price, reason);
        equity.apply_trade(&trade);
        let streaks = pm.streaks();
        sink.event(RunEvent::Exit {
            bar_index,
            timestamp_ms: bar.timestamp_ms,
            side: trade.side,
            price: exit_price,
            reason,
            pnl: trade.pnl,
            tp_streak: streaks.tp_streak,
            sl_streak: streaks.sl_streak,
            equity_before,
            equity_after: equity.current(),
        });
        sink.trade(&trade);
        trade
    }
}
