//! Position lifecycle: scheduled entries, the single active-position slot,
//! entry construction through the exchange rules, and TP/SL streak counters.

pub mod sizing;

pub use sizing::{LevelSpec, SizingMode};

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{ActivePosition, Bar, ExitReason, HitKind, ScheduledEntry, Side, Trade};
use crate::engine::config::StrategyConfig;

/// Result of an entry attempt.
#[derive(Debug)]
pub enum EntryOutcome {
    Opened,
    /// Min-notional check failed after quantization. The simulation records
    /// an event and proceeds flat.
    Rejected(RejectedOrder),
}

#[derive(Debug, Clone)]
pub struct RejectedOrder {
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub notional: Decimal,
}

/// TP/SL streak counters. A take-profit extends the TP streak and resets the
/// SL streak, and vice versa; timeout and end-of-data exits reset both.
#[derive(Debug, Clone, Copy, Default)]
pub struct Streaks {
    pub tp_streak: u32,
    pub sl_streak: u32,
    pub max_tp_streak: u32,
    pub max_sl_streak: u32,
}

impl Streaks {
    fn record(&mut self, reason: ExitReason) {
        match reason.hit_kind() {
            Some(HitKind::Tp) => {
                self.tp_streak += 1;
                self.sl_streak = 0;
                self.max_tp_streak = self.max_tp_streak.max(self.tp_streak);
            }
            Some(HitKind::Sl) => {
                self.sl_streak += 1;
                self.tp_streak = 0;
                self.max_sl_streak = self.max_sl_streak.max(self.sl_streak);
            }
            None => {
                self.tp_streak = 0;
                self.sl_streak = 0;
            }
        }
    }
}

/// Owns the active-position and scheduled-entry slots for one simulation.
/// Invariant: at most one of each at any time.
#[derive(Debug, Default)]
pub struct PositionManager {
    active: Option<ActivePosition>,
    scheduled: Option<ScheduledEntry>,
    streaks: Streaks,
}

impl PositionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.active.is_none()
    }

    pub fn active(&self) -> Option<&ActivePosition> {
        self.active.as_ref()
    }

    pub fn scheduled(&self) -> Option<&ScheduledEntry> {
        self.scheduled.as_ref()
    }

    pub fn streaks(&self) -> Streaks {
        self.streaks
    }

    /// Park a next-bar-open intent. Replaces any stale intent.
    pub fn schedule(&mut self, entry: ScheduledEntry) {
        self.scheduled = Some(entry);
    }

    /// Remove and return the scheduled entry.
    pub fn take_scheduled(&mut self) -> Option<ScheduledEntry> {
        self.scheduled.take()
    }

    /// Attempt to open a position at `base_price` (signal close or next-bar
    /// open). Applies slippage, derives TP/SL, sizes, quantizes through the
    /// exchange rules and checks min-notional.
    ///
    /// `atr` is the ATR chosen for level distances (signal or entry bar per
    /// configuration); entries with ATR-based specs fail closed when it is
    /// unavailable.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &mut self,
        config: &StrategyConfig,
        side: Side,
        base_price: Decimal,
        atr: Option<f64>,
        bar_index: usize,
        timestamp_ms: i64,
    ) -> EntryOutcome {
        debug_assert!(self.active.is_none(), "single-position invariant");

        let rules = &config.exchange_rules;
        let exec_price = config.slippage_mode.apply(base_price, side);
        let atr_dec = atr.and_then(Decimal::from_f64);

        let (Some(sl_distance), Some(tp_distance)) = (
            config.sl_spec.distance(exec_price, atr_dec),
            config.tp_spec.distance(exec_price, atr_dec),
        ) else {
            // ATR-based spec with no warm ATR: treat as a rejected order.
            return EntryOutcome::Rejected(RejectedOrder {
                side,
                price: exec_price,
                quantity: Decimal::ZERO,
                notional: Decimal::ZERO,
            });
        };

        let (take_profit, stop_loss) = match side {
            Side::Long => (exec_price + tp_distance, exec_price - sl_distance),
            Side::Short => (exec_price - tp_distance, exec_price + sl_distance),
        };

        let quantity = config
            .sizing_mode
            .quantity(config.risk_amount, exec_price, stop_loss);

        let entry_price = rules.quantize_price(exec_price);
        let quantity = rules.quantize_qty(quantity);
        let notional = entry_price * quantity;

        if quantity <= Decimal::ZERO || !rules.meets_min_notional(entry_price, quantity) {
            return EntryOutcome::Rejected(RejectedOrder {
                side,
                price: entry_price,
                quantity,
                notional,
            });
        }

        let entry_fee = rules.fee(notional, false);
        let expiry_bar_index = (config.max_holding_bars > 0)
            .then(|| bar_index + config.max_holding_bars);

        let position = ActivePosition {
            side,
            entry_bar_index: bar_index,
            entry_ts: timestamp_ms,
            entry_price,
            quantity,
            take_profit: rules.quantize_price(take_profit),
            stop_loss: rules.quantize_price(stop_loss),
            entry_fee,
            notional,
            expiry_bar_index,
            atr_at_entry: atr,
        };

        debug!(
            side = side.as_str(),
            price = %position.entry_price,
            qty = %position.quantity,
            tp = %position.take_profit,
            sl = %position.stop_loss,
            "position opened"
        );

        self.active = Some(position);
        EntryOutcome::Opened
    }

    /// Close the active position at `exit_price`, producing the trade record
    /// and updating the streak counters.
    ///
    /// Panics only if no position is active; the driver guards the call.
    pub fn close(
        &mut self,
        config: &StrategyConfig,
        bar: &Bar,
        bar_index: usize,
        exit_price: Decimal,
        reason: ExitReason,
    ) -> Trade {
        let position = self
            .active
            .take()
            .unwrap_or_else(|| unreachable!("close called with no active position"));

        let rules = &config.exchange_rules;
        let exit_fee = rules.fee(position.quantity * exit_price, false);
        let fees = position.entry_fee + exit_fee;

        let gross = match position.side {
            Side::Long => (exit_price - position.entry_price) * position.quantity,
            Side::Short => (position.entry_price - exit_price) * position.quantity,
        };
        let pnl = gross - fees;
        let pnl_fraction = if position.notional.is_zero() {
            Decimal::ZERO
        } else {
            pnl / position.notional
        };

        let bars_held = bar_index - position.entry_bar_index + 1;
        self.streaks.record(reason);

        Trade {
            side: position.side,
            entry_ts: position.entry_ts,
            exit_ts: bar.timestamp_ms,
            entry_price: position.entry_price,
            exit_price,
            quantity: position.quantity,
            notional: position.notional,
            fees,
            pnl,
            pnl_fraction,
            reason,
            bars_held,
            take_profit: position.take_profit,
            stop_loss: position.stop_loss,
            atr_at_entry: position.atr_at_entry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::test_support::config_with;
    use crate::exchange::SlippageMode;
    use rust_decimal_macros::dec;

    fn bar_at(ts: i64, close: Decimal) -> Bar {
        Bar::new(ts, close, close + dec!(1), close - dec!(1), close, dec!(10))
    }

    #[test]
    fn open_applies_slippage_levels_and_quantization() {
        let mut config = config_with(|c| {
            c.slippage_mode = SlippageMode::TradeSweep;
            c.tp_spec = LevelSpec::Pct(dec!(0.05));
            c.sl_spec = LevelSpec::Pct(dec!(0.02));
            c.risk_amount = dec!(1000);
        });
        config.exchange_rules.tick_size = dec!(0.01);
        config.exchange_rules.lot_size = dec!(0.001);

        let mut pm = PositionManager::new();
        let outcome = pm.open(&config, Side::Long, dec!(100), None, 5, 1_000);
        assert!(matches!(outcome, EntryOutcome::Opened));

        let pos = pm.active().unwrap();
        // exec = 100 * 1.0001 = 100.01
        assert_eq!(pos.entry_price, dec!(100.01));
        // tp = exec * 1.05, sl = exec * 0.98, both tick-quantized
        assert_eq!(pos.take_profit, dec!(105.01));
        assert_eq!(pos.stop_loss, dec!(98.01));
        // qty = 1000 / 100.01 = 9.99900... → 9.999 at 0.001 lots
        assert_eq!(pos.quantity, dec!(9.999));
        assert_eq!(pos.entry_bar_index, 5);
    }

    #[test]
    fn min_notional_rejection_leaves_manager_flat() {
        let mut config = config_with(|c| {
            c.risk_amount = dec!(5);
        });
        config.exchange_rules.min_notional = dec!(100);
        config.exchange_rules.tick_size = dec!(0.01);
        config.exchange_rules.lot_size = dec!(0.1);

        let mut pm = PositionManager::new();
        let outcome = pm.open(&config, Side::Long, dec!(1), None, 0, 0);
        let EntryOutcome::Rejected(rejected) = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(rejected.quantity, dec!(5.0));
        assert_eq!(rejected.notional, dec!(5.00));
        assert!(pm.is_flat());
    }

    #[test]
    fn atr_spec_without_atr_rejects() {
        let config = config_with(|c| {
            c.tp_spec = LevelSpec::AtrMultiple(dec!(4.5));
            c.sl_spec = LevelSpec::AtrMultiple(dec!(2.5));
        });
        let mut pm = PositionManager::new();
        let outcome = pm.open(&config, Side::Long, dec!(100), None, 0, 0);
        assert!(matches!(outcome, EntryOutcome::Rejected(_)));
        assert!(pm.is_flat());
    }

    #[test]
    fn close_computes_fees_and_pnl_long() {
        let mut config = config_with(|c| {
            c.slippage_mode = SlippageMode::None;
            c.tp_spec = LevelSpec::Pct(dec!(0.10));
            c.sl_spec = LevelSpec::Pct(dec!(0.05));
            c.risk_amount = dec!(1000);
        });
        config.exchange_rules.taker_fee = dec!(0.001);
        config.exchange_rules.tick_size = dec!(0.01);
        config.exchange_rules.lot_size = dec!(0.001);

        let mut pm = PositionManager::new();
        pm.open(&config, Side::Long, dec!(100), None, 0, 0);

        let bar = bar_at(60_000, dec!(110));
        let trade = pm.close(&config, &bar, 1, dec!(110), ExitReason::TakeProfit);

        assert_eq!(trade.quantity, dec!(10));
        // entry fee = 1000 * 0.001 = 1; exit fee = 1100 * 0.001 = 1.1
        assert_eq!(trade.fees, dec!(2.1));
        // gross = 10 * 10 = 100; pnl = 100 - 2.1
        assert_eq!(trade.pnl, dec!(97.9));
        assert_eq!(trade.bars_held, 2);
        assert!(pm.is_flat());
    }

    #[test]
    fn short_pnl_mirrors() {
        let mut config = config_with(|c| {
            c.slippage_mode = SlippageMode::None;
            c.tp_spec = LevelSpec::Pct(dec!(0.10));
            c.sl_spec = LevelSpec::Pct(dec!(0.05));
            c.risk_amount = dec!(1000);
        });
        config.exchange_rules.taker_fee = Decimal::ZERO;
        config.exchange_rules.tick_size = dec!(0.01);
        config.exchange_rules.lot_size = dec!(0.001);

        let mut pm = PositionManager::new();
        pm.open(&config, Side::Short, dec!(100), None, 0, 0);
        let bar = bar_at(60_000, dec!(90));
        let trade = pm.close(&config, &bar, 1, dec!(90), ExitReason::TakeProfit);
        assert_eq!(trade.pnl, dec!(100));
    }

    #[test]
    fn streaks_track_consecutive_hits_and_reset_on_other() {
        let config = config_with(|c| {
            c.slippage_mode = SlippageMode::None;
        });
        let mut pm = PositionManager::new();
        let bar = bar_at(0, dec!(100));

        for reason in [
            ExitReason::TakeProfit,
            ExitReason::TargetGapOpen,
            ExitReason::StopLoss,
            ExitReason::TakeProfit,
            ExitReason::Timeout,
        ] {
            pm.open(&config, Side::Long, dec!(100), None, 0, 0);
            pm.close(&config, &bar, 0, dec!(100), reason);
        }

        let streaks = pm.streaks();
        assert_eq!(streaks.max_tp_streak, 2); // TP then gap-open TP
        assert_eq!(streaks.max_sl_streak, 1);
        assert_eq!(streaks.tp_streak, 0); // timeout reset both
        assert_eq!(streaks.sl_streak, 0);
    }
}
