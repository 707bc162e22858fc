//! Summary statistics, computed once at end of run from the trade ledger
//! alone.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Trade;
use crate::position::Streaks;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_trades: usize,
    /// Trades with pnl > 0.
    pub wins: usize,
    /// Trades with pnl < 0.
    pub losses: usize,
    /// wins / total_trades, as a fraction.
    pub win_rate: Decimal,
    pub gross_profit: Decimal,
    /// Positive magnitude of losing PnL.
    pub gross_loss: Decimal,
    pub net_pnl: Decimal,
    pub avg_win: Decimal,
    /// Signed (non-positive) mean of losing trades.
    pub avg_loss: Decimal,
    /// win_rate * avg_win + (1 - win_rate) * avg_loss.
    pub expectancy: Decimal,
    /// gross_profit / gross_loss; `None` when there are no losses.
    pub profit_factor: Option<Decimal>,
    pub avg_holding_ms: Decimal,
    pub max_drawdown: Decimal,
    pub max_tp_streak: u32,
    pub max_sl_streak: u32,
}

impl Summary {
    pub fn from_trades(trades: &[Trade], max_drawdown: Decimal, streaks: Streaks) -> Self {
        if trades.is_empty() {
            return Self::empty(max_drawdown, streaks);
        }

        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut gross_profit = Decimal::ZERO;
        let mut gross_loss = Decimal::ZERO;
        let mut net_pnl = Decimal::ZERO;
        let mut holding_ms = Decimal::ZERO;

        for trade in trades {
            net_pnl += trade.pnl;
            if trade.pnl > Decimal::ZERO {
                wins += 1;
                gross_profit += trade.pnl;
            } else if trade.pnl < Decimal::ZERO {
                losses += 1;
                gross_loss += -trade.pnl;
            }
            holding_ms += Decimal::from(trade.exit_ts - trade.entry_ts);
        }

        let total = Decimal::from(trades.len() as u64);
        let win_rate = Decimal::from(wins as u64) / total;
        let avg_win = if wins > 0 {
            gross_profit / Decimal::from(wins as u64)
        } else {
            Decimal::ZERO
        };
        let avg_loss = if losses > 0 {
            -gross_loss / Decimal::from(losses as u64)
        } else {
            Decimal::ZERO
        };
        let expectancy = win_rate * avg_win + (Decimal::ONE - win_rate) * avg_loss;
        let profit_factor = (gross_loss > Decimal::ZERO).then(|| gross_profit / gross_loss);

        Self {
            total_trades: trades.len(),
            wins,
            losses,
            win_rate,
            gross_profit,
            gross_loss,
            net_pnl,
            avg_win,
            avg_loss,
            expectancy,
            profit_factor,
            avg_holding_ms: holding_ms / total,
            max_drawdown,
            max_tp_streak: streaks.max_tp_streak,
            max_sl_streak: streaks.max_sl_streak,
        }
    }

    fn empty(max_drawdown: Decimal, streaks: Streaks) -> Self {
        Self {
            total_trades: 0,
            wins: 0,
            losses: 0,
            win_rate: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            net_pnl: Decimal::ZERO,
            avg_win: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            expectancy: Decimal::ZERO,
            profit_factor: None,
            avg_holding_ms: Decimal::ZERO,
            max_drawdown,
            max_tp_streak: streaks.max_tp_streak,
            max_sl_streak: streaks.max_sl_streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExitReason, Side};
    use rust_decimal_macros::dec;

    fn trade(pnl: Decimal, entry_ts: i64, exit_ts: i64) -> Trade {
        Trade {
            side: Side::Long,
            entry_ts,
            exit_ts,
            entry_price: dec!(100),
            exit_price: dec!(100),
            quantity: dec!(1),
            notional: dec!(100),
            fees: Decimal::ZERO,
            pnl,
            pnl_fraction: pnl / dec!(100),
            reason: ExitReason::TakeProfit,
            bars_held: 1,
            take_profit: dec!(110),
            stop_loss: dec!(95),
            atr_at_entry: None,
        }
    }

    #[test]
    fn empty_ledger_gives_zeroed_summary() {
        let summary = Summary::from_trades(&[], Decimal::ZERO, Streaks::default());
        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.win_rate, Decimal::ZERO);
        assert!(summary.profit_factor.is_none());
    }

    #[test]
    fn aggregates_match_hand_computation() {
        let trades = vec![
            trade(dec!(100), 0, 60_000),
            trade(dec!(-40), 60_000, 180_000),
            trade(dec!(60), 180_000, 240_000),
            trade(dec!(-20), 240_000, 300_000),
        ];
        let summary = Summary::from_trades(&trades, dec!(0.1), Streaks::default());

        assert_eq!(summary.total_trades, 4);
        assert_eq!(summary.wins, 2);
        assert_eq!(summary.losses, 2);
        assert_eq!(summary.win_rate, dec!(0.5));
        assert_eq!(summary.gross_profit, dec!(160));
        assert_eq!(summary.gross_loss, dec!(60));
        assert_eq!(summary.net_pnl, dec!(100));
        assert_eq!(summary.avg_win, dec!(80));
        assert_eq!(summary.avg_loss, dec!(-30));
        // expectancy = 0.5*80 + 0.5*(-30) = 25
        assert_eq!(summary.expectancy, dec!(25));
        // profit factor = 160/60
        assert_eq!(summary.profit_factor, Some(dec!(160) / dec!(60)));
        // holding: (60000 + 120000 + 60000 + 60000) / 4 = 75000
        assert_eq!(summary.avg_holding_ms, dec!(75000));
    }

    #[test]
    fn zero_pnl_trade_counts_as_neither_win_nor_loss() {
        let trades = vec![trade(Decimal::ZERO, 0, 60_000)];
        let summary = Summary::from_trades(&trades, Decimal::ZERO, Streaks::default());
        assert_eq!(summary.wins, 0);
        assert_eq!(summary.losses, 0);
        assert_eq!(summary.total_trades, 1);
    }
}
