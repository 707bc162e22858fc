//! Trade tape export (CSV/JSON).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use candlelab_core::domain::Trade;

use super::format_ts;

pub fn write_trades_csv(path: &Path, symbol: &str, trades: &[Trade]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;

    writeln!(
        file,
        "symbol,side,entry_time_utc,exit_time_utc,entry_price,exit_price,quantity,notional,fees,pnl,pnl_fraction,reason,bars_held,tp_price,sl_price"
    )?;

    for trade in trades {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            symbol,
            trade.side.as_str(),
            format_ts(trade.entry_ts),
            format_ts(trade.exit_ts),
            trade.entry_price,
            trade.exit_price,
            trade.quantity,
            trade.notional,
            trade.fees,
            trade.pnl,
            trade.pnl_fraction,
            trade.reason.as_str(),
            trade.bars_held,
            trade.take_profit,
            trade.stop_loss,
        )?;
    }

    Ok(())
}

pub fn write_trades_json(path: &Path, trades: &[Trade]) -> Result<()> {
    let json = serde_json::to_string_pretty(trades).context("failed to serialize trades")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write trades JSON {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use candlelab_core::domain::{ExitReason, Side};
    use rust_decimal_macros::dec;

    fn sample_trade() -> Trade {
        Trade {
            side: Side::Long,
            entry_ts: 1_700_000_000_000,
            exit_ts: 1_700_000_300_000,
            entry_price: dec!(100.01),
            exit_price: dec!(105.0),
            quantity: dec!(9.999),
            notional: dec!(1000.0),
            fees: dec!(2.1),
            pnl: dec!(47.8),
            pnl_fraction: dec!(0.0478),
            reason: ExitReason::TakeProfit,
            bars_held: 5,
            take_profit: dec!(105.0),
            stop_loss: dec!(98.0),
            atr_at_entry: Some(2.5),
        }
    }

    #[test]
    fn csv_has_header_and_one_row_per_trade() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");
        write_trades_csv(&path, "BTCUSDT", &[sample_trade()]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("symbol,side,entry_time_utc"));
        assert!(lines[1].starts_with("BTCUSDT,long,"));
        assert!(lines[1].contains("take_profit"));
    }

    #[test]
    fn json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.json");
        write_trades_json(&path, &[sample_trade()]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Trade> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].pnl, dec!(47.8));
    }
}
