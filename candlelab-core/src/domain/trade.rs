use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::side::{ExitReason, Side};

/// Finalized round-trip record appended to the ledger on position closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub side: Side,
    pub entry_ts: i64,
    pub exit_ts: i64,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub quantity: Decimal,
    /// entry_price * quantity at fill time.
    pub notional: Decimal,
    /// Entry fee + exit fee.
    pub fees: Decimal,
    /// Realized PnL net of fees.
    pub pnl: Decimal,
    /// pnl / notional.
    pub pnl_fraction: Decimal,
    pub reason: ExitReason,
    pub bars_held: usize,
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
    pub atr_at_entry: Option<f64>,
}
