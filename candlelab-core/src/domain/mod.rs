//! Domain types: bars, sides, positions, trades.

pub mod bar;
pub mod position;
pub mod side;
pub mod trade;

pub use bar::{Bar, BarError};
pub use position::{ActivePosition, ScheduledEntry};
pub use side::{ExitReason, HitKind, Side};
pub use trade::Trade;
