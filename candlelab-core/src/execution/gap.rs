//! Gap-open exits.
//!
//! If a bar opens already beyond the position's TP or SL, the realistic fill
//! is the open itself, not the level. This check runs before intrabar path
//! resolution; the TP side is tested first, mirroring the level ordering of
//! the first-touch hit detection.

use crate::domain::{ActivePosition, Bar, ExitReason, Side};
use crate::execution::resolver::Resolution;

/// Returns the gap exit when `bar.open` breaches a level, `None` otherwise.
pub fn check_gap_open(bar: &Bar, position: &ActivePosition) -> Option<Resolution> {
    match position.side {
        Side::Long => {
            if bar.open >= position.take_profit {
                return Some(Resolution {
                    exit_price: bar.open,
                    reason: ExitReason::TargetGapOpen,
                });
            }
            if bar.open <= position.stop_loss {
                return Some(Resolution {
                    exit_price: bar.open,
                    reason: ExitReason::StopGapOpen,
                });
            }
        }
        Side::Short => {
            if bar.open <= position.take_profit {
                return Some(Resolution {
                    exit_price: bar.open,
                    reason: ExitReason::TargetGapOpen,
                });
            }
            if bar.open >= position.stop_loss {
                return Some(Resolution {
                    exit_price: bar.open,
                    reason: ExitReason::StopGapOpen,
                });
            }
        }
    }
    None
}
