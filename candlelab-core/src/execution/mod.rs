//! Exit execution: gap-open detection and first-touch TP/SL resolution.

pub mod gap;
pub mod resolver;

pub use gap::check_gap_open;
pub use resolver::{resolve_first_touch, FirstTouchPolicy, Resolution};
