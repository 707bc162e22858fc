use serde::{Deserialize, Serialize};

/// Position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }
}

/// Why a position was closed.
///
/// Gap-open exits are distinct reasons because the fill price is the bar's
/// open rather than the level itself, but for streak accounting they count
/// as their underlying TP/SL hit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    TargetGapOpen,
    StopGapOpen,
    Timeout,
    EndOfData,
}

/// Which protective level an exit corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Tp,
    Sl,
}

impl ExitReason {
    /// TP/SL classification used by streak tracking. Timeout and end-of-data
    /// exits belong to neither kind and reset both streaks.
    pub fn hit_kind(&self) -> Option<HitKind> {
        match self {
            ExitReason::TakeProfit | ExitReason::TargetGapOpen => Some(HitKind::Tp),
            ExitReason::StopLoss | ExitReason::StopGapOpen => Some(HitKind::Sl),
            ExitReason::Timeout | ExitReason::EndOfData => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::TakeProfit => "take_profit",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TargetGapOpen => "target_gap_open",
            ExitReason::StopGapOpen => "stop_gap_open",
            ExitReason::Timeout => "timeout",
            ExitReason::EndOfData => "end_of_data",
        }
    }
}
