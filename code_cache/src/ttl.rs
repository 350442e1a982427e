use chrono::TimeDelta;
use serde::Serialize;
use std::fmt;

/// Time left before a cached draft expires, for display next to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RemainingTtl {
    minutes: i64,
}

impl RemainingTtl {
    /// Truncates to whole minutes; negative spans clamp to zero.
    pub fn from_delta(delta: TimeDelta) -> Self {
        Self {
            minutes: delta.num_minutes().max(0),
        }
    }

    pub fn hours(&self) -> i64 {
        self.minutes / 60
    }

    pub fn minutes(&self) -> i64 {
        self.minutes % 60
    }

    pub fn total_minutes(&self) -> i64 {
        self.minutes
    }
}

/// `"2h 15m"`, or `"42m"` when less than an hour is left.
impl fmt::Display for RemainingTtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours() > 0 {
            write!(f, "{}h {}m", self.hours(), self.minutes())
        } else {
            write!(f, "{}m", self.minutes())
        }
    }
}
