//! Vertical intervals delimiting where a region computes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A bound of a vertical interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    /// The bottom of the vertical axis.
    Start,
    /// The top of the vertical axis.
    End,
    /// A literal level.
    At(i32),
}

/// A vertical interval, both bounds included.
///
/// The offsets displace the bounds, so that `Start + 1 .. End - 1` covers
/// everything but the two boundary levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound.
    pub lower: Level,
    /// Upper bound.
    pub upper: Level,
    /// Offset added to the lower bound.
    pub lower_offset: i32,
    /// Offset added to the upper bound.
    pub upper_offset: i32,
}

/// Shortcut to create an interval between two (offset) levels.
pub fn interval(lower: Level, upper: Level, lower_offset: i32, upper_offset: i32) -> Interval {
    Interval {
        lower,
        upper,
        lower_offset,
        upper_offset,
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Start => write!(f, "start"),
            Level::End => write!(f, "end"),
            Level::At(level) => write!(f, "{level}"),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:+}..{}{:+}",
            self.lower, self.lower_offset, self.upper, self.upper_offset
        )
    }
}
