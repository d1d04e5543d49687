//! Temporal states of an occurrence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InvalidTime;

/// Which snapshot of an occurrence a value describes.
///
/// A join event has a "past" location (before the join) and a "now" location.
/// Descriptors answer for exactly one state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Time {
    /// Before the occurrence took effect.
    Past,
    /// As the occurrence is being handled.
    #[default]
    Now,
    /// After the occurrence takes effect.
    Future,
}

impl Time {
    /// All states in storage order.
    pub const ALL: [Time; 3] = [Time::Past, Time::Now, Time::Future];

    /// Numeric value: `-1`, `0` or `1`.
    #[must_use]
    pub const fn value(self) -> i8 {
        match self {
            Time::Past => -1,
            Time::Now => 0,
            Time::Future => 1,
        }
    }

    /// Index into per-state storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Time::Past => 0,
            Time::Now => 1,
            Time::Future => 2,
        }
    }

    /// Returns true for [`Time::Now`].
    #[must_use]
    pub const fn is_now(self) -> bool {
        matches!(self, Time::Now)
    }
}

impl TryFrom<i8> for Time {
    type Error = InvalidTime;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Time::Past),
            0 => Ok(Time::Now),
            1 => Ok(Time::Future),
            other => Err(InvalidTime(other)),
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Time::Past => "past",
            Time::Now => "now",
            Time::Future => "future",
        })
    }
}
