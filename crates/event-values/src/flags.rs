//! Resolution flags.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::time::Time;

bitflags! {
    /// Options controlling how far resolution may go to find a value.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ResolveFlags: u8 {
        /// Past and future queries that find nothing retry against the
        /// present.
        const FALLBACK_TO_DEFAULT_TIME_STATE = 1 << 0;
        /// Enables the downcast and full conversion phases.
        const ALLOW_CONVERSION = 1 << 1;
    }
}

impl ResolveFlags {
    /// Both fallback and conversion.
    pub const DEFAULT: Self = Self::FALLBACK_TO_DEFAULT_TIME_STATE.union(Self::ALLOW_CONVERSION);

    /// Drops flags that have no effect at `time`.
    ///
    /// Present-time queries have nothing to fall back to, so the fallback flag
    /// is removed. Queries differing only in such flags share a cache entry.
    #[must_use]
    pub fn normalized_for(self, time: Time) -> Self {
        if time.is_now() {
            self.difference(Self::FALLBACK_TO_DEFAULT_TIME_STATE)
        } else {
            self
        }
    }
}

impl Default for ResolveFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}
