//! Millisecond-precision timestamps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
///
/// The server reports ISO-8601 strings in some legacy endpoints, but
/// everything inside the engine normalizes to this representation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeStamp(pub u64);

impl TimeStamp {
    /// Construct from raw milliseconds.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Raw milliseconds since the epoch.
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64;
        Self(ms)
    }

    /// Elapsed time since `earlier`, saturating at zero.
    pub fn since(&self, earlier: TimeStamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl From<u64> for TimeStamp {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_saturates() {
        let a = TimeStamp::from_millis(100);
        let b = TimeStamp::from_millis(400);
        assert_eq!(b.since(a), Duration::from_millis(300));
        assert_eq!(a.since(b), Duration::ZERO);
    }
}
