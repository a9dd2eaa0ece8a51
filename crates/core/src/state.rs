//! # State
//!
//! State is used to persist request information between steps in a flow.
//! Every stored item carries a version so that concurrent writers can use
//! optimistic read-modify-write: a write is accepted only when the version it
//! was derived from is still current.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Versioned state envelope.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct State<T> {
    /// Body holds data relevant to the current state.
    pub body: T,

    /// Monotonic version, incremented on every write. A new item starts at
    /// `1`.
    pub version: u64,

    /// Time state should expire.
    pub expires_at: DateTime<Utc>,
}

impl<T> State<T> {
    /// Create a new, never-stored state item expiring `lifetime` after `now`.
    pub fn new(body: T, now: DateTime<Utc>, lifetime: TimeDelta) -> Self {
        Self {
            body,
            version: 1,
            expires_at: now + lifetime,
        }
    }

    /// Determines whether state has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Derive the next version of this item with a new body. The expiry is
    /// carried over unchanged.
    #[must_use]
    pub fn next<U>(&self, body: U) -> State<U> {
        State {
            body,
            version: self.version + 1,
            expires_at: self.expires_at,
        }
    }

    /// The version a store must currently hold for `self` to be written,
    /// `None` when the item must not exist yet.
    #[must_use]
    pub const fn expected_version(&self) -> Option<u64> {
        match self.version {
            0 | 1 => None,
            v => Some(v - 1),
        }
    }
}

/// Returned by a store when a versioned write loses a race with another
/// writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("stale write: expected version {expected:?}, found {found:?}")]
pub struct Conflict {
    /// Version the writer expected the store to hold.
    pub expected: Option<u64>,

    /// Version the store actually holds.
    pub found: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions() {
        let now = Utc::now();
        let first = State::new("a", now, TimeDelta::seconds(60));
        assert_eq!(first.version, 1);
        assert_eq!(first.expected_version(), None);

        let second = first.next("b");
        assert_eq!(second.version, 2);
        assert_eq!(second.expected_version(), Some(1));
        assert_eq!(second.expires_at, first.expires_at);
    }

    #[test]
    fn expiry() {
        let now = Utc::now();
        let state = State::new((), now, TimeDelta::seconds(60));
        assert!(!state.is_expired(now));
        assert!(state.is_expired(now + TimeDelta::seconds(61)));
    }

    #[test]
    fn serializes() {
        let now = Utc::now();
        let state = State::new(42, now, TimeDelta::seconds(1)).next(43);
        let json = serde_json::to_value(&state).expect("should serialize");
        assert_eq!(json["body"], 43);
        assert_eq!(json["version"], 2);
    }
}
