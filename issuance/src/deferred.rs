//! # Deferred Issuance
//!
//! When a credential configuration defers signing, the sign input is computed
//! at the initial request and frozen on the issuance session together with
//! the time signing becomes permissible. Polls either report that the
//! transaction is still pending or release the frozen sign input.
//!
//! The sign input is never recomputed on poll: the credential eventually
//! signed reflects the claims available at the initial request.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;
use crate::types::{Issuance, SignOptions};

/// Poll interval, in seconds, reported while a transaction is pending.
pub const RETRY_INTERVAL: i64 = 2;

/// How long a deferred session outlives its deferral window.
pub const SESSION_GRACE: TimeDelta = TimeDelta::minutes(15);

/// Deferred issuance state held by an issuance session.
///
/// The sign input is set once, on construction, and has no setter.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuanceMetadata {
    transaction_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    defer_until: Option<DateTime<Utc>>,

    sign_options: SignOptions,

    #[serde(default)]
    resolved: bool,
}

/// The outcome of evaluating a poll against stored metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Still inside the deferral window.
    Wait {
        /// Seconds to wait before polling again.
        interval: i64,
    },

    /// The window has elapsed: persist the resolved metadata, then sign.
    Resolve(IssuanceMetadata),

    /// Already resolved by an earlier poll.
    Resolved,
}

impl IssuanceMetadata {
    /// Freeze `sign_options` until `defer_for` has elapsed from `now`.
    #[must_use]
    pub fn defer(sign_options: SignOptions, defer_for: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            transaction_id: Uuid::new_v4().to_string(),
            defer_until: Some(now + defer_for),
            sign_options,
            resolved: false,
        }
    }

    /// Identifies the deferred transaction to the caller.
    #[must_use]
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Time from which the sign input may be released.
    #[must_use]
    pub const fn defer_until(&self) -> Option<DateTime<Utc>> {
        self.defer_until
    }

    /// The frozen sign input.
    #[must_use]
    pub const fn sign_options(&self) -> &SignOptions {
        &self.sign_options
    }

    /// Whether a poll has already released the sign input.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// The state reported to a caller who has just deferred, or re-requested,
    /// this transaction.
    #[must_use]
    pub fn deferred(&self, now: DateTime<Utc>) -> Issuance {
        let interval = self.defer_until.map_or(RETRY_INTERVAL, |until| seconds_until(until, now));
        Issuance::Deferred {
            transaction_id: self.transaction_id.clone(),
            interval: interval.max(1),
        }
    }

    /// Evaluate a poll for `transaction_id` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransactionId`] when `transaction_id` was not
    /// issued for this session, and [`Error::ProtocolViolation`] when the
    /// session was never given a deferral time.
    pub fn poll(&self, transaction_id: &str, now: DateTime<Utc>) -> Result<Step, Error> {
        if transaction_id != self.transaction_id {
            return Err(Error::InvalidTransactionId(format!(
                "{transaction_id} is not pending for this session"
            )));
        }
        let Some(defer_until) = self.defer_until else {
            return Err(Error::ProtocolViolation("issuance was not deferred".to_string()));
        };

        if self.resolved {
            return Ok(Step::Resolved);
        }

        let remaining = seconds_until(defer_until, now);
        if remaining > 0 {
            return Ok(Step::Wait {
                interval: remaining.min(RETRY_INTERVAL),
            });
        }

        Ok(Step::Resolve(Self {
            resolved: true,
            ..self.clone()
        }))
    }

    /// The resolved state returned to the caller.
    #[must_use]
    pub fn resolved(&self) -> Issuance {
        Issuance::Resolved {
            sign_options: self.sign_options.clone(),
        }
    }
}

/// Seconds from `now` until `until`, rounded up. Zero or negative once `until`
/// has passed.
fn seconds_until(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let remaining = until - now;
    let seconds = remaining.num_seconds();
    if remaining > TimeDelta::seconds(seconds) { seconds + 1 } else { seconds }
}
