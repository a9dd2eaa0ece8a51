//! # Provider Traits
//!
//! This module defines the `Provider` trait and its associated traits, which
//! are implemented by library users to supply credential templates, durable
//! issuance session storage, and the current time.

use std::future::Future;

use anyhow::Result;
use chrono::{DateTime, Utc};
pub use interop_core::{Conflict, State};

use crate::deferred::IssuanceMetadata;
use crate::types::CredentialTemplate;

/// Issuer Provider trait.
pub trait Provider: Metadata + SessionStore + Clock + Clone {}

/// A blanket implementation for `Provider` trait so that any type implementing
/// the required super traits is considered a `Provider`.
impl<T> Provider for T where T: Metadata + SessionStore + Clock + Clone {}

/// The `Metadata` trait is used by implementers to provide the static
/// credential templates of an issuer.
pub trait Metadata: Send + Sync {
    /// The credential template registered under `configuration_id`, or
    /// `None` if there is none.
    fn configuration(
        &self, owner: &str, configuration_id: &str,
    ) -> impl Future<Output = Result<Option<CredentialTemplate>>> + Send;
}

/// Durable storage for issuance session state.
///
/// Writes are versioned. `put` must accept a state only when the version
/// currently stored equals [`State::expected_version`] (nothing stored when
/// that is `None`), failing with [`Conflict`] otherwise. The check and the
/// write must be atomic per session.
pub trait SessionStore: Send + Sync {
    /// Retrieve the issuance metadata of a session.
    fn get(
        &self, owner: &str, session_id: &str,
    ) -> impl Future<Output = Result<Option<State<IssuanceMetadata>>>> + Send;

    /// Store issuance metadata for a session.
    fn put(
        &self, owner: &str, session_id: &str, state: &State<IssuanceMetadata>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current time.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
