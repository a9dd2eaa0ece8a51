//! # Provider Traits
//!
//! Key material is held by the library user. Implement [`KeyStore`] to give
//! the verifier access to stored private keys.

use std::future::Future;

use anyhow::Result;

use crate::jwk::PrivateKeyJwk;

/// Scoped access to stored private keys.
pub trait KeyStore: Send + Sync {
    /// Fetch the secret key stored as `key_id` within `scope`, returning
    /// `None` if no such key exists.
    fn secret(
        &self, scope: &str, key_id: &str,
    ) -> impl Future<Output = Result<Option<PrivateKeyJwk>>> + Send;
}

/// Reference to a stored private key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyRef {
    /// Key storage scope, typically the owning tenant or verifier.
    pub scope: String,

    /// Identifier of the key within its scope.
    pub key_id: String,
}

impl KeyRef {
    /// Create a new key reference.
    #[must_use]
    pub fn new(scope: impl Into<String>, key_id: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            key_id: key_id.into(),
        }
    }
}
