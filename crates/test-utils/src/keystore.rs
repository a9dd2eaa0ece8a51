//! # Key Store Provider

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use interop_binding::{KeyRef, KeyStore, PrivateKeyJwk, PublicKeyJwk};

const KEYS: &[u8] = include_bytes!("../data/keys.json");

/// Scope the fixture keys are stored under.
pub const SCOPE: &str = "https://verifier.example.com";

/// Fixed P-256 keys held in memory.
#[derive(Clone, Debug)]
pub struct Keystore {
    keys: HashMap<String, PrivateKeyJwk>,
    failing: bool,
}

impl Keystore {
    /// Create a key store holding the fixture keys under [`SCOPE`].
    ///
    /// # Panics
    ///
    /// When the fixture cannot be loaded.
    #[must_use]
    pub fn new() -> Self {
        let keys = serde_json::from_slice(KEYS).expect("should load keys");
        Self {
            keys,
            failing: false,
        }
    }

    /// A key store whose every lookup fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            keys: HashMap::new(),
            failing: true,
        }
    }

    /// Reference to a fixture key.
    #[must_use]
    pub fn key_ref(key_id: &str) -> KeyRef {
        KeyRef::new(SCOPE, key_id)
    }

    /// Public part of a fixture key.
    ///
    /// # Panics
    ///
    /// When `key_id` is not a fixture key.
    #[must_use]
    pub fn public(&self, key_id: &str) -> PublicKeyJwk {
        self.keys.get(key_id).map(|jwk| jwk.public.clone()).expect("should be a fixture key")
    }
}

impl Default for Keystore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStore for Keystore {
    async fn secret(&self, scope: &str, key_id: &str) -> Result<Option<PrivateKeyJwk>> {
        if self.failing {
            return Err(anyhow!("key vault unavailable"));
        }
        if scope != SCOPE {
            return Ok(None);
        }
        Ok(self.keys.get(key_id).cloned())
    }
}
