//! # Device Binding
//!
//! Authenticates a device-bound response by recomputing its MAC. The MAC key
//! is agreed between the verifier's stored P-256 private key and the device's
//! public key (ECDH), then optionally passed through HKDF before keying
//! HMAC-SHA256 over the transcript.
//!
//! A MAC that does not match is reported as `Ok(false)`. Errors are reserved
//! for infrastructure failures: the key cannot be found, or key material
//! cannot be decoded.
//!
//! ```rust,ignore
//! let verified = MacVerifier::new(MacDerivation::Hkdf)
//!     .verify(&keystore, &key_ref, &device_jwk, &mac, transcript)
//!     .await?;
//! ```

mod error;
mod jwk;
mod mac;
pub mod provider;

pub use self::error::Error;
pub use self::jwk::{PrivateKeyJwk, PublicKeyJwk};
pub use self::mac::{MacDerivation, MacEncoding, MacVerifier};
pub use self::provider::{KeyRef, KeyStore};

/// Result type for device binding operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
