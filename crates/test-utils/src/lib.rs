//! # Mock Providers
//!
//! In-memory providers and fixture data shared by the workspace's
//! integration tests.

pub mod issuer;
pub mod keystore;

pub use interop_trust::TrustRegistry;

pub use self::issuer::Issuer;
pub use self::keystore::Keystore;

const TRUST_EDGES: &[u8] = include_bytes!("../data/trust-edges.json");

/// The fixture trust registry.
///
/// # Panics
///
/// When the fixture cannot be loaded.
#[must_use]
pub fn trust_registry() -> TrustRegistry {
    TrustRegistry::from_slice(TRUST_EDGES).expect("should load trust edges")
}
