//! # Trust Chains
//!
//! An in-memory registry of trust edges used to decide whether one federation
//! entity is the direct trust parent of another, and to enumerate the
//! authority hints an entity publishes for federation discovery.
//!
//! Each [`TrustEdge`] describes a chain `[leaf, ...intermediates, anchor]`.
//! Edges are loaded once at startup into a [`TrustRegistry`], which is
//! immutable thereafter and safe to share between threads without locking.

mod error;
mod registry;

pub use self::error::Error;
pub use self::registry::{EntityId, TrustEdge, TrustRegistry};

/// Result type for trust chain queries.
pub type Result<T, E = Error> = std::result::Result<T, E>;
