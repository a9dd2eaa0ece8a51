//! # Trust Registry

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Opaque identifier of a federation entity (verifier, issuer, anchor). May be
/// URL-shaped.
pub type EntityId = String;

/// An explicit trust relationship from a leaf, through optional
/// intermediates, to a trust anchor.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrustEdge {
    /// The subordinate entity at the bottom of the chain.
    pub leaf: EntityId,

    /// Entities between the leaf and the anchor, ordered leaf-side first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intermediates: Vec<EntityId>,

    /// The root of trust for the chain.
    pub trust_anchor: EntityId,
}

impl TrustEdge {
    /// Create a direct leaf → anchor edge.
    #[must_use]
    pub fn new(leaf: impl Into<EntityId>, trust_anchor: impl Into<EntityId>) -> Self {
        Self {
            leaf: leaf.into(),
            intermediates: vec![],
            trust_anchor: trust_anchor.into(),
        }
    }

    /// Insert an intermediate between the existing intermediates and the
    /// anchor.
    #[must_use]
    pub fn intermediate(mut self, entity: impl Into<EntityId>) -> Self {
        self.intermediates.push(entity.into());
        self
    }

    /// The flattened chain `[leaf, ...intermediates, trust_anchor]`.
    fn flatten(self) -> Vec<EntityId> {
        let mut chain = Vec::with_capacity(self.intermediates.len() + 2);
        chain.push(self.leaf);
        chain.extend(self.intermediates);
        chain.push(self.trust_anchor);
        chain
    }
}

/// Immutable set of trust chains, built once at startup and shared by
/// reference with every consumer.
#[derive(Clone, Debug, Default)]
pub struct TrustRegistry {
    chains: Vec<Vec<EntityId>>,
}

impl TrustRegistry {
    /// Build a registry from the configured trust edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEdge`] when an edge names the same entity as
    /// leaf and trust anchor.
    pub fn new(edges: impl IntoIterator<Item = TrustEdge>) -> Result<Self> {
        let chains = edges
            .into_iter()
            .map(|edge| {
                if edge.leaf == edge.trust_anchor {
                    return Err(Error::InvalidEdge(format!(
                        "{} cannot be its own trust anchor",
                        edge.leaf
                    )));
                }
                Ok(edge.flatten())
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(chains = chains.len(), "trust registry loaded");
        Ok(Self { chains })
    }

    /// Build a registry from a JSON array of trust edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] when the document is not a list of
    /// edges, or any error returned by [`TrustRegistry::new`].
    pub fn from_slice(json: &[u8]) -> Result<Self> {
        let edges: Vec<TrustEdge> =
            serde_json::from_slice(json).map_err(|e| Error::InvalidDocument(e.to_string()))?;
        Self::new(edges)
    }

    /// Returns `true` when `subject` sits immediately below `issuer` in at
    /// least one chain.
    ///
    /// Only direct (one-hop) subordination is recognised: an entity two or
    /// more positions below `issuer` is not considered subordinate to it.
    ///
    /// `subject` is reduced to its final `/`-separated segment before
    /// matching, so URL-shaped identifiers resolve to the entity name they
    /// end with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSubjectIdentifier`] when `subject` has no
    /// final segment (empty, or ending in `/`).
    pub fn is_subordinate_to(&self, issuer: &str, subject: &str) -> Result<bool> {
        let subject = subject
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| Error::MalformedSubjectIdentifier(subject.to_string()))?;

        Ok(self
            .chains
            .iter()
            .any(|chain| chain.windows(2).any(|pair| pair[0] == subject && pair[1] == issuer)))
    }

    /// The immediate trust parent of `entity` in every chain containing it,
    /// in registry order.
    ///
    /// Duplicates are not removed: an entity with the same parent in two
    /// chains reports that parent twice. A trust anchor contributes nothing
    /// from the chains it terminates.
    #[must_use]
    pub fn authority_hints(&self, entity: &str) -> Vec<&str> {
        self.chains
            .iter()
            .flat_map(|chain| chain.windows(2))
            .filter(|pair| pair[0] == entity)
            .map(|pair| pair[1].as_str())
            .collect()
    }

    /// Every entity named by any chain, sorted and without duplicates.
    #[must_use]
    pub fn entities(&self) -> Vec<&str> {
        let unique: BTreeSet<&str> = self.chains.iter().flatten().map(String::as_str).collect();
        unique.into_iter().collect()
    }

    /// The distinct trust anchors terminating at least one chain.
    #[must_use]
    pub fn trust_anchors(&self) -> Vec<&str> {
        let unique: BTreeSet<&str> =
            self.chains.iter().filter_map(|chain| chain.last()).map(String::as_str).collect();
        unique.into_iter().collect()
    }
}
