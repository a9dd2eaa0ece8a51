//! # Trust Chain Errors

use thiserror::Error;

/// Errors raised while building or querying a trust registry.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The subject identifier has no final `/`-separated segment to match
    /// against chain entries.
    #[error("malformed subject identifier: {0}")]
    MalformedSubjectIdentifier(String),

    /// A trust edge names the same entity as both leaf and trust anchor.
    #[error("invalid trust edge: {0}")]
    InvalidEdge(String),

    /// The trust edge document could not be parsed.
    #[error("invalid trust edge document: {0}")]
    InvalidDocument(String),
}
