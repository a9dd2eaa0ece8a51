//! # Device Binding Errors

use thiserror::Error;

/// Infrastructure failures raised while verifying a device MAC. A MAC
/// mismatch is never an error.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// No private key is stored under the requested key id.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Key material is present but cannot be used: a missing private scalar,
    /// bad encoding, the wrong curve, or a point not on the curve.
    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// The key store could not be reached.
    #[error("key store: {0}")]
    Storage(String),
}
