//! # Issuance Errors
//!
//! Errors are returned to the HTTP-facing collaborator unchanged. Each maps
//! to an HTTP status via [`HttpError`] and serializes as an `OAuth`-style
//! `{"error": ..., "error_description": ...}` object.

use interop_core::api::{HttpError, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Issuance error codes.
#[derive(Error, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "error", content = "error_description")]
pub enum Error {
    /// The request is missing a required parameter or is otherwise
    /// malformed.
    #[error(r#"{{"error": "invalid_request", "error_description": "{0}"}}"#)]
    InvalidRequest(String),

    /// No credential configuration is registered under the requested id.
    #[error(r#"{{"error": "configuration_not_found", "error_description": "{0}"}}"#)]
    ConfigurationNotFound(String),

    /// The credential configuration requires a verified presentation and
    /// none was supplied.
    #[error(r#"{{"error": "presentation_required", "error_description": "{0}"}}"#)]
    PresentationRequired(String),

    /// A claim the credential configuration marks as mandatory could not be
    /// obtained from the presentation.
    #[error(r#"{{"error": "missing_claim", "error_description": "{0}"}}"#)]
    MissingClaim(String),

    /// The credential configuration names a target schema the claim
    /// normalizer does not know.
    #[error(r#"{{"error": "unsupported_target_schema", "error_description": "{0}"}}"#)]
    UnsupportedTargetSchema(String),

    /// The request is not valid for the current state of the issuance
    /// session, e.g. polling a session that was never deferred.
    #[error(r#"{{"error": "protocol_violation", "error_description": "{0}"}}"#)]
    ProtocolViolation(String),

    /// The deferred request contains a `transaction_id` not issued for this
    /// session.
    #[error(r#"{{"error": "invalid_transaction_id", "error_description": "{0}"}}"#)]
    InvalidTransactionId(String),

    /// The issuer encountered an unexpected condition, typically a provider
    /// failure.
    #[error(r#"{{"error": "server_error", "error_description": "{0}"}}"#)]
    ServerError(String),
}

impl HttpError for Error {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::PresentationRequired(_)
            | Self::MissingClaim(_)
            | Self::ProtocolViolation(_)
            | Self::InvalidTransactionId(_) => StatusCode::BAD_REQUEST,
            Self::ConfigurationNotFound(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedTargetSchema(_) | Self::ServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<Self>() {
            return e.clone();
        }
        let stack = err.chain().map(|cause| format!(" -> {cause}")).collect::<String>();
        Self::ServerError(stack)
    }
}

/// Construct an `Error::InvalidRequest` error from a string or existing error
/// value.
macro_rules! invalid {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::InvalidRequest(format!($fmt, $($arg)*))
    };
    ($err:expr $(,)?) => {
        $crate::Error::InvalidRequest(format!($err))
    };
}
pub(crate) use invalid;

/// Construct an `Error::ServerError` error from a string or existing error
/// value.
macro_rules! server {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::ServerError(format!($fmt, $($arg)*))
    };
    ($err:expr $(,)?) => {
        $crate::Error::ServerError(format!($err))
    };
}
pub(crate) use server;
