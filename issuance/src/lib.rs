//! # Presentation-Gated Issuance
//!
//! Decides what to sign for a credential request, with which claims, and
//! whether to sign now or later.
//!
//! A request names a credential configuration. When the configuration is
//! gated on a previously verified presentation, the claims extracted from
//! that presentation (SD-JWT or mdoc) are normalized into the claim set of
//! the target credential and merged over the configuration's defaults. The
//! resulting sign input is either returned for immediate signing or frozen
//! on the issuance session and released once its deferral window elapses.
//!
//! Requests are dispatched through [`handle`]:
//!
//! ```rust,ignore
//! let response = interop_issuance::handle(ISSUER, request, &provider).await?;
//! match &response.body {
//!     Issuance::Immediate { sign_options } => sign(sign_options),
//!     Issuance::Deferred { transaction_id, interval } => defer(transaction_id, *interval),
//!     Issuance::Resolved { .. } => unreachable!(),
//! }
//! ```

pub mod deferred;
pub mod normalize;
pub mod provider;
pub mod types;

mod error;
mod handlers;

pub use interop_core::api::{
    Body, Handler, Headers, HttpError, NoHeaders, Request, Response, StatusCode,
};
pub use interop_core::{Conflict, State};
pub use {interop_binding as binding, interop_trust as trust};

pub use self::error::Error;
pub use self::handlers::*;
pub use self::types::*;
