//! # Endpoint
//!
//! Issuance requests are routed to the appropriate handler for processing,
//! returning an [`Issuance`](crate::Issuance) the HTTP-facing collaborator
//! can serialize or hand to the signer.

mod deferred;
mod issue;

use std::fmt::Debug;

use interop_core::api::{Body, Handler, Headers, Request, Response};
use tracing::instrument;

pub use crate::error::Error;
use crate::provider::Provider;

/// Result type for presentation-gated issuance.
pub type Result<T, E = Error> = anyhow::Result<T, E>;

/// Handle incoming issuance requests.
///
/// # Errors
///
/// Expected failures include unknown credential configurations, missing or
/// insufficient presentations, and polls that do not match the state of the
/// issuance session.
///
/// Implementers should look to the Error type and description for more
/// information on the reason for failure.
#[instrument(level = "debug", skip(provider))]
pub async fn handle<B, H, P, U>(
    owner: &str, request: impl Into<Request<B, H>> + Debug, provider: &P,
) -> Result<Response<U>>
where
    B: Body,
    H: Headers,
    P: Provider,
    Request<B, H>: Handler<U, P, Error = Error>,
{
    let request: Request<B, H> = request.into();
    Ok(request.handle(owner, provider).await?.into())
}
