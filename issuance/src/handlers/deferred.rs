//! # Deferred Issuance Endpoint
//!
//! Polled by the wallet after an issuance request was deferred. Reports the
//! transaction as pending until its deferral window elapses, then releases
//! the sign input frozen at the initial request.

use anyhow::Context as _;
use interop_core::api::{Body, Handler, Request, Response};

use crate::deferred::Step;
use crate::error::server;
use crate::handlers::{Error, Result};
use crate::provider::{Clock, Conflict, Provider, SessionStore};
use crate::types::{DeferredRequest, Issuance};

/// Number of times a poll re-reads the session after losing a write race.
const MAX_ATTEMPTS: usize = 3;

/// Deferred issuance request handler.
async fn deferred(owner: &str, provider: &impl Provider, request: DeferredRequest) -> Result<Issuance> {
    let session_id = &request.session_id;

    for _ in 0..MAX_ATTEMPTS {
        let Some(state) =
            SessionStore::get(provider, owner, session_id).await.context("fetching session")?
        else {
            return Err(Error::ProtocolViolation("issuance was not deferred".to_string()));
        };

        let now = Clock::now(provider);
        if state.is_expired(now) {
            return Err(Error::ProtocolViolation("issuance session expired".to_string()));
        }

        let resolved = match state.body.poll(&request.transaction_id, now)? {
            Step::Wait { interval } => {
                return Ok(Issuance::Deferred {
                    transaction_id: request.transaction_id,
                    interval,
                });
            }
            Step::Resolved => return Ok(state.body.resolved()),
            Step::Resolve(resolved) => resolved,
        };

        let next = state.next(resolved);
        match SessionStore::put(provider, owner, session_id, &next).await {
            Ok(()) => {
                tracing::debug!("deferred::resolved {}", request.transaction_id);
                return Ok(next.body.resolved());
            }
            Err(e) if e.is::<Conflict>() => {
                tracing::warn!("deferred::conflict {e}");
            }
            Err(e) => return Err(e.context("storing session").into()),
        }
    }

    Err(server!("session {session_id} is being modified concurrently"))
}

impl<P: Provider> Handler<Issuance, P> for Request<DeferredRequest> {
    type Error = Error;

    async fn handle(self, owner: &str, provider: &P) -> Result<impl Into<Response<Issuance>>> {
        deferred(owner, provider, self.body).await
    }
}

impl Body for DeferredRequest {}
