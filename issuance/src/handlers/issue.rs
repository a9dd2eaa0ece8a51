//! # Issuance Endpoint
//!
//! Resolves the credential configuration named in the request, builds the
//! claim set from the verified presentation (when the configuration is
//! gated on one) and decides whether the credential is signed now or
//! deferred.
//!
//! Everything that can reject the request happens before the sign input is
//! built, and the sign input is built before anything is persisted.

use anyhow::Context as _;
use chrono::{DateTime, TimeDelta, Utc};
use interop_core::api::{Body, Handler, Request, Response};

use crate::deferred::{IssuanceMetadata, SESSION_GRACE};
use crate::error::invalid;
use crate::handlers::{Error, Result};
use crate::normalize::normalize;
use crate::provider::{Clock, Conflict, Metadata, Provider, SessionStore, State};
use crate::types::{
    ClaimRecord, CredentialTemplate, Issuance, IssuanceRequest, SignOptions,
    VerifiedPresentationClaims,
};

/// Issuance request handler.
async fn issue(owner: &str, provider: &impl Provider, request: IssuanceRequest) -> Result<Issuance> {
    let config_id = &request.credential_configuration_id;
    let Some(template) =
        Metadata::configuration(provider, owner, config_id).await.context("fetching template")?
    else {
        return Err(Error::ConfigurationNotFound(format!("{config_id} is not supported")));
    };
    if request.holder_binding.is_empty() {
        return Err(invalid!("no holder binding keys provided"));
    }

    let now = Clock::now(provider);
    let existing =
        SessionStore::get(provider, owner, &request.session_id).await.context("fetching session")?;
    if let Some(state) = existing.as_ref().filter(|state| !state.is_expired(now)) {
        return reissue(&state.body, config_id, now);
    }

    let claims = claims(&template, request.verified_presentation.as_ref())?;
    let sign_options = SignOptions {
        credential_configuration_id: template.id.clone(),
        format: template.format.clone(),
        doctype: template.doctype.clone(),
        vct: template.vct.clone(),
        holder_binding: request.holder_binding,
        claims,
    };

    let Some(defer_for) = template.deferred_issuance else {
        tracing::debug!("issue::immediate");
        return Ok(Issuance::Immediate { sign_options });
    };

    // freeze the sign input for the deferral window
    let window = TimeDelta::seconds(i64::from(defer_for));
    let metadata = IssuanceMetadata::defer(sign_options, window, now);
    let state = match existing {
        Some(expired) => State {
            version: expired.version + 1,
            expires_at: now + window + SESSION_GRACE,
            body: metadata,
        },
        None => State::new(metadata, now, window + SESSION_GRACE),
    };

    match SessionStore::put(provider, owner, &request.session_id, &state).await {
        Ok(()) => {
            tracing::debug!("issue::deferred {}", state.body.transaction_id());
            Ok(state.body.deferred(now))
        }
        Err(e) if e.is::<Conflict>() => {
            // a concurrent request deferred this session first
            tracing::warn!("issue::conflict {e}");
            let Some(winner) = SessionStore::get(provider, owner, &request.session_id)
                .await
                .context("fetching session")?
            else {
                return Err(Error::ServerError("session removed during write".to_string()));
            };
            reissue(&winner.body, config_id, now)
        }
        Err(e) => Err(e.context("storing session").into()),
    }
}

/// Re-emit the outcome of an earlier request for the same session. Claims
/// stay frozen.
fn reissue(
    metadata: &IssuanceMetadata, config_id: &str, now: DateTime<Utc>,
) -> Result<Issuance> {
    if metadata.sign_options().credential_configuration_id != config_id {
        return Err(Error::ProtocolViolation(format!(
            "session is already issuing {}",
            metadata.sign_options().credential_configuration_id
        )));
    }
    if metadata.is_resolved() {
        return Ok(metadata.resolved());
    }
    Ok(metadata.deferred(now))
}

/// Build the credential's claim set: template defaults overlaid with claims
/// normalized from the presentation.
fn claims(
    template: &CredentialTemplate, presentation: Option<&VerifiedPresentationClaims>,
) -> Result<ClaimRecord> {
    let mut claims = template.claims.clone();

    let Some(requirement) = &template.presentation else {
        return Ok(claims);
    };
    let Some(presentation) = presentation else {
        return Err(Error::PresentationRequired(format!(
            "{} requires a verified presentation",
            template.id
        )));
    };

    let normalized = normalize(presentation, &requirement.target_schema)?;
    if let Some(missing) = requirement.mandatory.iter().find(|name| !normalized.contains_key(*name))
    {
        return Err(Error::MissingClaim(format!("{missing} not found in presentation")));
    }

    claims.extend(normalized);
    Ok(claims)
}

impl<P: Provider> Handler<Issuance, P> for Request<IssuanceRequest> {
    type Error = Error;

    async fn handle(self, owner: &str, provider: &P) -> Result<impl Into<Response<Issuance>>> {
        issue(owner, provider, self.body).await
    }
}

impl Body for IssuanceRequest {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::PresentationRequirement;

    fn template() -> CredentialTemplate {
        serde_json::from_value(json!({
            "id": "health-id-sd-jwt",
            "format": "dc+sd-jwt",
            "vct": "urn:example:health-id",
            "claims": {"given_name": "Default", "insurer": "Zorg"},
            "presentation": {"target_schema": "health-id", "mandatory": ["family_name"]}
        }))
        .expect("should deserialize")
    }

    fn presentation(claims: serde_json::Value) -> VerifiedPresentationClaims {
        VerifiedPresentationClaims::SdJwt {
            pretty_claims: claims.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn presented_claims_override_defaults() {
        let presented = presentation(json!({"given_name": "Erika", "family_name": "Mustermann"}));
        let claims = claims(&template(), Some(&presented)).expect("should build claims");
        assert_eq!(
            serde_json::Value::Object(claims),
            json!({"given_name": "Erika", "family_name": "Mustermann", "insurer": "Zorg"})
        );
    }

    #[test]
    fn mandatory_claim() {
        let presented = presentation(json!({"given_name": "Erika"}));
        let err = claims(&template(), Some(&presented)).unwrap_err();
        assert!(matches!(err, Error::MissingClaim(_)));
    }

    #[test]
    fn presentation_required() {
        let err = claims(&template(), None).unwrap_err();
        assert!(matches!(err, Error::PresentationRequired(_)));
    }

    #[test]
    fn ungated_template() {
        let mut template = template();
        template.presentation = None;

        // a presentation is ignored when none is required
        let presented = presentation(json!({"given_name": "Erika"}));
        let claims = claims(&template, Some(&presented)).expect("should build claims");
        assert_eq!(claims, template.claims);
    }

    #[test]
    fn unsupported_schema_propagates() {
        let mut template = template();
        template.presentation = Some(PresentationRequirement {
            target_schema: "library-card".to_string(),
            mandatory: vec![],
        });
        let presented = presentation(json!({"given_name": "Erika"}));
        let err = claims(&template, Some(&presented)).unwrap_err();
        assert_eq!(err, Error::UnsupportedTargetSchema("library-card".to_string()));
    }
}
