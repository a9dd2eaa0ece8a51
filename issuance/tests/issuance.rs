//! Issuance Tests

use interop_issuance::normalize::ISSUER_JURISDICTION;
use interop_issuance::{
    Error, HolderBinding, HttpError as _, Issuance, IssuanceRequest, StatusCode,
    VerifiedPresentationClaims,
};
use serde_json::{Value, json};
use test_utils::{Issuer, Keystore};

const ISSUER: &str = "https://issuance.io";

fn holder() -> Vec<HolderBinding> {
    vec![HolderBinding::Jwk {
        jwk: Keystore::new().public("device"),
    }]
}

fn pid_presentation() -> VerifiedPresentationClaims {
    serde_json::from_value(json!({
        "claimFormat": "sd-jwt",
        "prettyClaims": {
            "given_name": "Erika",
            "family_name": "Mustermann",
            "birthdate": "1984-01-26",
            "place_of_birth": {"locality": "Berlin"},
            "age_equal_or_over": {"18": true},
            "nationalities": ["DE"],
            "issuing_country": "DE",
            "address": {
                "street_address": "Heidestraße 17",
                "postal_code": "51147",
                "locality": "Köln",
                "country": "DE"
            }
        }
    }))
    .expect("should deserialize")
}

fn request(
    session_id: &str, config_id: &str, presentation: Option<VerifiedPresentationClaims>,
) -> IssuanceRequest {
    IssuanceRequest {
        session_id: session_id.to_string(),
        credential_configuration_id: config_id.to_string(),
        holder_binding: holder(),
        verified_presentation: presentation,
    }
}

// Should return the template's claims for immediate signing when the
// configuration is not gated on a presentation.
#[tokio::test]
async fn immediate() {
    let provider = Issuer::new();

    let request = request("session-1", "msisdn-sd-jwt", None);
    let response =
        interop_issuance::handle(ISSUER, request, &provider).await.expect("should issue");
    assert_eq!(response.status, StatusCode::OK);

    let Issuance::Immediate { sign_options } = &response.body else {
        panic!("should be immediate");
    };
    assert_eq!(sign_options.credential_configuration_id, "msisdn-sd-jwt");
    assert_eq!(sign_options.vct.as_deref(), Some("urn:eudi:msisdn:1"));
    assert_eq!(sign_options.holder_binding, holder());
    assert_eq!(sign_options.claims["phone_number"], json!("+31612345678"));

    // immediate issuance leaves no session behind
    assert!(provider.session(ISSUER, "session-1").is_none());
}

// Should normalize presented PID claims into the target credential.
#[tokio::test]
async fn presentation_gated() {
    let provider = Issuer::new();

    let request = request("session-1", "arf-pid-sd-jwt", Some(pid_presentation()));
    let response =
        interop_issuance::handle(ISSUER, request, &provider).await.expect("should issue");

    let sign_options = response.sign_options().expect("should have sign options");
    assert_eq!(
        Value::Object(sign_options.claims.clone()),
        json!({
            "family_name": "Mustermann",
            "given_name": "Erika",
            "birth_date": "1984-01-26",
            "birth_place": "Berlin",
            "age_over_18": true,
            "nationality": ["DE"],
            "resident_address": "Heidestraße 17, 51147, Köln",
            "resident_country": "DE",
            "issuing_country": ISSUER_JURISDICTION
        })
    );
}

// Should reject an unknown configuration before looking at the presentation.
#[tokio::test]
async fn configuration_not_found() {
    let provider = Issuer::new();

    let request = request("session-1", "unknown-credential", Some(pid_presentation()));
    let err = interop_issuance::handle(ISSUER, request, &provider)
        .await
        .expect_err("should not issue");
    assert!(matches!(err, Error::ConfigurationNotFound(_)));
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn holder_binding_required() {
    let provider = Issuer::new();

    let mut request = request("session-1", "msisdn-sd-jwt", None);
    request.holder_binding.clear();
    let err = interop_issuance::handle(ISSUER, request, &provider)
        .await
        .expect_err("should not issue");
    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn presentation_required() {
    let provider = Issuer::new();

    let request = request("session-1", "arf-pid-sd-jwt", None);
    let err = interop_issuance::handle(ISSUER, request, &provider)
        .await
        .expect_err("should not issue");
    assert!(matches!(err, Error::PresentationRequired(_)));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

// Should refuse to issue when a mandatory claim is missing from the
// presentation.
#[tokio::test]
async fn missing_claim() {
    let provider = Issuer::new();

    let VerifiedPresentationClaims::SdJwt { mut pretty_claims } = pid_presentation() else {
        unreachable!()
    };
    pretty_claims.remove("birthdate");
    let presentation = VerifiedPresentationClaims::SdJwt { pretty_claims };

    let request = request("session-1", "arf-pid-sd-jwt", Some(presentation));
    let err = interop_issuance::handle(ISSUER, request, &provider)
        .await
        .expect_err("should not issue");
    assert!(matches!(err, Error::MissingClaim(ref msg) if msg.contains("birth_date")));
}

// Normalizer errors reach the caller unchanged.
#[tokio::test]
async fn unsupported_target_schema() {
    let provider = Issuer::new();

    let request = request("session-1", "library-card", Some(pid_presentation()));
    let err = interop_issuance::handle(ISSUER, request, &provider)
        .await
        .expect_err("should not issue");
    assert_eq!(err, Error::UnsupportedTargetSchema("library-card".to_string()));
}

// Provider failures surface as server errors.
#[tokio::test]
async fn session_store_offline() {
    let provider = Issuer::new();
    provider.set_offline(true);

    let request = request("session-1", "msisdn-sd-jwt", None);
    let err = interop_issuance::handle(ISSUER, request, &provider)
        .await
        .expect_err("should not issue");
    assert!(matches!(err, Error::ServerError(ref msg) if msg.contains("session store offline")));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
