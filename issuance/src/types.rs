//! # Issuance Types

use std::collections::BTreeMap;

use interop_binding::PublicKeyJwk;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized claim set for a target credential, keyed by target claim name.
pub type ClaimRecord = Map<String, Value>;

/// Claims extracted from a previously verified presentation, tagged by the
/// format of the presented credential.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "claimFormat")]
pub enum VerifiedPresentationClaims {
    /// SD-JWT "pretty" claims: the nested claim object after selective
    /// disclosures have been applied.
    #[serde(rename = "sd-jwt")]
    SdJwt {
        /// Disclosed claims.
        #[serde(rename = "prettyClaims")]
        pretty_claims: Map<String, Value>,
    },

    /// mdoc issuer-signed elements, keyed by namespace then element
    /// identifier.
    #[serde(rename = "mdoc")]
    Mdoc {
        /// Disclosed elements by namespace.
        #[serde(rename = "issuerSignedNamespaces")]
        namespaces: BTreeMap<String, Map<String, Value>>,
    },
}

/// Credential formats the issuer signs.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum CredentialFormat {
    /// IETF SD-JWT VC.
    #[default]
    #[serde(rename = "dc+sd-jwt")]
    DcSdJwt,

    /// ISO/IEC 18013-5 mdoc.
    #[serde(rename = "mso_mdoc")]
    MsoMdoc,

    /// W3C Verifiable Credential secured as a JWT.
    #[serde(rename = "jwt_vc_json")]
    JwtVcJson,
}

/// Static issuance template for one credential configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CredentialTemplate {
    /// The `credential_configuration_id` the template is registered under.
    pub id: String,

    /// Format of the issued credential.
    pub format: CredentialFormat,

    /// mdoc document type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctype: Option<String>,

    /// SD-JWT VC type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vct: Option<String>,

    /// Default claim values, overridden by claims taken from a presentation.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub claims: Map<String, Value>,

    /// Set when issuance is gated on a verified presentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation: Option<PresentationRequirement>,

    /// Seconds to withhold signing after the initial request. Issuance is
    /// immediate when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferred_issuance: Option<u32>,
}

/// The presentation a credential configuration requires before issuance.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PresentationRequirement {
    /// Claim normalizer schema mapping presented claims to this credential.
    pub target_schema: String,

    /// Normalized claims that must be present for issuance to proceed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mandatory: Vec<String>,
}

/// Key the issued credential is bound to.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum HolderBinding {
    /// Bind to a public key.
    Jwk {
        /// The holder's public key.
        jwk: PublicKeyJwk,
    },

    /// Bind to a DID verification method.
    Did {
        /// DID URL of the verification method.
        did_url: String,
    },
}

/// Everything the signer needs to produce the credential. Computed once per
/// issuance and never modified afterwards.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct SignOptions {
    /// Credential configuration being issued.
    pub credential_configuration_id: String,

    /// Format of the credential.
    pub format: CredentialFormat,

    /// mdoc document type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctype: Option<String>,

    /// SD-JWT VC type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vct: Option<String>,

    /// Keys to bind issued credentials to, one credential per key.
    pub holder_binding: Vec<HolderBinding>,

    /// Final claim set.
    pub claims: ClaimRecord,
}

/// Request to issue a credential within an issuance session.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuanceRequest {
    /// Issuance session the request belongs to.
    pub session_id: String,

    /// Credential configuration to issue.
    pub credential_configuration_id: String,

    /// Holder keys to bind issued credentials to.
    pub holder_binding: Vec<HolderBinding>,

    /// Claims from a presentation verified earlier in the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_presentation: Option<VerifiedPresentationClaims>,
}

/// Request to poll a deferred issuance transaction.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct DeferredRequest {
    /// Issuance session the transaction belongs to.
    pub session_id: String,

    /// Transaction id returned when issuance was deferred.
    pub transaction_id: String,
}

/// Outcome of an issuance request or deferred poll.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Issuance {
    /// Sign now.
    Immediate {
        /// Sign input.
        sign_options: SignOptions,
    },

    /// Signing is withheld. Poll again after `interval` seconds.
    Deferred {
        /// Identifies the deferred transaction.
        transaction_id: String,

        /// Seconds to wait before polling.
        interval: i64,
    },

    /// The deferral window has elapsed. Sign the input frozen at the initial
    /// request.
    Resolved {
        /// Sign input.
        sign_options: SignOptions,
    },
}

impl Issuance {
    /// Sign input when the issuance is ready to sign.
    #[must_use]
    pub const fn sign_options(&self) -> Option<&SignOptions> {
        match self {
            Self::Immediate { sign_options } | Self::Resolved { sign_options } => {
                Some(sign_options)
            }
            Self::Deferred { .. } => None,
        }
    }
}
