//! # Claim Normalizer
//!
//! Maps the claims of a verified presentation onto the claim set of the
//! credential being issued. Each supported target schema is a projection
//! table (see `projection.rs`); the presentation format only changes where a
//! source value is read from.
//!
//! A source claim that is absent yields an absent target claim. Deciding
//! whether that blocks issuance is left to the caller.

mod projection;

use std::fmt::{self, Display};
use std::str::FromStr;

use serde_json::{Map, Value};

use self::projection::{COMPOSITE_SEPARATOR, Claim, Field, Source};
pub use self::projection::{ISSUER_JURISDICTION, PID_NAMESPACE};
use crate::Error;
use crate::types::{ClaimRecord, VerifiedPresentationClaims};

/// Normalize presented claims into the claim record for `target_schema`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedTargetSchema`] when `target_schema` is not one
/// of the [`TargetSchema`] identifiers.
pub fn normalize(
    source: &VerifiedPresentationClaims, target_schema: &str,
) -> Result<ClaimRecord, Error> {
    let schema = TargetSchema::from_str(target_schema)?;
    Ok(schema.project(source))
}

/// Credential claim schemas presented claims can be normalized into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetSchema {
    /// Mobile driving licence.
    DriversLicense,

    /// EU ARF person identification data.
    ArfPid,

    /// Tax identification.
    TaxId,

    /// Certificate of residence.
    CertificateOfResidence,

    /// Health insurance identification.
    HealthId,

    /// Mobile subscriber number.
    Msisdn,
}

impl TargetSchema {
    /// Every supported schema.
    pub const ALL: [Self; 6] = [
        Self::DriversLicense,
        Self::ArfPid,
        Self::TaxId,
        Self::CertificateOfResidence,
        Self::HealthId,
        Self::Msisdn,
    ];

    /// Schema identifier as used in credential templates.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::DriversLicense => "mdl",
            Self::ArfPid => "arf-pid",
            Self::TaxId => "tax-id",
            Self::CertificateOfResidence => "certificate-of-residence",
            Self::HealthId => "health-id",
            Self::Msisdn => "msisdn",
        }
    }

    /// Target claims this schema can produce, in projection order.
    pub fn targets(self) -> impl Iterator<Item = &'static str> {
        self.fields().iter().map(|field| field.target)
    }

    /// Apply the schema's projection to presented claims.
    #[must_use]
    pub fn project(self, source: &VerifiedPresentationClaims) -> ClaimRecord {
        let mut record = Map::new();
        for field in self.fields() {
            if let Some(value) = resolve(&field.source, source) {
                record.insert(field.target.to_string(), value);
            }
        }
        record
    }

    const fn fields(self) -> &'static [Field] {
        match self {
            Self::DriversLicense => projection::DRIVERS_LICENSE,
            Self::ArfPid => projection::ARF_PID,
            Self::TaxId => projection::TAX_ID,
            Self::CertificateOfResidence => projection::CERTIFICATE_OF_RESIDENCE,
            Self::HealthId => projection::HEALTH_ID,
            Self::Msisdn => projection::MSISDN,
        }
    }
}

impl FromStr for TargetSchema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|schema| schema.id() == s)
            .ok_or_else(|| Error::UnsupportedTargetSchema(s.to_string()))
    }
}

impl Display for TargetSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

fn resolve(source: &Source, claims: &VerifiedPresentationClaims) -> Option<Value> {
    match source {
        Source::Claim(claim) => read(claim, claims).cloned(),
        Source::Composite(parts) => {
            let parts = parts
                .iter()
                .filter_map(|part| read(part, claims))
                .filter_map(as_text)
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>();
            (!parts.is_empty()).then(|| Value::String(parts.join(COMPOSITE_SEPARATOR)))
        }
        Source::Jurisdiction => Some(Value::String(ISSUER_JURISDICTION.to_string())),
    }
}

// Null values are treated as absent.
fn read<'a>(claim: &Claim, claims: &'a VerifiedPresentationClaims) -> Option<&'a Value> {
    let value = match claims {
        VerifiedPresentationClaims::SdJwt { pretty_claims } => {
            let (first, rest) = claim.sd_jwt.split_first()?;
            rest.iter().try_fold(pretty_claims.get(*first)?, |value, key| value.get(*key))?
        }
        VerifiedPresentationClaims::Mdoc { namespaces } => {
            let (namespace, element) = claim.mdoc;
            namespaces.get(namespace)?.get(element)?
        }
    };
    (!value.is_null()).then_some(value)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
