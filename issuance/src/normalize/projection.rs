//! Field projections for each target schema.
//!
//! Each table is an ordered list of `(target claim, source accessor)` pairs.
//! Adding a schema means adding a table here and a variant to
//! [`TargetSchema`](super::TargetSchema).

/// Namespace PID elements are read from in mdoc presentations.
pub const PID_NAMESPACE: &str = "eu.europa.ec.eudi.pid.1";

/// Jurisdiction code embedded in the issuer certificate. Claims that must
/// agree with the certificate are always set to this value, whatever the
/// presentation says.
pub const ISSUER_JURISDICTION: &str = "NL";

/// Separator placed between the parts of a composite claim.
pub const COMPOSITE_SEPARATOR: &str = ", ";

/// Where a single claim lives in each source format.
#[derive(Clone, Copy, Debug)]
pub struct Claim {
    /// Path into the SD-JWT pretty claims.
    pub sd_jwt: &'static [&'static str],

    /// `(namespace, element identifier)` in the mdoc.
    pub mdoc: (&'static str, &'static str),
}

/// How a target claim is produced.
#[derive(Clone, Copy, Debug)]
pub enum Source {
    /// Copied from a source claim.
    Claim(Claim),

    /// String parts joined with [`COMPOSITE_SEPARATOR`]. Absent parts are
    /// skipped.
    Composite(&'static [Claim]),

    /// Set to [`ISSUER_JURISDICTION`].
    Jurisdiction,
}

/// One row of a projection table.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    /// Target claim name.
    pub target: &'static str,

    /// Value accessor.
    pub source: Source,
}

const fn pid(sd_jwt: &'static [&'static str], element: &'static str) -> Claim {
    Claim {
        sd_jwt,
        mdoc: (PID_NAMESPACE, element),
    }
}

const fn field(target: &'static str, claim: Claim) -> Field {
    Field {
        target,
        source: Source::Claim(claim),
    }
}

const FAMILY_NAME: Claim = pid(&["family_name"], "family_name");
const GIVEN_NAME: Claim = pid(&["given_name"], "given_name");
const BIRTH_DATE: Claim = pid(&["birthdate"], "birth_date");
const BIRTH_PLACE: Claim = pid(&["place_of_birth", "locality"], "birth_place");
const AGE_OVER_18: Claim = pid(&["age_equal_or_over", "18"], "age_over_18");
const NATIONALITY: Claim = pid(&["nationalities"], "nationality");
const RESIDENT_COUNTRY: Claim = pid(&["address", "country"], "resident_country");

const RESIDENT_ADDRESS_PARTS: &[Claim] = &[
    pid(&["address", "street_address"], "resident_street"),
    pid(&["address", "postal_code"], "resident_postal_code"),
    pid(&["address", "locality"], "resident_city"),
];
const RESIDENT_ADDRESS: Source = Source::Composite(RESIDENT_ADDRESS_PARTS);

const ISSUING_COUNTRY: Field = Field {
    target: "issuing_country",
    source: Source::Jurisdiction,
};

pub const ARF_PID: &[Field] = &[
    field("family_name", FAMILY_NAME),
    field("given_name", GIVEN_NAME),
    field("birth_date", BIRTH_DATE),
    field("birth_place", BIRTH_PLACE),
    field("age_over_18", AGE_OVER_18),
    field("nationality", NATIONALITY),
    Field {
        target: "resident_address",
        source: RESIDENT_ADDRESS,
    },
    field("resident_country", RESIDENT_COUNTRY),
    ISSUING_COUNTRY,
];

pub const DRIVERS_LICENSE: &[Field] = &[
    field("family_name", FAMILY_NAME),
    field("given_name", GIVEN_NAME),
    field("birth_date", BIRTH_DATE),
    Field {
        target: "resident_address",
        source: RESIDENT_ADDRESS,
    },
    ISSUING_COUNTRY,
];

pub const TAX_ID: &[Field] = &[
    field("registered_family_name", FAMILY_NAME),
    field("registered_given_name", GIVEN_NAME),
    field("birth_date", BIRTH_DATE),
    Field {
        target: "resident_address",
        source: RESIDENT_ADDRESS,
    },
    ISSUING_COUNTRY,
];

pub const CERTIFICATE_OF_RESIDENCE: &[Field] = &[
    field("family_name", FAMILY_NAME),
    field("given_name", GIVEN_NAME),
    field("birth_date", BIRTH_DATE),
    field("birth_place", BIRTH_PLACE),
    field("nationality", NATIONALITY),
    Field {
        target: "resident_address",
        source: RESIDENT_ADDRESS,
    },
    field("resident_country", RESIDENT_COUNTRY),
];

pub const HEALTH_ID: &[Field] = &[
    field("family_name", FAMILY_NAME),
    field("given_name", GIVEN_NAME),
    field("birth_date", BIRTH_DATE),
];

pub const MSISDN: &[Field] = &[
    field("registered_family_name", FAMILY_NAME),
    field("registered_given_name", GIVEN_NAME),
];
