//! # P-256 JSON Web Keys
//!
//! Only the EC P-256 key type is supported.

use base64ct::{Base64UrlUnpadded, Encoding};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const KTY_EC: &str = "EC";
const CRV_P256: &str = "P-256";
const COORD_LEN: usize = 32;

/// Uncompressed SEC1 point tag.
const SEC1_UNCOMPRESSED: u8 = 0x04;

/// Public P-256 key as a JWK.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PublicKeyJwk {
    /// Key type, always `EC`.
    pub kty: String,

    /// Curve, always `P-256`.
    pub crv: String,

    /// Base64url-encoded x coordinate.
    pub x: String,

    /// Base64url-encoded y coordinate.
    pub y: String,
}

impl PublicKeyJwk {
    /// Decode into a curve point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedKey`] when the key is not an EC P-256 key,
    /// a coordinate is not 32 base64url-encoded bytes, or the point is not on
    /// the curve.
    pub fn public_key(&self) -> Result<PublicKey> {
        if self.kty != KTY_EC || self.crv != CRV_P256 {
            return Err(Error::MalformedKey(format!(
                "unsupported key type {}/{}",
                self.kty, self.crv
            )));
        }

        let mut sec1 = Vec::with_capacity(1 + 2 * COORD_LEN);
        sec1.push(SEC1_UNCOMPRESSED);
        sec1.extend(coordinate("x", &self.x)?);
        sec1.extend(coordinate("y", &self.y)?);

        PublicKey::from_sec1_bytes(&sec1)
            .map_err(|_| Error::MalformedKey("point is not on the P-256 curve".to_string()))
    }
}

impl From<&PublicKey> for PublicKeyJwk {
    fn from(key: &PublicKey) -> Self {
        let point = key.to_encoded_point(false);
        let encode = |c: Option<&p256::FieldBytes>| {
            c.map(|bytes| Base64UrlUnpadded::encode_string(bytes)).unwrap_or_default()
        };
        Self {
            kty: KTY_EC.to_string(),
            crv: CRV_P256.to_string(),
            x: encode(point.x()),
            y: encode(point.y()),
        }
    }
}

/// Private P-256 key as stored by a key store. The private scalar is held in
/// `d`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PrivateKeyJwk {
    /// Public portion of the key.
    #[serde(flatten)]
    pub public: PublicKeyJwk,

    /// Base64url-encoded private scalar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

impl PrivateKeyJwk {
    /// Decode the private scalar.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedKey`] when `d` is absent or is not a valid
    /// P-256 scalar.
    pub fn secret_key(&self) -> Result<SecretKey> {
        let Some(d) = &self.d else {
            return Err(Error::MalformedKey("missing private scalar `d`".to_string()));
        };
        let bytes = Base64UrlUnpadded::decode_vec(d)
            .map_err(|e| Error::MalformedKey(format!("issue decoding `d`: {e}")))?;
        SecretKey::from_slice(&bytes)
            .map_err(|_| Error::MalformedKey("`d` is not a valid P-256 scalar".to_string()))
    }
}

impl From<&SecretKey> for PrivateKeyJwk {
    fn from(key: &SecretKey) -> Self {
        Self {
            public: PublicKeyJwk::from(&key.public_key()),
            d: Some(Base64UrlUnpadded::encode_string(&key.to_bytes())),
        }
    }
}

fn coordinate(name: &str, encoded: &str) -> Result<Vec<u8>> {
    let bytes = Base64UrlUnpadded::decode_vec(encoded)
        .map_err(|e| Error::MalformedKey(format!("issue decoding `{name}`: {e}")))?;
    if bytes.len() != COORD_LEN {
        return Err(Error::MalformedKey(format!("`{name}` must be {COORD_LEN} bytes")));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn secret() -> SecretKey {
        SecretKey::from_slice(&[7u8; 32]).expect("should be a valid scalar")
    }

    #[test]
    fn public_roundtrip() {
        let key = secret().public_key();
        let jwk = PublicKeyJwk::from(&key);
        assert_eq!(jwk.kty, "EC");
        assert_eq!(jwk.crv, "P-256");
        assert_eq!(jwk.public_key().expect("should decode"), key);
    }

    #[test]
    fn private_roundtrip() {
        let jwk = PrivateKeyJwk::from(&secret());
        assert_eq!(jwk.secret_key().expect("should decode").to_bytes(), secret().to_bytes());

        let value = serde_json::to_value(&jwk).expect("should serialize");
        assert_eq!(value["kty"], "EC");
        assert!(value["d"].is_string());
    }

    #[test]
    fn missing_scalar() {
        let jwk = PrivateKeyJwk {
            public: PublicKeyJwk::from(&secret().public_key()),
            d: None,
        };
        assert!(matches!(jwk.secret_key(), Err(Error::MalformedKey(_))));
    }

    #[test]
    fn wrong_curve() {
        let mut jwk = PublicKeyJwk::from(&secret().public_key());
        jwk.crv = "secp256k1".to_string();
        assert!(matches!(jwk.public_key(), Err(Error::MalformedKey(_))));
    }

    #[test]
    fn off_curve_point() {
        let mut jwk = PublicKeyJwk::from(&secret().public_key());
        jwk.y = jwk.x.clone();
        assert!(matches!(jwk.public_key(), Err(Error::MalformedKey(_))));
    }

    #[test]
    fn short_coordinate() {
        let jwk: PublicKeyJwk = serde_json::from_value(json!({
            "kty": "EC", "crv": "P-256", "x": "AAAA", "y": "AAAA"
        }))
        .expect("should deserialize");
        assert!(matches!(jwk.public_key(), Err(Error::MalformedKey(_))));
    }
}
