//! # MAC Verification
//!
//! Device MACs are keyed from an ECDH shared secret between the verifier's
//! stored key and the device's public key. Two key derivations are in use and
//! a caller picks exactly one per protocol version.

use base64ct::{Base64UrlUnpadded, Encoding};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use p256::ecdh::diffie_hellman;
use p256::{PublicKey, SecretKey};
use sha2::Sha256;
use tracing::{debug, instrument};

use crate::jwk::PublicKeyJwk;
use crate::provider::{KeyRef, KeyStore};
use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// HKDF `info` for the derived-key variant.
const DVS_INFO: &[u8] = b"DVS-1";
const DERIVED_KEY_LEN: usize = 32;

/// How the MAC key is obtained from the ECDH shared secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MacDerivation {
    /// HMAC-SHA256 keyed directly with the raw shared secret.
    Direct,

    /// HMAC-SHA256 keyed with HKDF-SHA256(shared secret), empty salt,
    /// info `"DVS-1"`, 32-byte output.
    Hkdf,
}

/// Wire encoding of the MAC value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MacEncoding {
    /// Unpadded base64url.
    #[default]
    Base64Url,

    /// Lowercase hexadecimal.
    Hex,
}

impl MacEncoding {
    fn encode(self, mac: &[u8]) -> String {
        match self {
            Self::Base64Url => Base64UrlUnpadded::encode_string(mac),
            Self::Hex => hex::encode(mac),
        }
    }

    fn decode(self, mac: &str) -> Option<Vec<u8>> {
        match self {
            Self::Base64Url => Base64UrlUnpadded::decode_vec(mac).ok(),
            Self::Hex => hex::decode(mac).ok(),
        }
    }
}

/// Computes and verifies device MACs for a single derivation and encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MacVerifier {
    derivation: MacDerivation,
    encoding: MacEncoding,
}

impl MacVerifier {
    /// Create a verifier using `derivation` and base64url-encoded MACs.
    #[must_use]
    pub const fn new(derivation: MacDerivation) -> Self {
        Self {
            derivation,
            encoding: MacEncoding::Base64Url,
        }
    }

    /// Set the MAC wire encoding.
    #[must_use]
    pub const fn encoding(mut self, encoding: MacEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// The derivation this verifier applies.
    #[must_use]
    pub const fn derivation(&self) -> MacDerivation {
        self.derivation
    }

    /// Verify `mac` over `message` using the stored key `my_key` and the
    /// counterpart's public key.
    ///
    /// Returns `Ok(false)` when the MAC does not match or cannot be decoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] when no key is stored under `my_key`,
    /// [`Error::MalformedKey`] when either key cannot be decoded, and
    /// [`Error::Storage`] when the key store fails.
    #[instrument(level = "debug", skip(self, keystore, their_key, mac, message))]
    pub async fn verify(
        &self, keystore: &impl KeyStore, my_key: &KeyRef, their_key: &PublicKeyJwk, mac: &str,
        message: &[u8],
    ) -> Result<bool> {
        let secret = fetch_secret(keystore, my_key).await?;
        let public = their_key.public_key()?;
        let keyed = self.keyed_mac(&secret, &public)?;

        let Some(mac) = self.encoding.decode(mac) else {
            debug!("mac is not valid {:?}", self.encoding);
            return Ok(false);
        };

        // constant-time comparison
        let verified = keyed.chain_update(message).verify_slice(&mac).is_ok();
        debug!(verified, derivation = ?self.derivation);
        Ok(verified)
    }

    /// Compute the encoded MAC over `message`, as a device holding `my_key`
    /// would when responding to the holder of `their_key`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`MacVerifier::verify`].
    pub async fn compute(
        &self, keystore: &impl KeyStore, my_key: &KeyRef, their_key: &PublicKeyJwk,
        message: &[u8],
    ) -> Result<String> {
        let secret = fetch_secret(keystore, my_key).await?;
        let public = their_key.public_key()?;
        let keyed = self.keyed_mac(&secret, &public)?;
        let tag = keyed.chain_update(message).finalize().into_bytes();
        Ok(self.encoding.encode(&tag))
    }

    fn keyed_mac(&self, secret: &SecretKey, public: &PublicKey) -> Result<HmacSha256> {
        let shared = diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
        let ikm = shared.raw_secret_bytes().as_slice();

        let mac = match self.derivation {
            MacDerivation::Direct => HmacSha256::new_from_slice(ikm),
            MacDerivation::Hkdf => {
                let mut okm = [0u8; DERIVED_KEY_LEN];
                Hkdf::<Sha256>::new(None, ikm)
                    .expand(DVS_INFO, &mut okm)
                    .map_err(|e| Error::MalformedKey(format!("HKDF expand failed: {e}")))?;
                HmacSha256::new_from_slice(&okm)
            }
        };
        mac.map_err(|e| Error::MalformedKey(format!("invalid MAC key: {e}")))
    }
}

async fn fetch_secret(keystore: &impl KeyStore, key_ref: &KeyRef) -> Result<SecretKey> {
    let jwk = keystore
        .secret(&key_ref.scope, &key_ref.key_id)
        .await
        .map_err(|e| Error::Storage(e.to_string()))?
        .ok_or_else(|| Error::KeyNotFound(key_ref.key_id.clone()))?;
    jwk.secret_key()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwk::PrivateKeyJwk;

    #[derive(Clone)]
    struct Single(PrivateKeyJwk);

    impl KeyStore for Single {
        async fn secret(&self, _: &str, key_id: &str) -> anyhow::Result<Option<PrivateKeyJwk>> {
            Ok((key_id == "device").then(|| self.0.clone()))
        }
    }

    fn keys() -> (SecretKey, SecretKey) {
        let mine = SecretKey::from_slice(&[1u8; 32]).expect("valid scalar");
        let theirs = SecretKey::from_slice(&[2u8; 32]).expect("valid scalar");
        (mine, theirs)
    }

    // MAC computed independently from the counterpart's side of the exchange.
    fn reference_mac(derivation: MacDerivation, message: &[u8]) -> Vec<u8> {
        let (mine, theirs) = keys();
        let shared = diffie_hellman(theirs.to_nonzero_scalar(), mine.public_key().as_affine());
        let ikm = shared.raw_secret_bytes().to_vec();
        let key = match derivation {
            MacDerivation::Direct => ikm,
            MacDerivation::Hkdf => {
                let mut okm = [0u8; 32];
                Hkdf::<Sha256>::new(Some(b"".as_slice()), &ikm).expand(b"DVS-1", &mut okm).unwrap();
                okm.to_vec()
            }
        };
        let mut mac = HmacSha256::new_from_slice(&key).unwrap();
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }

    #[tokio::test]
    async fn both_derivations() {
        let (mine, theirs) = keys();
        let store = Single(PrivateKeyJwk::from(&mine));
        let key_ref = KeyRef::new("verifier", "device");
        let their_jwk = PublicKeyJwk::from(&theirs.public_key());
        let message = b"device authentication transcript";

        for derivation in [MacDerivation::Direct, MacDerivation::Hkdf] {
            let mac = Base64UrlUnpadded::encode_string(&reference_mac(derivation, message));
            let verifier = MacVerifier::new(derivation);
            let verified = verifier
                .verify(&store, &key_ref, &their_jwk, &mac, message)
                .await
                .expect("should verify");
            assert!(verified, "{derivation:?}");
        }
    }

    #[tokio::test]
    async fn derivations_do_not_mix() {
        let (mine, theirs) = keys();
        let store = Single(PrivateKeyJwk::from(&mine));
        let key_ref = KeyRef::new("verifier", "device");
        let their_jwk = PublicKeyJwk::from(&theirs.public_key());
        let message = b"transcript";

        let direct = reference_mac(MacDerivation::Direct, message);
        let direct = Base64UrlUnpadded::encode_string(&direct);
        let verified = MacVerifier::new(MacDerivation::Hkdf)
            .verify(&store, &key_ref, &their_jwk, &direct, message)
            .await
            .expect("should verify");
        assert!(!verified);
    }

    #[tokio::test]
    async fn hex_encoding() {
        let (mine, theirs) = keys();
        let store = Single(PrivateKeyJwk::from(&mine));
        let key_ref = KeyRef::new("verifier", "device");
        let their_jwk = PublicKeyJwk::from(&theirs.public_key());

        let mac = hex::encode(reference_mac(MacDerivation::Hkdf, b"msg"));
        let verifier = MacVerifier::new(MacDerivation::Hkdf).encoding(MacEncoding::Hex);
        assert!(verifier.verify(&store, &key_ref, &their_jwk, &mac, b"msg").await.unwrap());

        // base64url input to a hex verifier does not decode
        assert!(!verifier.verify(&store, &key_ref, &their_jwk, "not hex!", b"msg").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_key() {
        let (mine, theirs) = keys();
        let store = Single(PrivateKeyJwk::from(&mine));
        let their_jwk = PublicKeyJwk::from(&theirs.public_key());

        let err = MacVerifier::new(MacDerivation::Direct)
            .verify(&store, &KeyRef::new("verifier", "missing"), &their_jwk, "AAAA", b"msg")
            .await
            .unwrap_err();
        assert_eq!(err, Error::KeyNotFound("missing".to_string()));
    }
}
