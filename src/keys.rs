//! Recipient key material for JWE key management.
//!
//! A [`RecipientKey`] is the single key reference the dispatcher routes
//! on: in-memory asymmetric key material, a raw symmetric secret, or an
//! opaque external key identifier resolved through a KMS accessor.

use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::pkcs8::DecodePublicKey;
use rand::{thread_rng, RngCore};
use rsa::traits::PublicKeyParts;
use serde_json::json;
use zeroize::{Zeroize, Zeroizing};

use crate::error::*;

const MIN_RSA_MODULUS_BITS: usize = 2048;

/// Elliptic curve supported for ECDH-ES key agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcCurve {
    P256,
    P384,
}

impl EcCurve {
    /// The JWK "crv" value.
    pub fn name(self) -> &'static str {
        match self {
            EcCurve::P256 => "P-256",
            EcCurve::P384 => "P-384",
        }
    }
}

/// Recipient public key for ECDH-ES over P-256 or P-384.
#[derive(Debug, Clone)]
pub enum EcPublicKey {
    P256(p256::PublicKey),
    P384(p384::PublicKey),
}

impl EcPublicKey {
    /// Create from SEC1-encoded P-256 bytes (compressed or uncompressed).
    pub fn from_p256_sec1(bytes: &[u8]) -> Result<Self, Error> {
        let point = p256::EncodedPoint::from_bytes(bytes).map_err(|_| JWEError::InvalidPublicKey)?;
        let pk = p256::PublicKey::from_encoded_point(&point);
        if pk.is_none().into() {
            bail!(JWEError::InvalidPublicKey);
        }
        Ok(EcPublicKey::P256(pk.unwrap()))
    }

    /// Create from SEC1-encoded P-384 bytes (compressed or uncompressed).
    pub fn from_p384_sec1(bytes: &[u8]) -> Result<Self, Error> {
        let point = p384::EncodedPoint::from_bytes(bytes).map_err(|_| JWEError::InvalidPublicKey)?;
        let pk = p384::PublicKey::from_encoded_point(&point);
        if pk.is_none().into() {
            bail!(JWEError::InvalidPublicKey);
        }
        Ok(EcPublicKey::P384(pk.unwrap()))
    }

    /// Create from a DER-encoded public key; the curve is taken from the key.
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        if let Ok(pk) = p256::PublicKey::from_public_key_der(der) {
            return Ok(EcPublicKey::P256(pk));
        }
        let pk = p384::PublicKey::from_public_key_der(der).map_err(|_| JWEError::InvalidPublicKey)?;
        Ok(EcPublicKey::P384(pk))
    }

    /// Create from a PEM-encoded public key; the curve is taken from the key.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        if let Ok(pk) = p256::PublicKey::from_public_key_pem(pem) {
            return Ok(EcPublicKey::P256(pk));
        }
        let pk = p384::PublicKey::from_public_key_pem(pem).map_err(|_| JWEError::InvalidPublicKey)?;
        Ok(EcPublicKey::P384(pk))
    }

    /// The curve this key lives on.
    pub fn curve(&self) -> EcCurve {
        match self {
            EcPublicKey::P256(_) => EcCurve::P256,
            EcPublicKey::P384(_) => EcCurve::P384,
        }
    }

    /// Export as SEC1 uncompressed bytes.
    pub fn to_bytes_uncompressed(&self) -> Vec<u8> {
        match self {
            EcPublicKey::P256(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
            EcPublicKey::P384(pk) => pk.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    /// Build the "epk" header value: a public JWK with kty/crv/x/y.
    pub(crate) fn to_epk(&self) -> serde_json::Value {
        match self {
            EcPublicKey::P256(pk) => {
                let point = pk.to_encoded_point(false);
                let x = Base64UrlSafeNoPadding::encode_to_string(point.x().unwrap()).unwrap();
                let y = Base64UrlSafeNoPadding::encode_to_string(point.y().unwrap()).unwrap();
                json!({ "kty": "EC", "crv": "P-256", "x": x, "y": y })
            }
            EcPublicKey::P384(pk) => {
                let point = pk.to_encoded_point(false);
                let x = Base64UrlSafeNoPadding::encode_to_string(point.x().unwrap()).unwrap();
                let y = Base64UrlSafeNoPadding::encode_to_string(point.y().unwrap()).unwrap();
                json!({ "kty": "EC", "crv": "P-384", "x": x, "y": y })
            }
        }
    }
}

/// Ephemeral key pair for ECDH-ES.
///
/// Generated per encryption operation unless the caller supplies one.
#[derive(Clone)]
pub enum EcEphemeralKey {
    P256(p256::SecretKey),
    P384(p384::SecretKey),
}

impl std::fmt::Debug for EcEphemeralKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcEphemeralKey")
            .field("crv", &self.curve().name())
            .finish_non_exhaustive()
    }
}

impl EcEphemeralKey {
    /// Generate a fresh ephemeral key pair on the given curve.
    pub fn generate(curve: EcCurve) -> Self {
        match curve {
            EcCurve::P256 => EcEphemeralKey::P256(p256::SecretKey::random(&mut thread_rng())),
            EcCurve::P384 => EcEphemeralKey::P384(p384::SecretKey::random(&mut thread_rng())),
        }
    }

    /// Create from raw scalar bytes.
    pub fn from_bytes(curve: EcCurve, bytes: &[u8]) -> Result<Self, Error> {
        match curve {
            EcCurve::P256 => {
                let sk = p256::SecretKey::from_slice(bytes).map_err(|_| JWEError::InvalidKeyPair)?;
                Ok(EcEphemeralKey::P256(sk))
            }
            EcCurve::P384 => {
                let sk = p384::SecretKey::from_slice(bytes).map_err(|_| JWEError::InvalidKeyPair)?;
                Ok(EcEphemeralKey::P384(sk))
            }
        }
    }

    /// The curve this key pair lives on.
    pub fn curve(&self) -> EcCurve {
        match self {
            EcEphemeralKey::P256(_) => EcCurve::P256,
            EcEphemeralKey::P384(_) => EcCurve::P384,
        }
    }

    /// Get the ephemeral public key.
    pub fn public_key(&self) -> EcPublicKey {
        match self {
            EcEphemeralKey::P256(sk) => EcPublicKey::P256(sk.public_key()),
            EcEphemeralKey::P384(sk) => EcPublicKey::P384(sk.public_key()),
        }
    }

    /// Compute the ECDH shared secret against a static recipient key.
    pub(crate) fn diffie_hellman(&self, pk: &EcPublicKey) -> Result<Zeroizing<Vec<u8>>, Error> {
        match (self, pk) {
            (EcEphemeralKey::P256(sk), EcPublicKey::P256(pk)) => {
                let shared = p256::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
                Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
            }
            (EcEphemeralKey::P384(sk), EcPublicKey::P384(pk)) => {
                let shared = p384::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
                Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
            }
            _ => bail!(JWEError::EphemeralKeyMismatch),
        }
    }
}

/// RSA public key for CEK encryption (RSA1_5 and the RSA-OAEP family).
#[derive(Debug, Clone)]
pub struct RsaEncryptionKey {
    pk: rsa::RsaPublicKey,
}

impl RsaEncryptionKey {
    /// Create from an `rsa` crate public key.
    pub fn from_public_key(pk: rsa::RsaPublicKey) -> Result<Self, Error> {
        Self::validate_key_size(&pk)?;
        Ok(RsaEncryptionKey { pk })
    }

    /// Create from a DER-encoded (SPKI or PKCS#1) public key.
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let pk = rsa::RsaPublicKey::from_public_key_der(der)
            .or_else(|_| rsa::pkcs1::DecodeRsaPublicKey::from_pkcs1_der(der))
            .map_err(|_: rsa::pkcs1::Error| JWEError::InvalidPublicKey)?;
        Self::from_public_key(pk)
    }

    /// Create from a PEM-encoded (SPKI or PKCS#1) public key.
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        let pk = rsa::RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| rsa::pkcs1::DecodeRsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|_: rsa::pkcs1::Error| JWEError::InvalidPublicKey)?;
        Self::from_public_key(pk)
    }

    fn validate_key_size(pk: &rsa::RsaPublicKey) -> Result<(), Error> {
        let bits = pk.size() * 8;
        ensure!(bits >= MIN_RSA_MODULUS_BITS, JWEError::UnsupportedRSAModulus);
        Ok(())
    }

    pub(crate) fn as_inner(&self) -> &rsa::RsaPublicKey {
        &self.pk
    }
}

/// Raw symmetric secret: an AES key, a KEK, or a PBES2 password.
#[derive(Clone)]
pub struct SymmetricKey {
    key: Vec<u8>,
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("len", &self.key.len())
            .finish_non_exhaustive()
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl SymmetricKey {
    /// Create a key from raw bytes.
    ///
    /// Length requirements are algorithm-specific and enforced at dispatch.
    pub fn from_bytes(key: &[u8]) -> Self {
        SymmetricKey { key: key.to_vec() }
    }

    /// Generate a random key of the given length.
    pub fn generate(len: usize) -> Self {
        let mut key = vec![0u8; len];
        thread_rng().fill_bytes(&mut key);
        SymmetricKey { key }
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

/// Recipient key reference: in-memory key material or an opaque external
/// key identifier.
///
/// The dispatcher's first routing decision is a match on this tag.
#[derive(Debug, Clone)]
pub enum RecipientKey {
    /// Elliptic-curve public key (ECDH-ES families)
    Ec(EcPublicKey),
    /// RSA public key (RSA1_5, RSA-OAEP families)
    Rsa(RsaEncryptionKey),
    /// Raw symmetric secret or password (dir, AES-KW, AES-GCM-KW, PBES2)
    Secret(SymmetricKey),
    /// Opaque external key identifier, resolved by a KMS accessor
    External(String),
}
