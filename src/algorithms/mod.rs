//! JWE key management algorithm families.
//!
//! Each family module implements one key management strategy from RFC
//! 7518: direct use, ECDH-ES agreement (with optional AES key wrap), RSA
//! CEK encryption, PBES2 password-based wrapping, AES key wrap and
//! AES-GCM key wrap. The `SYMMETRIC_DEFAULT` identifier delegates CEK
//! generation to an external KMS (see [`crate::kms`]).
//!
//! Routing over these families is done by [`crate::key_management::KeyManager`].

pub mod aes_gcm_kw;
pub mod aes_kw;
pub mod content;
pub mod ecdh_es;
pub mod pbes2;
pub mod rsa_es;

pub use content::{ContentEncryption, CEK};

use crate::error::*;

/// JWE key management algorithm identifier ("alg" header value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyManagementAlgorithm {
    /// Direct use of a shared symmetric key as the CEK
    Dir,
    /// ECDH-ES direct key agreement
    EcdhEs,
    /// ECDH-ES key agreement with AES-128 key wrap
    EcdhEsA128KW,
    /// ECDH-ES key agreement with AES-192 key wrap
    EcdhEsA192KW,
    /// ECDH-ES key agreement with AES-256 key wrap
    EcdhEsA256KW,
    /// RSAES-PKCS1-v1_5 (legacy)
    Rsa1_5,
    /// RSAES-OAEP with SHA-1
    RsaOaep,
    /// RSAES-OAEP with SHA-256
    RsaOaep256,
    /// RSAES-OAEP with SHA-384
    RsaOaep384,
    /// RSAES-OAEP with SHA-512
    RsaOaep512,
    /// PBES2 with HMAC-SHA-256 and AES-128 key wrap
    Pbes2Hs256A128KW,
    /// PBES2 with HMAC-SHA-384 and AES-192 key wrap
    Pbes2Hs384A192KW,
    /// PBES2 with HMAC-SHA-512 and AES-256 key wrap
    Pbes2Hs512A256KW,
    /// AES-128 key wrap
    A128KW,
    /// AES-192 key wrap
    A192KW,
    /// AES-256 key wrap
    A256KW,
    /// AES-128-GCM key wrap
    A128GCMKW,
    /// AES-192-GCM key wrap
    A192GCMKW,
    /// AES-256-GCM key wrap
    A256GCMKW,
    /// CEK generation delegated to an external KMS
    SymmetricDefault,
}

impl KeyManagementAlgorithm {
    /// Get the JWE "alg" header value for this algorithm.
    pub fn name(self) -> &'static str {
        match self {
            KeyManagementAlgorithm::Dir => "dir",
            KeyManagementAlgorithm::EcdhEs => "ECDH-ES",
            KeyManagementAlgorithm::EcdhEsA128KW => "ECDH-ES+A128KW",
            KeyManagementAlgorithm::EcdhEsA192KW => "ECDH-ES+A192KW",
            KeyManagementAlgorithm::EcdhEsA256KW => "ECDH-ES+A256KW",
            KeyManagementAlgorithm::Rsa1_5 => "RSA1_5",
            KeyManagementAlgorithm::RsaOaep => "RSA-OAEP",
            KeyManagementAlgorithm::RsaOaep256 => "RSA-OAEP-256",
            KeyManagementAlgorithm::RsaOaep384 => "RSA-OAEP-384",
            KeyManagementAlgorithm::RsaOaep512 => "RSA-OAEP-512",
            KeyManagementAlgorithm::Pbes2Hs256A128KW => "PBES2-HS256+A128KW",
            KeyManagementAlgorithm::Pbes2Hs384A192KW => "PBES2-HS384+A192KW",
            KeyManagementAlgorithm::Pbes2Hs512A256KW => "PBES2-HS512+A256KW",
            KeyManagementAlgorithm::A128KW => "A128KW",
            KeyManagementAlgorithm::A192KW => "A192KW",
            KeyManagementAlgorithm::A256KW => "A256KW",
            KeyManagementAlgorithm::A128GCMKW => "A128GCMKW",
            KeyManagementAlgorithm::A192GCMKW => "A192GCMKW",
            KeyManagementAlgorithm::A256GCMKW => "A256GCMKW",
            KeyManagementAlgorithm::SymmetricDefault => "SYMMETRIC_DEFAULT",
        }
    }

    /// Parse a key management algorithm from its JWE name (case-sensitive).
    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name {
            "dir" => Ok(KeyManagementAlgorithm::Dir),
            "ECDH-ES" => Ok(KeyManagementAlgorithm::EcdhEs),
            "ECDH-ES+A128KW" => Ok(KeyManagementAlgorithm::EcdhEsA128KW),
            "ECDH-ES+A192KW" => Ok(KeyManagementAlgorithm::EcdhEsA192KW),
            "ECDH-ES+A256KW" => Ok(KeyManagementAlgorithm::EcdhEsA256KW),
            "RSA1_5" => Ok(KeyManagementAlgorithm::Rsa1_5),
            "RSA-OAEP" => Ok(KeyManagementAlgorithm::RsaOaep),
            "RSA-OAEP-256" => Ok(KeyManagementAlgorithm::RsaOaep256),
            "RSA-OAEP-384" => Ok(KeyManagementAlgorithm::RsaOaep384),
            "RSA-OAEP-512" => Ok(KeyManagementAlgorithm::RsaOaep512),
            "PBES2-HS256+A128KW" => Ok(KeyManagementAlgorithm::Pbes2Hs256A128KW),
            "PBES2-HS384+A192KW" => Ok(KeyManagementAlgorithm::Pbes2Hs384A192KW),
            "PBES2-HS512+A256KW" => Ok(KeyManagementAlgorithm::Pbes2Hs512A256KW),
            "A128KW" => Ok(KeyManagementAlgorithm::A128KW),
            "A192KW" => Ok(KeyManagementAlgorithm::A192KW),
            "A256KW" => Ok(KeyManagementAlgorithm::A256KW),
            "A128GCMKW" => Ok(KeyManagementAlgorithm::A128GCMKW),
            "A192GCMKW" => Ok(KeyManagementAlgorithm::A192GCMKW),
            "A256GCMKW" => Ok(KeyManagementAlgorithm::A256GCMKW),
            "SYMMETRIC_DEFAULT" => Ok(KeyManagementAlgorithm::SymmetricDefault),
            _ => bail!(JWEError::AlgorithmNotSupported(name.to_string())),
        }
    }

    /// KEK size in bytes for the AES key wrapping step, for algorithms
    /// that wrap with RFC 3394 AES-KW.
    pub(crate) fn aes_kw_key_size(self) -> Option<usize> {
        match self {
            KeyManagementAlgorithm::EcdhEsA128KW
            | KeyManagementAlgorithm::Pbes2Hs256A128KW
            | KeyManagementAlgorithm::A128KW => Some(16),
            KeyManagementAlgorithm::EcdhEsA192KW
            | KeyManagementAlgorithm::Pbes2Hs384A192KW
            | KeyManagementAlgorithm::A192KW => Some(24),
            KeyManagementAlgorithm::EcdhEsA256KW
            | KeyManagementAlgorithm::Pbes2Hs512A256KW
            | KeyManagementAlgorithm::A256KW => Some(32),
            _ => None,
        }
    }

    /// KEK size in bytes for the AES-GCM key wrapping algorithms.
    pub(crate) fn aes_gcm_kw_key_size(self) -> Option<usize> {
        match self {
            KeyManagementAlgorithm::A128GCMKW => Some(16),
            KeyManagementAlgorithm::A192GCMKW => Some(24),
            KeyManagementAlgorithm::A256GCMKW => Some(32),
            _ => None,
        }
    }
}

impl std::fmt::Display for KeyManagementAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
