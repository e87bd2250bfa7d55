//! Content encryption algorithm identifiers and CEK generation.
//!
//! This module only sizes and generates content encryption keys; the
//! content cipher itself is owned by the encryption orchestrator.

use rand::RngCore;
use zeroize::Zeroize;

use crate::error::*;

/// Content encryption algorithm identifier ("enc" header value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentEncryption {
    /// AES-256-GCM (recommended default)
    #[default]
    A256GCM,
    /// AES-192-GCM
    A192GCM,
    /// AES-128-GCM
    A128GCM,
    /// AES-128-CBC with HMAC-SHA-256
    A128CbcHs256,
    /// AES-192-CBC with HMAC-SHA-384
    A192CbcHs384,
    /// AES-256-CBC with HMAC-SHA-512
    A256CbcHs512,
}

impl ContentEncryption {
    /// Get the JWE "enc" header value for this algorithm.
    pub fn alg_name(&self) -> &'static str {
        match self {
            ContentEncryption::A256GCM => "A256GCM",
            ContentEncryption::A192GCM => "A192GCM",
            ContentEncryption::A128GCM => "A128GCM",
            ContentEncryption::A128CbcHs256 => "A128CBC-HS256",
            ContentEncryption::A192CbcHs384 => "A192CBC-HS384",
            ContentEncryption::A256CbcHs512 => "A256CBC-HS512",
        }
    }

    /// Parse a content encryption algorithm from its JWE name.
    pub fn from_alg_name(name: &str) -> Result<Self, Error> {
        match name {
            "A256GCM" => Ok(ContentEncryption::A256GCM),
            "A192GCM" => Ok(ContentEncryption::A192GCM),
            "A128GCM" => Ok(ContentEncryption::A128GCM),
            "A128CBC-HS256" => Ok(ContentEncryption::A128CbcHs256),
            "A192CBC-HS384" => Ok(ContentEncryption::A192CbcHs384),
            "A256CBC-HS512" => Ok(ContentEncryption::A256CbcHs512),
            _ => bail!(JWEError::UnsupportedContentEncryption(name.to_string())),
        }
    }

    /// Get the required CEK size in bytes.
    ///
    /// The CBC-HMAC composites take a double-length key: one half for
    /// encryption, one half for authentication.
    pub fn key_size(&self) -> usize {
        match self {
            ContentEncryption::A256GCM => 32,
            ContentEncryption::A192GCM => 24,
            ContentEncryption::A128GCM => 16,
            ContentEncryption::A128CbcHs256 => 32,
            ContentEncryption::A192CbcHs384 => 48,
            ContentEncryption::A256CbcHs512 => 64,
        }
    }

    /// Generate a random Content Encryption Key (CEK) for this algorithm.
    pub fn generate_cek(&self) -> CEK {
        let mut cek = vec![0u8; self.key_size()];
        rand::thread_rng().fill_bytes(&mut cek);
        CEK::new(cek)
    }

    /// Take a caller-supplied CEK, or generate a fresh one.
    ///
    /// A supplied CEK must already have the size this algorithm mandates.
    pub(crate) fn cek_or_generate(&self, provided: Option<&[u8]>) -> Result<CEK, Error> {
        match provided {
            Some(cek) => {
                ensure!(cek.len() == self.key_size(), JWEError::InvalidEncryptionKey);
                Ok(CEK::new(cek.to_vec()))
            }
            None => Ok(self.generate_cek()),
        }
    }
}

/// A Content Encryption Key (CEK) that is zeroized on drop.
#[derive(Clone)]
pub struct CEK {
    key: Vec<u8>,
}

impl CEK {
    /// Create a new CEK from bytes.
    pub fn new(key: Vec<u8>) -> Self {
        CEK { key }
    }

    /// Get the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }
}

impl Drop for CEK {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl AsRef<[u8]> for CEK {
    fn as_ref(&self) -> &[u8] {
        &self.key
    }
}

impl std::fmt::Debug for CEK {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CEK")
            .field("len", &self.key.len())
            .finish_non_exhaustive()
    }
}
