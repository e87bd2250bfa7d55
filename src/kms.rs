//! External key-management-service delegation.
//!
//! The `SYMMETRIC_DEFAULT` algorithm hands CEK generation to a remote
//! service holding the master key: the service returns a fresh data key
//! in both plaintext and encrypted form, and the master key never leaves
//! it. Implementations of [`KmsAccessor`] adapt a vendor client (e.g.
//! AWS KMS `GenerateDataKey`) and are injected into the dispatcher.

use crate::algorithms::ContentEncryption;
use crate::error::*;

/// Data key specification requested from the KMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KmsKeySpec {
    /// 128-bit AES data key
    Aes128,
    /// 256-bit AES data key
    Aes256,
}

impl KmsKeySpec {
    /// Map a content encryption algorithm to the data key spec to request.
    ///
    /// Only CEK sizes a KMS can mint as AES data keys are delegatable.
    pub fn for_content_encryption(enc: ContentEncryption) -> Result<Self, Error> {
        match enc.key_size() {
            16 => Ok(KmsKeySpec::Aes128),
            32 => Ok(KmsKeySpec::Aes256),
            _ => bail!(JWEError::UnsupportedContentEncryption(
                enc.alg_name().to_string()
            )),
        }
    }

    /// The requested key size in bytes.
    pub fn key_size(self) -> usize {
        match self {
            KmsKeySpec::Aes128 => 16,
            KmsKeySpec::Aes256 => 32,
        }
    }
}

/// Raw response of a KMS data key generation call.
///
/// Mirrors the wire contract: both fields are required for a usable
/// response, but transports may omit either; the dispatcher treats
/// absence as a contract violation by the service.
#[derive(Debug, Default)]
pub struct KmsDataKey {
    /// The plaintext data key, used as the CEK
    pub plaintext: Option<Vec<u8>>,
    /// The data key encrypted under the service's master key
    pub ciphertext_blob: Option<Vec<u8>>,
}

/// Access to an external key-management service.
///
/// Every call is a fresh service round-trip: no caching, no internal
/// retries. Transient failures surface to the caller, which owns any
/// retry policy.
pub trait KmsAccessor: Send + Sync {
    /// Generate a data key under the master key named by `key_id`,
    /// matching `key_spec`.
    fn generate_data_key(&self, key_id: &str, key_spec: KmsKeySpec) -> Result<KmsDataKey, Error>;
}
