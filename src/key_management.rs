//! JWE key management: CEK establishment for every supported "alg".
//!
//! [`KeyManager`] is the single decision point the encryption
//! orchestrator calls: it routes a request to exactly one family
//! strategy (or to the injected KMS accessor), validates key-type
//! compatibility up front, and normalizes every outcome into an
//! [`EncryptedCek`].

use ct_codecs::{Base64UrlSafeNoPadding, Encoder};

use crate::algorithms::{
    aes_gcm_kw, aes_kw, ecdh_es, pbes2, rsa_es, ContentEncryption, KeyManagementAlgorithm, CEK,
};
use crate::error::*;
use crate::jwe_header::JWEHeaderParameters;
use crate::keys::{EcEphemeralKey, RecipientKey};
use crate::kms::{KmsAccessor, KmsKeySpec};

/// Optional caller-supplied key management parameters.
///
/// Every field applies to a subset of algorithms and is ignored by the
/// rest. Fields a strategy requires but the caller left out are
/// generated fresh and echoed back in the result's header parameters.
#[derive(Clone, Debug, Default)]
pub struct KeyManagementOptions {
    /// Ephemeral key pair (ECDH-ES families; generated when absent)
    pub ephemeral_key: Option<EcEphemeralKey>,
    /// Agreement PartyUInfo (ECDH-ES families)
    pub apu: Option<Vec<u8>>,
    /// Agreement PartyVInfo (ECDH-ES families)
    pub apv: Option<Vec<u8>>,
    /// PBES2 iteration count (default 2048)
    pub p2c: Option<u32>,
    /// PBES2 salt input, at least 8 bytes (generated when absent)
    pub p2s: Option<Vec<u8>>,
    /// 96-bit initialization vector (AES-GCM key wrap; generated when absent)
    pub iv: Option<Vec<u8>>,
}

/// Result of key management for one encryption operation.
#[derive(Debug)]
pub struct EncryptedCek {
    /// The content encryption key: passed through, derived, or generated
    pub cek: CEK,
    /// The encrypted CEK; absent for direct use and direct key agreement
    pub encrypted_key: Option<Vec<u8>>,
    /// Header parameters to merge into the protected header
    pub parameters: Option<JWEHeaderParameters>,
}

/// Key management algorithm dispatcher.
///
/// Stateless apart from the optional KMS accessor; a single instance is
/// safe to share across concurrent encryption operations.
#[derive(Default)]
pub struct KeyManager {
    kms_accessor: Option<Box<dyn KmsAccessor>>,
}

impl KeyManager {
    pub fn new() -> Self {
        KeyManager { kms_accessor: None }
    }

    /// Inject a KMS accessor, enabling the `SYMMETRIC_DEFAULT` algorithm.
    pub fn with_kms_accessor(mut self, accessor: impl KmsAccessor + 'static) -> Self {
        self.kms_accessor = Some(Box::new(accessor));
        self
    }

    /// Establish the CEK for one encryption operation.
    ///
    /// Routes on the shape of `key` first: an external reference is only
    /// valid with `SYMMETRIC_DEFAULT` and delegates entirely to the KMS
    /// accessor. For in-memory keys, key-type compatibility is checked
    /// before any cryptographic primitive runs.
    ///
    /// `provided_cek`, when given, must already have the size `enc`
    /// mandates; it is rejected otherwise.
    pub fn encrypt_key(
        &self,
        alg: KeyManagementAlgorithm,
        enc: ContentEncryption,
        key: &RecipientKey,
        provided_cek: Option<&[u8]>,
        options: &KeyManagementOptions,
    ) -> Result<EncryptedCek, Error> {
        if let RecipientKey::External(key_id) = key {
            return self.generate_kms_data_key(alg, enc, key_id);
        }

        check_key_type(alg, key)?;

        match (alg, key) {
            (KeyManagementAlgorithm::Dir, RecipientKey::Secret(secret)) => {
                // Direct encryption: the shared key is the CEK, verbatim.
                ensure!(secret.len() == enc.key_size(), JWEError::InvalidEncryptionKey);
                Ok(EncryptedCek {
                    cek: CEK::new(secret.as_bytes().to_vec()),
                    encrypted_key: None,
                    parameters: None,
                })
            }
            (
                KeyManagementAlgorithm::EcdhEs
                | KeyManagementAlgorithm::EcdhEsA128KW
                | KeyManagementAlgorithm::EcdhEsA192KW
                | KeyManagementAlgorithm::EcdhEsA256KW,
                RecipientKey::Ec(pk),
            ) => ecdh_es::encrypt(alg, enc, pk, provided_cek, options),
            (
                KeyManagementAlgorithm::Rsa1_5
                | KeyManagementAlgorithm::RsaOaep
                | KeyManagementAlgorithm::RsaOaep256
                | KeyManagementAlgorithm::RsaOaep384
                | KeyManagementAlgorithm::RsaOaep512,
                RecipientKey::Rsa(pk),
            ) => {
                let cek = enc.cek_or_generate(provided_cek)?;
                let encrypted_key = rsa_es::encrypt(alg, pk, cek.as_bytes())?;
                Ok(EncryptedCek {
                    cek,
                    encrypted_key: Some(encrypted_key),
                    parameters: None,
                })
            }
            (
                KeyManagementAlgorithm::Pbes2Hs256A128KW
                | KeyManagementAlgorithm::Pbes2Hs384A192KW
                | KeyManagementAlgorithm::Pbes2Hs512A256KW,
                RecipientKey::Secret(password),
            ) => {
                let cek = enc.cek_or_generate(provided_cek)?;
                let wrapped = pbes2::encrypt(
                    alg,
                    password.as_bytes(),
                    cek.as_bytes(),
                    options.p2c,
                    options.p2s.as_deref(),
                )?;
                let parameters = JWEHeaderParameters {
                    p2s: Some(Base64UrlSafeNoPadding::encode_to_string(&wrapped.salt)?),
                    p2c: Some(wrapped.count),
                    ..Default::default()
                };
                Ok(EncryptedCek {
                    cek,
                    encrypted_key: Some(wrapped.encrypted_key),
                    parameters: Some(parameters),
                })
            }
            (
                KeyManagementAlgorithm::A128KW
                | KeyManagementAlgorithm::A192KW
                | KeyManagementAlgorithm::A256KW,
                RecipientKey::Secret(kek),
            ) => {
                if let Some(kek_size) = alg.aes_kw_key_size() {
                    ensure!(kek.len() == kek_size, JWEError::InvalidEncryptionKey);
                }
                let cek = enc.cek_or_generate(provided_cek)?;
                let encrypted_key = aes_kw::wrap(kek.as_bytes(), cek.as_bytes())?;
                Ok(EncryptedCek {
                    cek,
                    encrypted_key: Some(encrypted_key),
                    parameters: None,
                })
            }
            (
                KeyManagementAlgorithm::A128GCMKW
                | KeyManagementAlgorithm::A192GCMKW
                | KeyManagementAlgorithm::A256GCMKW,
                RecipientKey::Secret(kek),
            ) => {
                if let Some(kek_size) = alg.aes_gcm_kw_key_size() {
                    ensure!(kek.len() == kek_size, JWEError::InvalidEncryptionKey);
                }
                let cek = enc.cek_or_generate(provided_cek)?;
                let wrapped =
                    aes_gcm_kw::wrap(kek.as_bytes(), cek.as_bytes(), options.iv.as_deref())?;
                let parameters = JWEHeaderParameters {
                    iv: Some(Base64UrlSafeNoPadding::encode_to_string(&wrapped.iv)?),
                    tag: Some(Base64UrlSafeNoPadding::encode_to_string(&wrapped.tag)?),
                    ..Default::default()
                };
                Ok(EncryptedCek {
                    cek,
                    encrypted_key: Some(wrapped.encrypted_key),
                    parameters: Some(parameters),
                })
            }
            // Unreachable after check_key_type; kept for exhaustiveness.
            _ => bail!(JWEError::KeyTypeMismatch(alg.name().to_string())),
        }
    }

    fn generate_kms_data_key(
        &self,
        alg: KeyManagementAlgorithm,
        enc: ContentEncryption,
        key_id: &str,
    ) -> Result<EncryptedCek, Error> {
        // Only the delegated algorithm is valid with an external reference.
        ensure!(
            alg == KeyManagementAlgorithm::SymmetricDefault,
            JWEError::AlgorithmNotSupported(alg.name().to_string())
        );
        let accessor = self
            .kms_accessor
            .as_deref()
            .ok_or_else(|| JWEError::AlgorithmNotAllowed(alg.name().to_string()))?;

        let key_spec = KmsKeySpec::for_content_encryption(enc)?;
        let response = accessor.generate_data_key(key_id, key_spec)?;

        let cek = response
            .plaintext
            .ok_or(JWEError::KmsContractViolation("Plaintext"))?;
        let encrypted_key = response
            .ciphertext_blob
            .ok_or(JWEError::KmsContractViolation("CiphertextBlob"))?;
        ensure!(
            cek.len() == enc.key_size(),
            JWEError::KmsContractViolation("Plaintext")
        );

        Ok(EncryptedCek {
            cek: CEK::new(cek),
            encrypted_key: Some(encrypted_key),
            parameters: None,
        })
    }
}

/// Validate key-type/algorithm compatibility before any primitive runs.
fn check_key_type(alg: KeyManagementAlgorithm, key: &RecipientKey) -> Result<(), Error> {
    let compatible = match alg {
        KeyManagementAlgorithm::Dir
        | KeyManagementAlgorithm::A128KW
        | KeyManagementAlgorithm::A192KW
        | KeyManagementAlgorithm::A256KW
        | KeyManagementAlgorithm::A128GCMKW
        | KeyManagementAlgorithm::A192GCMKW
        | KeyManagementAlgorithm::A256GCMKW
        | KeyManagementAlgorithm::Pbes2Hs256A128KW
        | KeyManagementAlgorithm::Pbes2Hs384A192KW
        | KeyManagementAlgorithm::Pbes2Hs512A256KW => matches!(key, RecipientKey::Secret(_)),
        KeyManagementAlgorithm::EcdhEs
        | KeyManagementAlgorithm::EcdhEsA128KW
        | KeyManagementAlgorithm::EcdhEsA192KW
        | KeyManagementAlgorithm::EcdhEsA256KW => matches!(key, RecipientKey::Ec(_)),
        KeyManagementAlgorithm::Rsa1_5
        | KeyManagementAlgorithm::RsaOaep
        | KeyManagementAlgorithm::RsaOaep256
        | KeyManagementAlgorithm::RsaOaep384
        | KeyManagementAlgorithm::RsaOaep512 => matches!(key, RecipientKey::Rsa(_)),
        // Delegated to a KMS; never valid with in-memory key material.
        KeyManagementAlgorithm::SymmetricDefault => {
            bail!(JWEError::AlgorithmNotSupported(alg.name().to_string()))
        }
    };
    ensure!(compatible, JWEError::KeyTypeMismatch(alg.name().to_string()));
    Ok(())
}
