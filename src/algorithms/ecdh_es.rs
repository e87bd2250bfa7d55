//! ECDH-ES key agreement for JWE key management.
//!
//! Plain ECDH-ES feeds the agreed secret through the Concat KDF and uses
//! the result as the CEK directly. The ECDH-ES+AxxxKW variants derive a
//! KEK instead and wrap an independently generated CEK under it.

use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::algorithms::{aes_kw, ContentEncryption, KeyManagementAlgorithm};
use crate::error::*;
use crate::jwe_header::JWEHeaderParameters;
use crate::key_management::{EncryptedCek, KeyManagementOptions};
use crate::keys::{EcEphemeralKey, EcPublicKey};

/// Derive a key using Concat KDF as specified in NIST SP 800-56A.
pub(crate) fn concat_kdf(
    shared_secret: &[u8],
    key_len: usize,
    alg: &str,
    apu: Option<&[u8]>,
    apv: Option<&[u8]>,
) -> Vec<u8> {
    let apu = apu.unwrap_or(&[]);
    let apv = apv.unwrap_or(&[]);

    // AlgorithmID || PartyUInfo || PartyVInfo || SuppPubInfo
    let alg_bytes = alg.as_bytes();
    let alg_len = (alg_bytes.len() as u32).to_be_bytes();
    let apu_len = (apu.len() as u32).to_be_bytes();
    let apv_len = (apv.len() as u32).to_be_bytes();
    let key_bits = ((key_len * 8) as u32).to_be_bytes();

    let mut derived_key = Vec::with_capacity(key_len);
    let mut counter: u32 = 1;

    while derived_key.len() < key_len {
        // Hash: counter || Z || OtherInfo
        let mut hasher = Sha256::new();
        hasher.update(counter.to_be_bytes());
        hasher.update(shared_secret);
        hasher.update(alg_len);
        hasher.update(alg_bytes);
        hasher.update(apu_len);
        hasher.update(apu);
        hasher.update(apv_len);
        hasher.update(apv);
        hasher.update(key_bits);

        derived_key.extend_from_slice(&hasher.finalize());
        counter += 1;
    }

    derived_key.truncate(key_len);
    derived_key
}

/// Establish a CEK through ECDH-ES agreement.
///
/// Uses the caller-supplied ephemeral key pair when present, otherwise
/// generates one on the recipient key's curve. The ephemeral public key
/// is always emitted as "epk"; apu/apv are echoed base64url when supplied.
pub(crate) fn encrypt(
    alg: KeyManagementAlgorithm,
    enc: ContentEncryption,
    key: &EcPublicKey,
    provided_cek: Option<&[u8]>,
    options: &KeyManagementOptions,
) -> Result<EncryptedCek, Error> {
    // Plain ECDH-ES keys the KDF by the "enc" value and the CEK length;
    // the +AxxxKW variants key it by their own name and KEK length.
    let (kdf_alg, derived_len) = match alg {
        KeyManagementAlgorithm::EcdhEs => (enc.alg_name(), enc.key_size()),
        KeyManagementAlgorithm::EcdhEsA128KW
        | KeyManagementAlgorithm::EcdhEsA192KW
        | KeyManagementAlgorithm::EcdhEsA256KW => {
            (alg.name(), alg.aes_kw_key_size().unwrap_or_default())
        }
        _ => bail!(JWEError::AlgorithmNotSupported(alg.name().to_string())),
    };

    let generated;
    let ephemeral = match options.ephemeral_key.as_ref() {
        Some(ephemeral) => ephemeral,
        None => {
            generated = EcEphemeralKey::generate(key.curve());
            &generated
        }
    };

    let apu = options.apu.as_deref();
    let apv = options.apv.as_deref();

    let shared_secret = ephemeral.diffie_hellman(key)?;
    let derived = Zeroizing::new(concat_kdf(&shared_secret, derived_len, kdf_alg, apu, apv));

    let mut parameters = JWEHeaderParameters {
        ephemeral_public_key: Some(ephemeral.public_key().to_epk()),
        ..Default::default()
    };
    if let Some(apu) = apu {
        parameters.apu = Some(Base64UrlSafeNoPadding::encode_to_string(apu)?);
    }
    if let Some(apv) = apv {
        parameters.apv = Some(Base64UrlSafeNoPadding::encode_to_string(apv)?);
    }

    if alg == KeyManagementAlgorithm::EcdhEs {
        // Direct key agreement: the derived secret is the CEK.
        return Ok(EncryptedCek {
            cek: crate::algorithms::CEK::new(derived.to_vec()),
            encrypted_key: None,
            parameters: Some(parameters),
        });
    }

    // Key agreement with key wrapping
    let cek = enc.cek_or_generate(provided_cek)?;
    let encrypted_key = aes_kw::wrap(&derived, cek.as_bytes())?;
    Ok(EncryptedCek {
        cek,
        encrypted_key: Some(encrypted_key),
        parameters: Some(parameters),
    })
}
