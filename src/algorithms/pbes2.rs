//! PBES2 password-based key wrapping (RFC 7518 §4.8).
//!
//! Derives a KEK from the password with PBKDF2, then wraps the CEK with
//! AES-KW. The salt and iteration count are always echoed back to the
//! caller, whether supplied or generated, since the recipient needs both
//! to reverse the derivation.

use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::{thread_rng, RngCore};
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

use crate::algorithms::{aes_kw, KeyManagementAlgorithm};
use crate::error::*;

const DEFAULT_ITERATION_COUNT: u32 = 2048;
const DEFAULT_SALT_SIZE: usize = 16;
const MIN_SALT_SIZE: usize = 8;

pub(crate) struct Pbes2WrappedKey {
    pub encrypted_key: Vec<u8>,
    pub count: u32,
    pub salt: Vec<u8>,
}

/// Wrap a CEK under a password-derived KEK.
pub(crate) fn encrypt(
    alg: KeyManagementAlgorithm,
    password: &[u8],
    cek: &[u8],
    count: Option<u32>,
    salt: Option<&[u8]>,
) -> Result<Pbes2WrappedKey, Error> {
    let count = count.unwrap_or(DEFAULT_ITERATION_COUNT);
    ensure!(count >= 1, JWEError::InvalidIterationCount);

    let salt = match salt {
        Some(salt) => {
            ensure!(salt.len() >= MIN_SALT_SIZE, JWEError::InvalidSalt);
            salt.to_vec()
        }
        None => {
            let mut salt = vec![0u8; DEFAULT_SALT_SIZE];
            thread_rng().fill_bytes(&mut salt);
            salt
        }
    };

    let kek = derive_key(alg, password, count, &salt)?;
    let encrypted_key = aes_kw::wrap(&kek, cek)?;

    Ok(Pbes2WrappedKey {
        encrypted_key,
        count,
        salt,
    })
}

/// PBKDF2 with the variant's PRF; the salt input is `alg || 0x00 || p2s`.
pub(crate) fn derive_key(
    alg: KeyManagementAlgorithm,
    password: &[u8],
    count: u32,
    salt: &[u8],
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let kek_size = match alg.aes_kw_key_size() {
        Some(kek_size) if is_pbes2(alg) => kek_size,
        _ => bail!(JWEError::AlgorithmNotSupported(alg.name().to_string())),
    };

    let mut salt_input = Vec::with_capacity(alg.name().len() + 1 + salt.len());
    salt_input.extend_from_slice(alg.name().as_bytes());
    salt_input.push(0);
    salt_input.extend_from_slice(salt);

    let mut kek = Zeroizing::new(vec![0u8; kek_size]);
    match alg {
        KeyManagementAlgorithm::Pbes2Hs256A128KW => {
            pbkdf2::<Hmac<Sha256>>(password, &salt_input, count, &mut kek)
        }
        KeyManagementAlgorithm::Pbes2Hs384A192KW => {
            pbkdf2::<Hmac<Sha384>>(password, &salt_input, count, &mut kek)
        }
        KeyManagementAlgorithm::Pbes2Hs512A256KW => {
            pbkdf2::<Hmac<Sha512>>(password, &salt_input, count, &mut kek)
        }
        _ => bail!(JWEError::AlgorithmNotSupported(alg.name().to_string())),
    }
    .map_err(|_| JWEError::InvalidEncryptionKey)?;
    Ok(kek)
}

fn is_pbes2(alg: KeyManagementAlgorithm) -> bool {
    matches!(
        alg,
        KeyManagementAlgorithm::Pbes2Hs256A128KW
            | KeyManagementAlgorithm::Pbes2Hs384A192KW
            | KeyManagementAlgorithm::Pbes2Hs512A256KW
    )
}
