//! RSA CEK encryption: RSA1_5 and the RSA-OAEP family.

use rand::thread_rng;
use rsa::{Oaep, Pkcs1v15Encrypt};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

use crate::algorithms::KeyManagementAlgorithm;
use crate::error::*;
use crate::keys::RsaEncryptionKey;

/// Encrypt a CEK under the recipient's RSA public key.
///
/// Padding is implied by the algorithm identifier. Primitive failures
/// (e.g. a modulus too small for the CEK plus padding) are terminal.
pub(crate) fn encrypt(
    alg: KeyManagementAlgorithm,
    key: &RsaEncryptionKey,
    cek: &[u8],
) -> Result<Vec<u8>, Error> {
    let mut rng = thread_rng();
    let pk = key.as_inner();
    let encrypted = match alg {
        KeyManagementAlgorithm::Rsa1_5 => pk.encrypt(&mut rng, Pkcs1v15Encrypt, cek),
        KeyManagementAlgorithm::RsaOaep => pk.encrypt(&mut rng, Oaep::new::<Sha1>(), cek),
        KeyManagementAlgorithm::RsaOaep256 => pk.encrypt(&mut rng, Oaep::new::<Sha256>(), cek),
        KeyManagementAlgorithm::RsaOaep384 => pk.encrypt(&mut rng, Oaep::new::<Sha384>(), cek),
        KeyManagementAlgorithm::RsaOaep512 => pk.encrypt(&mut rng, Oaep::new::<Sha512>(), cek),
        _ => bail!(JWEError::AlgorithmNotSupported(alg.name().to_string())),
    }
    .map_err(|_| JWEError::InvalidEncryptionKey)?;
    Ok(encrypted)
}
