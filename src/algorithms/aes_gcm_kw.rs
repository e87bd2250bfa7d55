//! AES-GCM key wrapping (A128GCMKW, A192GCMKW, A256GCMKW).
//!
//! The CEK is sealed with AES-GCM under the shared key; the 96-bit IV and
//! the authentication tag travel as header parameters so the recipient
//! can reverse the wrap.

use aes::Aes192;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, Nonce};
use rand::{thread_rng, RngCore};

use crate::error::*;

type Aes192Gcm = AesGcm<Aes192, U12>;

pub(crate) const IV_SIZE: usize = 12;
pub(crate) const TAG_SIZE: usize = 16;

pub(crate) struct GcmWrappedKey {
    pub encrypted_key: Vec<u8>,
    pub iv: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Seal a CEK under a 128/192/256-bit key with AES-GCM.
pub(crate) fn wrap(kek: &[u8], cek: &[u8], iv: Option<&[u8]>) -> Result<GcmWrappedKey, Error> {
    let iv = match iv {
        Some(iv) => {
            ensure!(iv.len() == IV_SIZE, JWEError::InvalidIV);
            iv.to_vec()
        }
        None => {
            let mut iv = vec![0u8; IV_SIZE];
            thread_rng().fill_bytes(&mut iv);
            iv
        }
    };

    let nonce = Nonce::from_slice(&iv);
    let mut sealed = match kek.len() {
        16 => Aes128Gcm::new_from_slice(kek)
            .map_err(|_| JWEError::InvalidEncryptionKey)?
            .encrypt(nonce, cek),
        24 => Aes192Gcm::new_from_slice(kek)
            .map_err(|_| JWEError::InvalidEncryptionKey)?
            .encrypt(nonce, cek),
        32 => Aes256Gcm::new_from_slice(kek)
            .map_err(|_| JWEError::InvalidEncryptionKey)?
            .encrypt(nonce, cek),
        _ => bail!(JWEError::InvalidEncryptionKey),
    }
    .map_err(|_| JWEError::KeyWrapFailed)?;

    // The aead interface appends the tag to the ciphertext.
    let tag = sealed.split_off(sealed.len() - TAG_SIZE);
    Ok(GcmWrappedKey {
        encrypted_key: sealed,
        iv,
        tag,
    })
}

/// Open a sealed CEK, verifying the authentication tag.
pub(crate) fn unwrap(
    kek: &[u8],
    encrypted_key: &[u8],
    iv: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, Error> {
    ensure!(iv.len() == IV_SIZE, JWEError::InvalidIV);
    ensure!(tag.len() == TAG_SIZE, JWEError::KeyUnwrapFailed);

    let mut sealed = encrypted_key.to_vec();
    sealed.extend_from_slice(tag);

    let nonce = Nonce::from_slice(iv);
    let cek = match kek.len() {
        16 => Aes128Gcm::new_from_slice(kek)
            .map_err(|_| JWEError::InvalidEncryptionKey)?
            .decrypt(nonce, sealed.as_slice()),
        24 => Aes192Gcm::new_from_slice(kek)
            .map_err(|_| JWEError::InvalidEncryptionKey)?
            .decrypt(nonce, sealed.as_slice()),
        32 => Aes256Gcm::new_from_slice(kek)
            .map_err(|_| JWEError::InvalidEncryptionKey)?
            .decrypt(nonce, sealed.as_slice()),
        _ => bail!(JWEError::InvalidEncryptionKey),
    }
    .map_err(|_| JWEError::KeyUnwrapFailed)?;
    Ok(cek)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_roundtrip_all_key_sizes() {
        for kek_size in [16usize, 24, 32] {
            let kek = vec![5u8; kek_size];
            let cek = [8u8; 32];
            let wrapped = wrap(&kek, &cek, None).unwrap();
            assert_eq!(wrapped.iv.len(), IV_SIZE);
            assert_eq!(wrapped.tag.len(), TAG_SIZE);
            assert_eq!(wrapped.encrypted_key.len(), cek.len());

            let unwrapped =
                unwrap(&kek, &wrapped.encrypted_key, &wrapped.iv, &wrapped.tag).unwrap();
            assert_eq!(unwrapped, cek);
        }
    }

    #[test]
    fn caller_supplied_iv_is_used() {
        let kek = [1u8; 16];
        let iv = [2u8; 12];
        let wrapped = wrap(&kek, &[3u8; 16], Some(&iv)).unwrap();
        assert_eq!(wrapped.iv, iv);
    }

    #[test]
    fn wrong_iv_size_is_rejected() {
        assert!(wrap(&[1u8; 16], &[3u8; 16], Some(&[2u8; 16])).is_err());
    }

    #[test]
    fn tampered_tag_fails() {
        let kek = [1u8; 32];
        let wrapped = wrap(&kek, &[3u8; 32], None).unwrap();
        let mut tag = wrapped.tag.clone();
        tag[0] ^= 0xff;
        assert!(unwrap(&kek, &wrapped.encrypted_key, &wrapped.iv, &tag).is_err());
    }
}
