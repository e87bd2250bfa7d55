//! AES Key Wrap (RFC 3394) over 128/192/256-bit KEKs.
//!
//! Used directly by A128KW/A192KW/A256KW and as the wrapping step of the
//! ECDH-ES+AxxxKW and PBES2 families.

use std::convert::TryInto;

use aes_kw::{KekAes128, KekAes192, KekAes256};

use crate::error::*;

fn kek_bytes<const N: usize>(kek: &[u8]) -> Result<[u8; N], Error> {
    Ok(kek.try_into().map_err(|_| JWEError::InvalidEncryptionKey)?)
}

/// Wrap a CEK under a 128/192/256-bit KEK.
///
/// Output is 8 bytes larger than the input.
pub(crate) fn wrap(kek: &[u8], cek: &[u8]) -> Result<Vec<u8>, Error> {
    ensure!(!cek.is_empty() && cek.len() % 8 == 0, JWEError::KeyWrapFailed);
    let wrapped = match kek.len() {
        16 => KekAes128::from(kek_bytes::<16>(kek)?).wrap_vec(cek),
        24 => KekAes192::from(kek_bytes::<24>(kek)?).wrap_vec(cek),
        32 => KekAes256::from(kek_bytes::<32>(kek)?).wrap_vec(cek),
        _ => bail!(JWEError::InvalidEncryptionKey),
    }
    .map_err(|_| JWEError::KeyWrapFailed)?;
    Ok(wrapped)
}

/// Unwrap a CEK, verifying the RFC 3394 integrity check value.
pub(crate) fn unwrap(kek: &[u8], wrapped: &[u8]) -> Result<Vec<u8>, Error> {
    ensure!(wrapped.len() >= 16 && wrapped.len() % 8 == 0, JWEError::KeyUnwrapFailed);
    let cek = match kek.len() {
        16 => KekAes128::from(kek_bytes::<16>(kek)?).unwrap_vec(wrapped),
        24 => KekAes192::from(kek_bytes::<24>(kek)?).unwrap_vec(wrapped),
        32 => KekAes256::from(kek_bytes::<32>(kek)?).unwrap_vec(wrapped),
        _ => bail!(JWEError::InvalidEncryptionKey),
    }
    .map_err(|_| JWEError::KeyUnwrapFailed)?;
    Ok(cek)
}
