#[allow(unused)]
pub use anyhow::{anyhow, bail, ensure, Error};

#[derive(Debug, thiserror::Error)]
pub enum JWEError {
    #[error("Internal error: [{0}]")]
    InternalError(String),
    #[error("A KMS accessor is required with JWE algorithm [{0}]")]
    AlgorithmNotAllowed(String),
    #[error("Invalid or unsupported JWE algorithm [{0}]")]
    AlgorithmNotSupported(String),
    #[error("Key type is incompatible with JWE algorithm [{0}]")]
    KeyTypeMismatch(String),
    #[error("Invalid KMS response: missing [{0}]")]
    KmsContractViolation(&'static str),
    #[error("Unsupported content encryption algorithm [{0}]")]
    UnsupportedContentEncryption(String),
    #[error("Unsupported RSA modulus")]
    UnsupportedRSAModulus,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid key pair")]
    InvalidKeyPair,
    #[error("Invalid encryption key")]
    InvalidEncryptionKey,
    #[error("Invalid initialization vector")]
    InvalidIV,
    #[error("Invalid PBES2 salt")]
    InvalidSalt,
    #[error("Invalid PBES2 iteration count")]
    InvalidIterationCount,
    #[error("Invalid ephemeral key")]
    InvalidEphemeralKey,
    #[error("Ephemeral key curve doesn't match the recipient key curve")]
    EphemeralKeyMismatch,
    #[error("Key wrapping failed")]
    KeyWrapFailed,
    #[error("Key unwrapping failed")]
    KeyUnwrapFailed,
}

impl From<&str> for JWEError {
    fn from(e: &str) -> JWEError {
        JWEError::InternalError(e.into())
    }
}
