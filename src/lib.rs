#![forbid(unsafe_code)]

pub mod algorithms;
pub mod error;
pub mod jwe_header;
pub mod key_management;
pub mod keys;
pub mod kms;

pub use serde;
pub use serde_json;

pub mod prelude {
    pub use crate::algorithms::{ContentEncryption, KeyManagementAlgorithm, CEK};
    pub use crate::error::Error;
    pub use crate::jwe_header::JWEHeaderParameters;
    pub use crate::key_management::{EncryptedCek, KeyManager, KeyManagementOptions};
    pub use crate::keys::{
        EcCurve, EcEphemeralKey, EcPublicKey, RecipientKey, RsaEncryptionKey, SymmetricKey,
    };
    pub use crate::kms::{KmsAccessor, KmsDataKey, KmsKeySpec};
    pub use serde::{Deserialize, Serialize};
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::error::JWEError;
    use crate::prelude::*;

    #[test]
    fn a256kw_end_to_end() {
        let kek = SymmetricKey::generate(32);
        let key = RecipientKey::Secret(kek.clone());

        let result = KeyManager::new()
            .encrypt_key(
                KeyManagementAlgorithm::A256KW,
                ContentEncryption::A256GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap();

        assert_eq!(result.cek.as_bytes().len(), 32);
        assert!(result.parameters.is_none());

        let encrypted_key = result.encrypted_key.unwrap();
        assert_eq!(encrypted_key.len(), 40);
        let unwrapped =
            crate::algorithms::aes_kw::unwrap(kek.as_bytes(), &encrypted_key).unwrap();
        assert_eq!(unwrapped, result.cek.as_bytes());
    }

    #[test]
    fn aes_kw_with_fixed_cek_is_deterministic() {
        let key = RecipientKey::Secret(SymmetricKey::from_bytes(&[1u8; 16]));
        let cek = [2u8; 32];
        let manager = KeyManager::new();

        let encrypt = || {
            manager
                .encrypt_key(
                    KeyManagementAlgorithm::A128KW,
                    ContentEncryption::A256GCM,
                    &key,
                    Some(&cek),
                    &KeyManagementOptions::default(),
                )
                .unwrap()
        };
        assert_eq!(encrypt().encrypted_key, encrypt().encrypted_key);
    }

    #[test]
    fn aes_kw_rejects_mismatched_kek_size() {
        let key = RecipientKey::Secret(SymmetricKey::generate(32));
        let result = KeyManager::new().encrypt_key(
            KeyManagementAlgorithm::A128KW,
            ContentEncryption::A128GCM,
            &key,
            None,
            &KeyManagementOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn dir_passes_the_shared_key_through() {
        let key = RecipientKey::Secret(SymmetricKey::from_bytes(&[9u8; 32]));
        let result = KeyManager::new()
            .encrypt_key(
                KeyManagementAlgorithm::Dir,
                ContentEncryption::A256GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap();

        assert_eq!(result.cek.as_bytes(), &[9u8; 32][..]);
        assert!(result.encrypted_key.is_none());
        assert!(result.parameters.is_none());
    }

    #[test]
    fn dir_rejects_a_key_of_the_wrong_size() {
        let key = RecipientKey::Secret(SymmetricKey::from_bytes(&[9u8; 16]));
        let result = KeyManager::new().encrypt_key(
            KeyManagementAlgorithm::Dir,
            ContentEncryption::A256GCM,
            &key,
            None,
            &KeyManagementOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn ecdh_es_emits_epk_and_derives_the_cek() {
        let recipient_sk = p256::SecretKey::random(&mut rand::thread_rng());
        let key = RecipientKey::Ec(EcPublicKey::P256(recipient_sk.public_key()));

        let result = KeyManager::new()
            .encrypt_key(
                KeyManagementAlgorithm::EcdhEs,
                ContentEncryption::A256GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap();

        assert_eq!(result.cek.as_bytes().len(), 32);
        assert!(result.encrypted_key.is_none());
        let parameters = result.parameters.unwrap();
        let epk = parameters.ephemeral_public_key.unwrap();
        assert_eq!(epk["kty"], "EC");
        assert_eq!(epk["crv"], "P-256");
    }

    #[test]
    fn ecdh_es_a128kw_wraps_a_generated_cek() {
        let recipient_sk = p384::SecretKey::random(&mut rand::thread_rng());
        let key = RecipientKey::Ec(EcPublicKey::P384(recipient_sk.public_key()));

        let result = KeyManager::new()
            .encrypt_key(
                KeyManagementAlgorithm::EcdhEsA128KW,
                ContentEncryption::A128GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap();

        assert_eq!(result.cek.as_bytes().len(), 16);
        assert_eq!(result.encrypted_key.unwrap().len(), 24);
        assert!(result.parameters.unwrap().ephemeral_public_key.is_some());
    }

    #[test]
    fn rsa_oaep_256_encrypts_the_cek() {
        let sk = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
        let key =
            RecipientKey::Rsa(RsaEncryptionKey::from_public_key(sk.to_public_key()).unwrap());

        let result = KeyManager::new()
            .encrypt_key(
                KeyManagementAlgorithm::RsaOaep256,
                ContentEncryption::A256GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap();

        assert_eq!(result.cek.as_bytes().len(), 32);
        assert!(result.parameters.is_none());

        let decrypted = sk
            .decrypt(rsa::Oaep::new::<sha2::Sha256>(), &result.encrypted_key.unwrap())
            .unwrap();
        assert_eq!(decrypted, result.cek.as_bytes());
    }

    #[test]
    fn pbes2_always_echoes_salt_and_count() {
        let key = RecipientKey::Secret(SymmetricKey::from_bytes(b"Thus from my lips"));
        let options = KeyManagementOptions {
            p2c: Some(4096),
            p2s: Some(vec![0x42; 16]),
            ..Default::default()
        };

        let result = KeyManager::new()
            .encrypt_key(
                KeyManagementAlgorithm::Pbes2Hs512A256KW,
                ContentEncryption::A256GCM,
                &key,
                None,
                &options,
            )
            .unwrap();

        let parameters = result.parameters.unwrap();
        assert_eq!(parameters.p2c, Some(4096));
        assert_eq!(parameters.p2s.as_deref(), Some("QkJCQkJCQkJCQkJCQkJCQg"));
        assert!(result.encrypted_key.is_some());

        // Generated salt/count are echoed back too.
        let result = KeyManager::new()
            .encrypt_key(
                KeyManagementAlgorithm::Pbes2Hs256A128KW,
                ContentEncryption::A128GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap();
        let parameters = result.parameters.unwrap();
        assert_eq!(parameters.p2c, Some(2048));
        assert!(parameters.p2s.is_some());
    }

    #[test]
    fn a256gcmkw_emits_iv_and_tag() {
        let kek = SymmetricKey::generate(32);
        let key = RecipientKey::Secret(kek.clone());

        let result = KeyManager::new()
            .encrypt_key(
                KeyManagementAlgorithm::A256GCMKW,
                ContentEncryption::A128GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap();

        let parameters = result.parameters.unwrap();
        let iv = parameters.iv.unwrap();
        let tag = parameters.tag.unwrap();
        let encrypted_key = result.encrypted_key.unwrap();

        use ct_codecs::{Base64UrlSafeNoPadding, Decoder};
        let iv = Base64UrlSafeNoPadding::decode_to_vec(&iv, None).unwrap();
        let tag = Base64UrlSafeNoPadding::decode_to_vec(&tag, None).unwrap();
        let unwrapped =
            crate::algorithms::aes_gcm_kw::unwrap(kek.as_bytes(), &encrypted_key, &iv, &tag)
                .unwrap();
        assert_eq!(unwrapped, result.cek.as_bytes());
    }

    #[test]
    fn header_parameters_serialize_with_rfc_names() {
        let key = RecipientKey::Secret(SymmetricKey::from_bytes(b"a password"));
        let result = KeyManager::new()
            .encrypt_key(
                KeyManagementAlgorithm::Pbes2Hs256A128KW,
                ContentEncryption::A256GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap();

        let value = serde_json::to_value(result.parameters.unwrap()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object.contains_key("p2s"));
        assert!(object.contains_key("p2c"));
    }

    #[derive(Clone, Default)]
    struct StaticKms {
        calls: Arc<Mutex<Vec<(String, KmsKeySpec)>>>,
        omit_ciphertext: bool,
    }

    impl KmsAccessor for StaticKms {
        fn generate_data_key(
            &self,
            key_id: &str,
            key_spec: KmsKeySpec,
        ) -> Result<KmsDataKey, Error> {
            self.calls
                .lock()
                .unwrap()
                .push((key_id.to_string(), key_spec));
            Ok(KmsDataKey {
                plaintext: Some(vec![7u8; key_spec.key_size()]),
                ciphertext_blob: if self.omit_ciphertext {
                    None
                } else {
                    Some(vec![9u8; 64])
                },
            })
        }
    }

    #[test]
    fn symmetric_default_delegates_to_the_accessor() {
        let kms = StaticKms::default();
        let calls = kms.calls.clone();
        let manager = KeyManager::new().with_kms_accessor(kms);

        let key = RecipientKey::External("arn:aws:kms:eu-west-1:123456789:key/abc".to_string());
        let result = manager
            .encrypt_key(
                KeyManagementAlgorithm::SymmetricDefault,
                ContentEncryption::A256GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap();

        assert_eq!(result.cek.as_bytes(), &[7u8; 32][..]);
        assert_eq!(result.encrypted_key.as_deref(), Some(&[9u8; 64][..]));
        assert!(result.parameters.is_none());

        let calls = calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[(
                "arn:aws:kms:eu-west-1:123456789:key/abc".to_string(),
                KmsKeySpec::Aes256
            )]
        );
    }

    #[test]
    fn symmetric_default_without_accessor_is_not_allowed() {
        let key = RecipientKey::External("arn:aws:kms:eu-west-1:123456789:key/abc".to_string());
        let err = KeyManager::new()
            .encrypt_key(
                KeyManagementAlgorithm::SymmetricDefault,
                ContentEncryption::A256GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JWEError>(),
            Some(JWEError::AlgorithmNotAllowed(_))
        ));
    }

    #[test]
    fn external_reference_rejects_other_algorithms() {
        let kms = StaticKms::default();
        let manager = KeyManager::new().with_kms_accessor(kms);
        let key = RecipientKey::External("arn:aws:kms:eu-west-1:123456789:key/abc".to_string());

        let err = manager
            .encrypt_key(
                KeyManagementAlgorithm::A256KW,
                ContentEncryption::A256GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JWEError>(),
            Some(JWEError::AlgorithmNotSupported(_))
        ));
    }

    #[test]
    fn missing_ciphertext_is_a_contract_violation() {
        let kms = StaticKms {
            omit_ciphertext: true,
            ..Default::default()
        };
        let manager = KeyManager::new().with_kms_accessor(kms);
        let key = RecipientKey::External("arn:aws:kms:eu-west-1:123456789:key/abc".to_string());

        let err = manager
            .encrypt_key(
                KeyManagementAlgorithm::SymmetricDefault,
                ContentEncryption::A256GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap_err();
        match err.downcast_ref::<JWEError>() {
            Some(JWEError::KmsContractViolation(field)) => assert_eq!(*field, "CiphertextBlob"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn mismatched_key_type_fails_before_encryption() {
        let key = RecipientKey::Secret(SymmetricKey::generate(32));
        let err = KeyManager::new()
            .encrypt_key(
                KeyManagementAlgorithm::RsaOaep,
                ContentEncryption::A256GCM,
                &key,
                None,
                &KeyManagementOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JWEError>(),
            Some(JWEError::KeyTypeMismatch(_))
        ));
    }
}
