//! Sealing of secrets that must be stored at rest, such as the identity
//! provider's access token pair.
//!
//! Sealed values have the shape `v1.<nonce b64>.<ciphertext b64>`; the key is
//! derived from a configured secret and salt with PBKDF2-HMAC-SHA256.

use aes::cipher::generic_array::GenericArray;
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::engine::general_purpose;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use thiserror::Error;

const FORMAT_VERSION: &str = "v1";
const NONCE_LEN: usize = 12;
const KDF_ITERATIONS: u32 = 100_000;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Sealing failed: {0}")]
    Seal(String),

    #[error("Opening failed: {0}")]
    Open(String),

    #[error("Malformed sealed value: {0}")]
    Malformed(String),
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SecretCipher: Send + Sync {
    fn seal(&self, plaintext: &str) -> Result<String, CryptoError>;

    fn open(&self, sealed: &str) -> Result<String, CryptoError>;
}

pub struct AesSecretCipher {
    key: [u8; 32],
}

impl AesSecretCipher {
    pub fn new(secret: &str, salt: &str) -> Self {
        let mut key = [0u8; 32];
        pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt.as_bytes(), KDF_ITERATIONS, &mut key);

        Self { key }
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(GenericArray::from_slice(&self.key))
    }
}

impl SecretCipher for AesSecretCipher {
    fn seal(&self, plaintext: &str) -> Result<String, CryptoError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| CryptoError::Seal(e.to_string()))?;

        Ok(format!(
            "{FORMAT_VERSION}.{}.{}",
            general_purpose::STANDARD.encode(nonce_bytes),
            general_purpose::STANDARD.encode(ciphertext)
        ))
    }

    fn open(&self, sealed: &str) -> Result<String, CryptoError> {
        let mut parts = sealed.splitn(3, '.');

        match parts.next() {
            Some(FORMAT_VERSION) => {},
            other => return Err(CryptoError::Malformed(format!("unsupported version {other:?}"))),
        }
        let nonce_b64 = parts.next().ok_or_else(|| CryptoError::Malformed("missing nonce".into()))?;
        let ct_b64 = parts.next().ok_or_else(|| CryptoError::Malformed("missing ciphertext".into()))?;

        let nonce_bytes = general_purpose::STANDARD
            .decode(nonce_b64)
            .map_err(|e| CryptoError::Malformed(e.to_string()))?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(CryptoError::Malformed("nonce has wrong length".into()));
        }
        let ct_bytes = general_purpose::STANDARD
            .decode(ct_b64)
            .map_err(|e| CryptoError::Malformed(e.to_string()))?;

        let plaintext = self
            .cipher()
            .decrypt(Nonce::from_slice(&nonce_bytes), ct_bytes.as_ref())
            .map_err(|e| CryptoError::Open(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| CryptoError::Open(e.to_string()))
    }
}
