// src/services/encryption.rs
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Invalid session key format")]
    InvalidKeyFormat,

    #[error("Sealing failed: {0}")]
    SealFailed(String),

    #[error("Opening failed: {0}")]
    OpenFailed(String),

    #[error("Invalid sealed data format")]
    InvalidDataFormat,
}

/// AES-256-GCM sealing for data that round-trips through the browser.
///
/// Sealed form is `base64(nonce || ciphertext || tag)`. Anything modified
/// client-side fails authentication in [`SessionCipher::open`].
pub struct SessionCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for SessionCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCipher")
            .field("cipher", &"<redacted>")
            .finish()
    }
}

impl SessionCipher {
    /// Initialize from a base64-encoded 32-byte key
    pub fn from_key(key_str: &str) -> Result<Self, CipherError> {
        let key_bytes = BASE64
            .decode(key_str.trim().as_bytes())
            .map_err(|_| CipherError::InvalidKeyFormat)?;

        if key_bytes.len() != 32 {
            return Err(CipherError::InvalidKeyFormat);
        }

        let cipher =
            Aes256Gcm::new_from_slice(&key_bytes).map_err(|_| CipherError::InvalidKeyFormat)?;

        Ok(Self { cipher })
    }

    /// A throwaway key that lives as long as the process
    pub fn ephemeral() -> Self {
        Self {
            cipher: Aes256Gcm::new(&Aes256Gcm::generate_key(OsRng)),
        }
    }

    /// Generate a new random key (base64-encoded)
    pub fn generate_key() -> String {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        BASE64.encode(key)
    }

    pub fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CipherError::SealFailed(e.to_string()))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(combined))
    }

    pub fn open(&self, sealed: &str) -> Result<Vec<u8>, CipherError> {
        let combined = BASE64
            .decode(sealed.as_bytes())
            .map_err(|_| CipherError::InvalidDataFormat)?;

        if combined.len() < NONCE_LEN {
            return Err(CipherError::InvalidDataFormat);
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);

        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| CipherError::OpenFailed(e.to_string()))
    }
}
