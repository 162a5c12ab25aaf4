//! Sealing of the Zoho password before it is written to disk.
//!
//! Passwords are encrypted with ChaCha20-Poly1305 and stored as a base64 nonce plus
//! ciphertext, so settings files never hold the plaintext.

use crate::client_error::ClientError;
use crate::config::Password;
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Length of the key, in bytes.
pub const KEY_LEN: usize = 32;

const NONCE_LEN: usize = 12;

/// An encrypted password, as written into the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealedPassword {
    pub nonce: String,
    pub ciphertext: String,
}

/// Symmetric key used to seal and open stored passwords.
pub struct PasswordVault {
    key: Key,
}

impl PasswordVault {
    /// Build a vault from raw key bytes. The key must be 32 bytes.
    pub fn from_key_bytes(key_bytes: &[u8]) -> Result<PasswordVault, ClientError> {
        if key_bytes.len() != KEY_LEN {
            return Err(ClientError::Storage(format!(
                "invalid key length; expected {} bytes",
                KEY_LEN
            )));
        }

        let mut key = Key::default();
        key.copy_from_slice(key_bytes);

        Ok(PasswordVault { key })
    }

    pub fn seal(&self, password: &Password) -> Result<SealedPassword, ClientError> {
        let cipher = ChaCha20Poly1305::new(&self.key);
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, password.expose().as_bytes())
            .map_err(|e| ClientError::Storage(format!("encrypting password failed: {}", e)))?;

        Ok(SealedPassword {
            nonce: STANDARD_NO_PAD.encode(nonce),
            ciphertext: STANDARD_NO_PAD.encode(ciphertext),
        })
    }

    pub fn open(&self, sealed: &SealedPassword) -> Result<Password, ClientError> {
        let nonce = decode("nonce", &sealed.nonce)?;
        let ciphertext = decode("ciphertext", &sealed.ciphertext)?;

        if nonce.len() != NONCE_LEN {
            return Err(ClientError::Storage(String::from("password nonce length mismatch")));
        }

        let cipher = ChaCha20Poly1305::new(&self.key);
        let mut plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|e| ClientError::Storage(format!("decrypting password failed: {}", e)))?;

        let password = String::from_utf8(plaintext.clone())
            .map_err(|_| ClientError::Storage(String::from("stored password is not UTF-8")));
        plaintext.zeroize();

        Ok(Password::new(password?))
    }
}

impl Drop for PasswordVault {
    fn drop(&mut self) {
        self.key.as_mut_slice().zeroize();
    }
}

fn decode(field: &str, value: &str) -> Result<Vec<u8>, ClientError> {
    STANDARD_NO_PAD
        .decode(value.as_bytes())
        .map_err(|e| ClientError::Storage(format!("invalid password {}: {}", field, e)))
}
