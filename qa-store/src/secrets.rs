//! Encrypted provider-key side table: provider API keys live in a separate table,
//! encrypted at rest, and never appear in the JSON document returned by
//! `get_or_create`/`save`. AES-256-GCM keyed from an operator-supplied master key.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;

#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    pub fn new(master_key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(master_key.into()),
        }
    }

    /// Encrypts `plaintext`, returning base64 (nonce, ciphertext) to store alongside each other.
    pub fn encrypt(&self, plaintext: &str) -> Result<(String, String), String> {
        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| e.to_string())?;

        Ok((STANDARD.encode(nonce_bytes), STANDARD.encode(ciphertext)))
    }

    pub fn decrypt(&self, nonce_b64: &str, ciphertext_b64: &str) -> Result<String, String> {
        let nonce_bytes = STANDARD.decode(nonce_b64).map_err(|e| e.to_string())?;
        let ciphertext = STANDARD.decode(ciphertext_b64).map_err(|e| e.to_string())?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|e| e.to_string())?;

        String::from_utf8(plaintext).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_plaintext() {
        let cipher = SecretCipher::new(&[3u8; 32]);
        let (nonce, ciphertext) = cipher.encrypt("sk-test-456").unwrap();
        let plaintext = cipher.decrypt(&nonce, &ciphertext).unwrap();
        assert_eq!(plaintext, "sk-test-456");
    }

    #[test]
    fn nonces_differ_across_calls() {
        let cipher = SecretCipher::new(&[3u8; 32]);
        let (nonce_a, _) = cipher.encrypt("same-secret").unwrap();
        let (nonce_b, _) = cipher.encrypt("same-secret").unwrap();
        assert_ne!(nonce_a, nonce_b);
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let cipher_a = SecretCipher::new(&[3u8; 32]);
        let cipher_b = SecretCipher::new(&[9u8; 32]);
        let (nonce, ciphertext) = cipher_a.encrypt("sk-test-789").unwrap();
        assert!(cipher_b.decrypt(&nonce, &ciphertext).is_err());
    }
}
