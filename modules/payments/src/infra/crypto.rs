//! AES-256-GCM vault for card numbers.
//!
//! Stored form is base64(nonce || ciphertext) with a fresh 12-byte
//! nonce drawn from the OS for every encryption, so saving the same
//! number twice never yields the same ciphertext.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::config::CardVaultConfig;

const NONCE_LEN: usize = 12;

#[derive(Clone)]
pub struct CardVault {
    cipher: Aes256Gcm,
}

impl fmt::Debug for CardVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardVault")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl CardVault {
    /// Build a vault from the configured key, base64 of exactly 32
    /// bytes.
    pub fn new(cfg: &CardVaultConfig) -> Result<Self> {
        let key = BASE64
            .decode(cfg.key.trim())
            .context("card vault key is not valid base64")?;
        if key.len() != 32 {
            bail!(
                "card vault key must decode to exactly 32 bytes, got {}",
                key.len()
            );
        }
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| anyhow!("card vault cipher init failed: {e}"))?;
        Ok(Self { cipher })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(&Nonce::from(nonce), plaintext.as_bytes())
            .map_err(|e| anyhow!("card encryption failed: {e}"))?;
        let mut packed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        packed.extend_from_slice(&nonce);
        packed.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(packed))
    }

    pub fn decrypt(&self, stored: &str) -> Result<String> {
        let packed = BASE64
            .decode(stored)
            .context("stored card value is not valid base64")?;
        if packed.len() < NONCE_LEN {
            bail!("stored card value is too short to carry a nonce");
        }
        let (nonce, ciphertext) = packed.split_at(NONCE_LEN);
        let nonce: [u8; NONCE_LEN] = nonce
            .try_into()
            .map_err(|_| anyhow!("nonce length mismatch"))?;
        let plaintext = self
            .cipher
            .decrypt(&Nonce::from(nonce), ciphertext)
            .map_err(|e| anyhow!("card decryption failed: {e}"))?;
        String::from_utf8(plaintext).context("decrypted card value is not UTF-8")
    }
}
