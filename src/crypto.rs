use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use log::warn;
use rand::RngCore;
use std::fs;
use std::path::Path;

/// Environment variable holding the 64-hex-char encryption key.
pub const KEY_ENV_VAR: &str = "DAYBRIEF_SECRET_KEY";
/// Fallback key file, auto-generated when neither env nor file exists.
pub const KEY_FILE: &str = "data/secret.key";

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;

/// Process-wide cipher for credential fields. Built once at startup;
/// the key is read-only after that. Rotating the key invalidates every
/// previously encrypted field.
pub struct Cipher {
    key: [u8; KEY_SIZE],
}

impl Cipher {
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Cipher { key }
    }

    /// Source the key: environment variable, then key file, then generate
    /// a fresh one and persist it to the key file.
    pub fn from_env_or_file() -> Result<Self, String> {
        if let Ok(hex_key) = std::env::var(KEY_ENV_VAR) {
            return Ok(Cipher::new(parse_hex_key(hex_key.trim())?));
        }

        let key_path = Path::new(KEY_FILE);
        if key_path.exists() {
            let contents = fs::read_to_string(key_path)
                .map_err(|e| format!("Failed to read {}: {}", KEY_FILE, e))?;
            return Ok(Cipher::new(parse_hex_key(contents.trim())?));
        }

        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        let encoded = hex::encode(key);
        fs::write(key_path, &encoded)
            .map_err(|e| format!("Failed to write {}: {}", KEY_FILE, e))?;

        warn!("New secret key generated and saved to {}", KEY_FILE);
        warn!(
            "Move it into your environment ({}=<key>) and delete the file",
            KEY_ENV_VAR
        );

        Ok(Cipher::new(key))
    }

    /// Encrypt a text field. Returns base64(nonce || ciphertext+tag),
    /// suitable for a TEXT column.
    pub fn encrypt_str(&self, plaintext: &str) -> Result<String, String> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| format!("Encryption failed: {}", e))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(blob))
    }

    /// Decrypt a blob produced by `encrypt_str`. Any failure (wrong key,
    /// tampered or truncated blob, bad encoding) yields `None`; callers
    /// treat a missing value as "re-authentication required", not a crash.
    pub fn decrypt_str(&self, blob: &str) -> Option<String> {
        let data = BASE64.decode(blob).ok()?;
        if data.len() < NONCE_SIZE {
            return None;
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .ok()?;

        String::from_utf8(plaintext).ok()
    }
}

fn parse_hex_key(hex_str: &str) -> Result<[u8; KEY_SIZE], String> {
    let bytes = hex::decode(hex_str).map_err(|e| format!("Invalid key hex: {}", e))?;
    if bytes.len() != KEY_SIZE {
        return Err(format!(
            "Key length mismatch: expected {} bytes, got {}",
            KEY_SIZE,
            bytes.len()
        ));
    }
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&bytes);
    Ok(key)
}
