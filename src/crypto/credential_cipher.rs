// ABOUTME: AES-256-CBC encryption of database connection passwords at rest
// ABOUTME: Persisted format is base64(IV || ciphertext) with a fresh random IV per call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Credential Cipher
//!
//! Passwords written by the admin layer are stored as
//! `base64(IV || base64(AES-256-CBC(plaintext)))`, the shape OpenSSL's text
//! mode produces, so rows written before this crate existed stay readable.
//! Decryption also accepts the raw `base64(IV || ciphertext)` form.
//!
//! There is no key rotation: changing the key makes every stored password
//! unreadable.

use std::str;

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use tenant_db_core::StoredSecret;
use tracing::warn;
use zeroize::Zeroizing;

use crate::errors::{AppError, AppResult};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256 key length in bytes
pub const KEY_LENGTH: usize = 32;
/// CBC initialization vector length (one AES block)
pub const IV_LENGTH: usize = 16;

/// Symmetric cipher for connection passwords
#[derive(Clone)]
pub struct CredentialCipher {
    key: Zeroizing<[u8; KEY_LENGTH]>,
}

impl CredentialCipher {
    /// Build a cipher from key material
    ///
    /// Follows OpenSSL's handling of AES-256 keys: shorter material is
    /// zero-padded and longer material truncated to 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the key material is empty
    pub fn new(key_material: &[u8]) -> AppResult<Self> {
        if key_material.is_empty() {
            return Err(AppError::config("Encryption key must not be empty"));
        }
        if key_material.len() != KEY_LENGTH {
            warn!(
                provided = key_material.len(),
                expected = KEY_LENGTH,
                "Encryption key is not 32 bytes, padding/truncating like OpenSSL"
            );
        }

        let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
        let take = key_material.len().min(KEY_LENGTH);
        key[..take].copy_from_slice(&key_material[..take]);

        Ok(Self { key })
    }

    /// Encrypt a plaintext password into its persisted text form
    ///
    /// # Errors
    ///
    /// Returns an error if the cipher cannot be initialised
    pub fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let mut iv = [0u8; IV_LENGTH];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new_from_slices(&self.key[..], &iv)
            .map_err(|e| AppError::config(format!("Failed to initialise cipher: {e}")))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let mut combined = Vec::with_capacity(IV_LENGTH + ciphertext.len() * 4 / 3 + 4);
        combined.extend_from_slice(&iv);
        combined.extend_from_slice(STANDARD.encode(ciphertext).as_bytes());

        Ok(STANDARD.encode(combined))
    }

    /// Recover the plaintext of a stored password
    ///
    /// Plain secrets are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Decryption`] if the blob is malformed, was
    /// encrypted under another key, or does not decrypt to UTF-8
    pub fn decrypt(&self, secret: &StoredSecret) -> AppResult<Zeroizing<String>> {
        match secret {
            StoredSecret::Plain(text) => Ok(Zeroizing::new(text.clone())),
            StoredSecret::Encrypted(blob) => self.decrypt_blob(blob),
        }
    }

    /// Recover the plaintext of an encrypted blob
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Decryption`] if the blob cannot be recovered
    pub fn decrypt_blob(&self, blob: &[u8]) -> AppResult<Zeroizing<String>> {
        let encoded = blob.trim_ascii();
        let data = STANDARD
            .decode(encoded)
            .map_err(|e| AppError::decryption(format!("invalid base64: {e}")))?;

        if data.len() <= IV_LENGTH {
            return Err(AppError::decryption("payload shorter than the IV"));
        }
        let (iv, payload) = data.split_at(IV_LENGTH);
        let ciphertext = inner_ciphertext(payload);

        let plaintext = Aes256CbcDec::new_from_slices(&self.key[..], iv)
            .map_err(|e| AppError::decryption(format!("invalid key or IV length: {e}")))?
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| AppError::decryption("bad padding (wrong key or corrupt data)"))?;
        let plaintext = Zeroizing::new(plaintext);

        str::from_utf8(&plaintext)
            .map(|text| Zeroizing::new(text.to_owned()))
            .map_err(|_| AppError::decryption("plaintext is not valid UTF-8"))
    }
}

/// OpenSSL text mode stores the ciphertext base64-encoded; anything that does
/// not decode to whole AES blocks is taken as raw ciphertext
fn inner_ciphertext(payload: &[u8]) -> Vec<u8> {
    match STANDARD.decode(payload) {
        Ok(decoded) if !decoded.is_empty() && decoded.len() % IV_LENGTH == 0 => decoded,
        _ => payload.to_vec(),
    }
}
