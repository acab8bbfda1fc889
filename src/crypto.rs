// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Device-bound at-rest encryption.
//!
//! ## Blob Format
//!
//! ```text
//! base64( {"ciphertext": hex, "iv": hex, "salt": hex} )
//! ```
//!
//! ## Key Derivation
//!
//! - PBKDF2-HMAC-SHA256, [`PBKDF2_ROUNDS`] iterations
//! - Password: application secret followed by the device identifier
//! - Salt: 16 random bytes, fresh for every encryption, stored in the blob
//!
//! The cipher is AES-256-GCM with a fresh 12-byte IV per encryption, so two
//! encryptions of the same plaintext never produce the same blob.
//!
//! A blob only decrypts on the device that wrote it. Restoring storage onto
//! another device leaves every blob unreadable; callers treat that as
//! "value absent".

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

/// PBKDF2 iteration count. Fixed: changing it orphans every stored blob.
pub const PBKDF2_ROUNDS: u32 = 10_000;

const KEY_LEN: usize = 32;
const SALT_LEN: usize = 16;
const IV_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("blob is not valid base64")]
    Encoding,

    #[error("blob envelope is malformed: {0}")]
    Malformed(String),

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed (wrong device or tampered blob)")]
    Decrypt,

    #[error("plaintext is not valid UTF-8")]
    Utf8,
}

/// Hex fields of an encrypted blob before base64 wrapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct BlobParts {
    ciphertext: String,
    iv: String,
    salt: String,
}

/// An encrypted value in its storage form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedBlob(String);

impl EncryptedBlob {
    /// Wrap a stored string without validating it; validation happens on
    /// decrypt.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    fn parts(&self) -> Result<BlobParts, CryptoError> {
        let json = Base64::decode_vec(&self.0).map_err(|_| CryptoError::Encoding)?;
        serde_json::from_slice(&json).map_err(|e| CryptoError::Malformed(e.to_string()))
    }
}

/// Encrypts and decrypts values with a key bound to this device.
#[derive(Clone)]
pub struct DeviceCipher {
    app_secret: Zeroizing<String>,
    device_id: String,
}

impl std::fmt::Debug for DeviceCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCipher")
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

impl DeviceCipher {
    pub fn new(app_secret: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            app_secret: Zeroizing::new(app_secret.into()),
            device_id: device_id.into(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    fn derive_key(&self, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
        let mut password = Zeroizing::new(Vec::with_capacity(
            self.app_secret.len() + self.device_id.len(),
        ));
        password.extend_from_slice(self.app_secret.as_bytes());
        password.extend_from_slice(self.device_id.as_bytes());

        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        pbkdf2::pbkdf2_hmac::<Sha256>(&password, salt, PBKDF2_ROUNDS, &mut key[..]);
        key
    }

    /// Encrypt a UTF-8 plaintext into a blob.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedBlob, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let key = self.derive_key(&salt);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;

        let parts = BlobParts {
            ciphertext: hex::encode(ciphertext),
            iv: hex::encode(iv),
            salt: hex::encode(salt),
        };
        let json = serde_json::to_vec(&parts).map_err(|e| CryptoError::Malformed(e.to_string()))?;
        Ok(EncryptedBlob(Base64::encode_string(&json)))
    }

    /// Decrypt a blob produced by [`DeviceCipher::encrypt`] on this device.
    pub fn decrypt(&self, blob: &EncryptedBlob) -> Result<Zeroizing<String>, CryptoError> {
        let parts = blob.parts()?;
        let hex_field = |name: &str, value: &str| {
            hex::decode(value).map_err(|e| CryptoError::Malformed(format!("{name}: {e}")))
        };
        let ciphertext = hex_field("ciphertext", &parts.ciphertext)?;
        let iv = hex_field("iv", &parts.iv)?;
        let salt = hex_field("salt", &parts.salt)?;

        if iv.len() != IV_LEN {
            return Err(CryptoError::Malformed(format!(
                "iv must be {IV_LEN} bytes, got {}",
                iv.len()
            )));
        }

        let key = self.derive_key(&salt);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&iv), ciphertext.as_slice())
            .map_err(|_| CryptoError::Decrypt)?;

        String::from_utf8(plaintext)
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::Utf8)
    }

    /// Keyed digest of a short secret (app-lock PIN), bound to this device.
    pub fn digest(&self, secret: &str) -> String {
        hex::encode(self.mac(secret).finalize().into_bytes())
    }

    /// Constant-time check of `secret` against a digest from [`DeviceCipher::digest`].
    pub fn verify_digest(&self, secret: &str, expected_hex: &str) -> bool {
        match hex::decode(expected_hex) {
            Ok(expected) => self.mac(secret).verify_slice(&expected).is_ok(),
            Err(_) => false,
        }
    }

    fn mac(&self, secret: &str) -> Hmac<Sha256> {
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(self.device_id.as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        mac.update(self.app_secret.as_bytes());
        mac.update(secret.as_bytes());
        mac
    }
}
