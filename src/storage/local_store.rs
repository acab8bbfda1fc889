// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encrypted key-value store.
//!
//! Every value is serialized to JSON, encrypted with the device-bound
//! [`DeviceCipher`], and handed to the backend as a base64 blob. Reads
//! reverse the pipeline. There is no decrypted cache at this layer.
//!
//! ## Failure Model
//!
//! - Writes return errors (backend or encryption failures)
//! - Reads never fail: a missing key, a blob from another device, or a value
//!   that no longer deserializes all come back as `None`, with a warning
//!   logged

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::backend::{KvBackend, StoreResult};
use super::keys::StorageKey;
use crate::crypto::{DeviceCipher, EncryptedBlob};

/// Device-bound encrypted store over a [`KvBackend`].
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KvBackend>,
    cipher: DeviceCipher,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("cipher", &self.cipher)
            .finish_non_exhaustive()
    }
}

impl LocalStore {
    /// Open the store, reusing the persisted device id or generating one on
    /// first launch.
    pub fn open(backend: Arc<dyn KvBackend>, app_secret: &str) -> StoreResult<Self> {
        let device_id = match backend.get(StorageKey::DeviceId.as_str())? {
            Some(id) if !id.is_empty() => id,
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                backend.set(StorageKey::DeviceId.as_str(), &id)?;
                info!(device_id = %id, "Generated new device id");
                id
            }
        };
        Ok(Self::new(backend, DeviceCipher::new(app_secret, device_id)))
    }

    /// Open the store bound to an identifier supplied by the platform.
    ///
    /// If the identifier differs from the persisted one, earlier blobs become
    /// unreadable.
    pub fn open_with_device_id(
        backend: Arc<dyn KvBackend>,
        app_secret: &str,
        device_id: &str,
    ) -> StoreResult<Self> {
        if let Some(previous) = backend.get(StorageKey::DeviceId.as_str())? {
            if previous != device_id {
                warn!(
                    previous = %previous,
                    current = %device_id,
                    "Device id changed; existing encrypted entries are unreadable"
                );
            }
        }
        backend.set(StorageKey::DeviceId.as_str(), device_id)?;
        Ok(Self::new(backend, DeviceCipher::new(app_secret, device_id)))
    }

    pub fn new(backend: Arc<dyn KvBackend>, cipher: DeviceCipher) -> Self {
        Self { backend, cipher }
    }

    pub fn cipher(&self) -> &DeviceCipher {
        &self.cipher
    }

    pub fn device_id(&self) -> &str {
        self.cipher.device_id()
    }

    /// Serialize, encrypt and persist `value` under `key`.
    pub fn set<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> StoreResult<()> {
        let json = zeroize::Zeroizing::new(serde_json::to_string(value)?);
        let blob = self.cipher.encrypt(&json)?;
        self.backend.set(key.as_str(), blob.as_str())?;
        debug!(key = %key, "Stored encrypted entry");
        Ok(())
    }

    /// Fetch, decrypt and deserialize the value under `key`.
    pub fn get<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = match self.backend.get(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Local store read failed");
                return None;
            }
        };

        let plaintext = match self.cipher.decrypt(&EncryptedBlob::from_stored(raw)) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!(key = %key, error = %e, "Could not decrypt stored entry");
                return None;
            }
        };

        match serde_json::from_str(&plaintext) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Could not deserialize stored entry");
                None
            }
        }
    }

    /// Whether an entry exists, without decrypting it.
    pub fn contains(&self, key: StorageKey) -> bool {
        matches!(self.backend.get(key.as_str()), Ok(Some(_)))
    }

    pub fn remove(&self, key: StorageKey) -> StoreResult<()> {
        self.backend.remove(key.as_str())
    }

    /// Delete everything except the `keep` entries.
    ///
    /// Reads back the kept raw values, clears the backend, then rewrites
    /// them. Not atomic: a failure during the rewrite loses the remaining
    /// kept entries.
    pub fn clear_except(&self, keep: &[StorageKey]) -> StoreResult<()> {
        let mut preserved = Vec::with_capacity(keep.len());
        for key in keep {
            if let Some(raw) = self.backend.get(key.as_str())? {
                preserved.push((*key, raw));
            }
        }

        self.backend.clear()?;

        for (key, raw) in &preserved {
            self.backend.set(key.as_str(), raw)?;
        }

        info!(kept = preserved.len(), "Cleared local store");
        Ok(())
    }
}
