// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! App lock: PIN and biometric unlock.
//!
//! The PIN itself is never stored. A device-keyed HMAC digest of it is
//! written through the encrypted store and compared in constant time.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::LockError;
use crate::storage::{LocalStore, StorageKey, StoreResult};

pub const PIN_MIN_LEN: usize = 4;
pub const PIN_MAX_LEN: usize = 6;

pub const BIOMETRIC_REASON: &str = "Unlock the app";

/// Native biometric prompt.
#[async_trait]
pub trait BiometricVerifier: Send + Sync {
    /// Whether the device has enrolled biometrics.
    async fn is_available(&self) -> bool;

    /// Prompt the user; `true` on a successful match.
    async fn verify(&self, reason: &str) -> bool;
}

pub struct AppLock<'a> {
    store: &'a LocalStore,
}

impl<'a> AppLock<'a> {
    pub fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    pub fn has_pin(&self) -> bool {
        self.store.contains(StorageKey::AppLockPin)
    }

    pub fn set_pin(&self, pin: &str) -> Result<(), LockError> {
        if !is_valid_pin(pin) {
            return Err(LockError::InvalidPin {
                min: PIN_MIN_LEN,
                max: PIN_MAX_LEN,
            });
        }
        let digest = self.store.cipher().digest(pin);
        self.store.set(StorageKey::AppLockPin, &digest)?;
        debug!("App-lock PIN set");
        Ok(())
    }

    /// `false` when no PIN is set or it does not match.
    pub fn verify_pin(&self, pin: &str) -> bool {
        let Some(digest) = self.store.get::<String>(StorageKey::AppLockPin) else {
            return false;
        };
        let matches = self.store.cipher().verify_digest(pin, &digest);
        if !matches {
            warn!("App-lock PIN mismatch");
        }
        matches
    }

    /// Remove the PIN and turn biometric unlock off with it.
    pub fn disable(&self) -> StoreResult<()> {
        self.store.remove(StorageKey::AppLockPin)?;
        self.store.set(StorageKey::BiometricEnabled, &false)
    }

    pub fn biometric_enabled(&self) -> bool {
        self.store
            .get(StorageKey::BiometricEnabled)
            .unwrap_or(false)
    }

    /// Enable biometric unlock after a successful prompt; disabling needs
    /// no prompt. Returns the resulting flag.
    pub async fn set_biometric_enabled(
        &self,
        enabled: bool,
        verifier: &dyn BiometricVerifier,
    ) -> StoreResult<bool> {
        if enabled && !(verifier.is_available().await && verifier.verify(BIOMETRIC_REASON).await) {
            debug!("Biometric enrolment not confirmed");
            return Ok(self.biometric_enabled());
        }
        self.store.set(StorageKey::BiometricEnabled, &enabled)?;
        Ok(enabled)
    }

    pub async fn unlock_with_biometric(
        &self,
        verifier: &dyn BiometricVerifier,
    ) -> Result<bool, LockError> {
        if !self.biometric_enabled() {
            return Err(LockError::BiometricDisabled);
        }
        if !verifier.is_available().await {
            warn!("Biometric unlock enabled but unavailable on device");
            return Ok(false);
        }
        Ok(verifier.verify(BIOMETRIC_REASON).await)
    }
}

fn is_valid_pin(pin: &str) -> bool {
    (PIN_MIN_LEN..=PIN_MAX_LEN).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeBiometric {
        available: bool,
        matches: bool,
        prompts: AtomicUsize,
    }

    impl FakeBiometric {
        fn new(available: bool, matches: bool) -> Self {
            Self {
                available,
                matches,
                prompts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BiometricVerifier for FakeBiometric {
        async fn is_available(&self) -> bool {
            self.available
        }

        async fn verify(&self, _reason: &str) -> bool {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            self.matches
        }
    }

    fn store() -> LocalStore {
        LocalStore::open(Arc::new(MemoryBackend::new()), "app-secret").unwrap()
    }

    #[test]
    fn pin_set_and_verify() {
        let store = store();
        let lock = AppLock::new(&store);
        assert!(!lock.verify_pin("1234"));

        lock.set_pin("1234").unwrap();
        assert!(lock.has_pin());
        assert!(lock.verify_pin("1234"));
        assert!(!lock.verify_pin("4321"));
    }

    #[test]
    fn malformed_pins_rejected() {
        let store = store();
        let lock = AppLock::new(&store);
        for pin in ["123", "1234567", "12a4", ""] {
            assert!(matches!(lock.set_pin(pin), Err(LockError::InvalidPin { .. })));
        }
        assert!(!lock.has_pin());
    }

    #[test]
    fn disable_clears_pin_and_biometric() {
        let store = store();
        let lock = AppLock::new(&store);
        lock.set_pin("123456").unwrap();
        store.set(StorageKey::BiometricEnabled, &true).unwrap();

        lock.disable().unwrap();
        assert!(!lock.has_pin());
        assert!(!lock.biometric_enabled());
    }

    #[tokio::test]
    async fn biometric_enable_requires_match() {
        let store = store();
        let lock = AppLock::new(&store);

        let rejecting = FakeBiometric::new(true, false);
        assert!(!lock.set_biometric_enabled(true, &rejecting).await.unwrap());
        assert!(!lock.biometric_enabled());

        let accepting = FakeBiometric::new(true, true);
        assert!(lock.set_biometric_enabled(true, &accepting).await.unwrap());
        assert!(lock.biometric_enabled());

        assert!(!lock.set_biometric_enabled(false, &rejecting).await.unwrap());
        assert!(!lock.biometric_enabled());
    }

    #[tokio::test]
    async fn biometric_unlock_gated_by_flag() {
        let store = store();
        let lock = AppLock::new(&store);
        let verifier = FakeBiometric::new(true, true);

        assert!(matches!(
            lock.unlock_with_biometric(&verifier).await,
            Err(LockError::BiometricDisabled)
        ));
        assert_eq!(verifier.prompts.load(Ordering::SeqCst), 0);

        store.set(StorageKey::BiometricEnabled, &true).unwrap();
        assert!(lock.unlock_with_biometric(&verifier).await.unwrap());

        let unavailable = FakeBiometric::new(false, true);
        assert!(!lock.unlock_with_biometric(&unavailable).await.unwrap());
        assert_eq!(unavailable.prompts.load(Ordering::SeqCst), 0);
    }
}
