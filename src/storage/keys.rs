// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Closed enumeration of local-store keys.
//!
//! The string forms are the persisted schema; there is no migration layer,
//! so they must never change.

/// Every key the client persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    /// Profile of the logged-in user.
    AuthData,
    /// Session secret (encrypted).
    AuthToken,
    /// Session record: uid and device binding.
    Session,
    Language,
    Theme,
    SoundSettings,
    /// Login identifiers used on this device, most recent first.
    AccountHistory,
    BiometricEnabled,
    /// Keyed digest of the app-lock PIN.
    AppLockPin,
    /// Push-notification registration token.
    PushToken,
    /// Device identifier used for key derivation. Stored in clear.
    DeviceId,
}

impl StorageKey {
    pub const ALL: [StorageKey; 11] = [
        StorageKey::AuthData,
        StorageKey::AuthToken,
        StorageKey::Session,
        StorageKey::Language,
        StorageKey::Theme,
        StorageKey::SoundSettings,
        StorageKey::AccountHistory,
        StorageKey::BiometricEnabled,
        StorageKey::AppLockPin,
        StorageKey::PushToken,
        StorageKey::DeviceId,
    ];

    /// Keys that survive logout.
    ///
    /// The device id is included as well: dropping it would orphan the
    /// surviving encrypted entries.
    pub const LOGOUT_ALLOW_LIST: [StorageKey; 4] = [
        StorageKey::Language,
        StorageKey::PushToken,
        StorageKey::BiometricEnabled,
        StorageKey::DeviceId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AuthData => "auth_data",
            StorageKey::AuthToken => "auth_token",
            StorageKey::Session => "session",
            StorageKey::Language => "language",
            StorageKey::Theme => "theme",
            StorageKey::SoundSettings => "sound_settings",
            StorageKey::AccountHistory => "account_history",
            StorageKey::BiometricEnabled => "biometric_enabled",
            StorageKey::AppLockPin => "app_lock_pin",
            StorageKey::PushToken => "push_token",
            StorageKey::DeviceId => "device_id",
        }
    }

    pub fn parse(raw: &str) -> Option<StorageKey> {
        StorageKey::ALL.into_iter().find(|key| key.as_str() == raw)
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
