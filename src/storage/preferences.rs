// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed accessors for user preferences kept in the local store.

use serde::{Deserialize, Serialize};

use super::backend::StoreResult;
use super::keys::StorageKey;
use super::local_store::LocalStore;

/// Maximum number of identifiers kept in the account history.
pub const ACCOUNT_HISTORY_LIMIT: usize = 5;

/// Default UI language.
pub const DEFAULT_LANGUAGE: &str = "vi";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundSettings {
    pub music: bool,
    pub effects: bool,
    /// 0-100
    pub volume: u8,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            music: true,
            effects: true,
            volume: 80,
        }
    }
}

/// Preference view over a [`LocalStore`].
pub struct Preferences<'a> {
    store: &'a LocalStore,
}

impl<'a> Preferences<'a> {
    pub fn new(store: &'a LocalStore) -> Self {
        Self { store }
    }

    pub fn language(&self) -> String {
        self.store
            .get(StorageKey::Language)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    pub fn set_language(&self, language: &str) -> StoreResult<()> {
        self.store.set(StorageKey::Language, language)
    }

    pub fn theme(&self) -> Theme {
        self.store.get(StorageKey::Theme).unwrap_or_default()
    }

    pub fn set_theme(&self, theme: Theme) -> StoreResult<()> {
        self.store.set(StorageKey::Theme, &theme)
    }

    pub fn sound(&self) -> SoundSettings {
        self.store.get(StorageKey::SoundSettings).unwrap_or_default()
    }

    pub fn set_sound(&self, mut settings: SoundSettings) -> StoreResult<()> {
        settings.volume = settings.volume.min(100);
        self.store.set(StorageKey::SoundSettings, &settings)
    }

    pub fn push_token(&self) -> Option<String> {
        self.store.get(StorageKey::PushToken)
    }

    pub fn set_push_token(&self, token: &str) -> StoreResult<()> {
        self.store.set(StorageKey::PushToken, token)
    }

    /// Login identifiers used on this device, most recent first.
    pub fn account_history(&self) -> Vec<String> {
        self.store.get(StorageKey::AccountHistory).unwrap_or_default()
    }

    /// Move `identifier` to the front of the history, capped at
    /// [`ACCOUNT_HISTORY_LIMIT`].
    pub fn record_account(&self, identifier: &str) -> StoreResult<()> {
        let mut history = self.account_history();
        history.retain(|existing| existing != identifier);
        history.insert(0, identifier.to_string());
        history.truncate(ACCOUNT_HISTORY_LIMIT);
        self.store.set(StorageKey::AccountHistory, &history)
    }

    pub fn forget_account(&self, identifier: &str) -> StoreResult<()> {
        let mut history = self.account_history();
        history.retain(|existing| existing != identifier);
        self.store.set(StorageKey::AccountHistory, &history)
    }
}
