// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Encrypted Local Storage
//!
//! Device-bound persistence for session material and preferences.
//!
//! ## Security Model
//!
//! - Every value is encrypted before it reaches the backend
//! - Keys are derived from the application secret and the device id
//! - A fresh salt and IV per write means equal values never look equal
//! - Entries copied to another device cannot be decrypted
//!
//! ## Layout
//!
//! ```text
//! LocalStore (serde_json + DeviceCipher)
//!   └─ KvBackend
//!        ├─ RedbBackend   (persistent, redb file)
//!        └─ MemoryBackend (ephemeral)
//! ```

pub mod backend;
pub mod keys;
pub mod local_store;
pub mod preferences;
pub mod redb_backend;

pub use backend::{KvBackend, MemoryBackend, StoreError, StoreResult};
pub use keys::StorageKey;
pub use local_store::LocalStore;
pub use preferences::{Preferences, SoundSettings, Theme};
pub use redb_backend::RedbBackend;
