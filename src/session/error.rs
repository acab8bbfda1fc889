// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session errors.

use crate::crypto::CryptoError;
use crate::rpc::RpcError;
use crate::storage::StoreError;

/// Why a login or restore did not produce a session.
///
/// The manager is back in `Unauthenticated` whenever one of these is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The backend rejected the identifier/secret pair.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Authentication succeeded but the profile read came back empty.
    #[error("no profile for user {user_id}")]
    EmptyProfile { user_id: i64 },

    /// A login is already running.
    #[error("login already in progress")]
    InProgress,

    /// Nothing persisted to restore from.
    #[error("no stored session")]
    NoStoredSession,

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl LoginError {
    pub fn error_code(&self) -> &'static str {
        match self {
            LoginError::InvalidCredentials => "invalid_credentials",
            LoginError::EmptyProfile { .. } => "empty_profile",
            LoginError::InProgress => "in_progress",
            LoginError::NoStoredSession => "no_stored_session",
            LoginError::Rpc(_) => "rpc",
            LoginError::Store(_) => "store",
            LoginError::Crypto(_) => "crypto",
        }
    }
}

/// App-lock failures.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("PIN must be {min} to {max} digits")]
    InvalidPin { min: usize, max: usize },

    #[error("biometric unlock is not enabled")]
    BiometricDisabled,

    #[error(transparent)]
    Store(#[from] StoreError),
}
