// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session record and the scope passed to every data-access call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use zeroize::Zeroizing;

use crate::crypto::{CryptoError, DeviceCipher, EncryptedBlob};

/// Authenticated identity. The secret is only ever held encrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub auth_token: EncryptedBlob,
    pub device_id: String,
}

/// Decrypted identity for one outgoing call.
pub struct Credentials {
    pub uid: i64,
    pub password: Zeroizing<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("uid", &self.uid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Explicit session context for data access.
///
/// Holds the session, the cipher that can unlock its secret, and a
/// cancellation token. Screens take a [`SessionScope::child`] and cancel it
/// when they go away; logout cancels the root, which cancels every child.
#[derive(Clone)]
pub struct SessionScope {
    session: Arc<Session>,
    cipher: DeviceCipher,
    cancel: CancellationToken,
}

impl std::fmt::Debug for SessionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionScope")
            .field("user_id", &self.session.user_id)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl SessionScope {
    pub fn new(session: Session, cipher: DeviceCipher) -> Self {
        Self {
            session: Arc::new(session),
            cipher,
            cancel: CancellationToken::new(),
        }
    }

    /// Encrypt `secret` and build a scope around it.
    pub fn establish(user_id: i64, secret: &str, cipher: DeviceCipher) -> Result<Self, CryptoError> {
        let session = Session {
            user_id,
            auth_token: cipher.encrypt(secret)?,
            device_id: cipher.device_id().to_string(),
        };
        Ok(Self::new(session, cipher))
    }

    pub fn user_id(&self) -> i64 {
        self.session.user_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Decrypt the session secret for a single call.
    pub fn credentials(&self) -> Result<Credentials, CryptoError> {
        Ok(Credentials {
            uid: self.session.user_id,
            password: self.cipher.decrypt(&self.session.auth_token)?,
        })
    }

    /// Scope sharing this session whose cancellation does not affect the
    /// parent.
    pub fn child(&self) -> SessionScope {
        Self {
            session: Arc::clone(&self.session),
            cipher: self.cipher.clone(),
            cancel: self.cancel.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> SessionScope {
        SessionScope::establish(1, "s3cret", DeviceCipher::new("app", "device")).unwrap()
    }

    #[test]
    fn secret_is_encrypted_in_session() {
        let scope = scope();
        assert!(!scope.session().auth_token.as_str().contains("s3cret"));
        assert_eq!(scope.session().device_id, "device");

        let creds = scope.credentials().unwrap();
        assert_eq!(creds.uid, 1);
        assert_eq!(creds.password.as_str(), "s3cret");
        assert!(!format!("{creds:?}").contains("s3cret"));
    }

    #[test]
    fn child_cancellation_is_one_way() {
        let root = scope();
        let screen = root.child();
        screen.cancel();
        assert!(screen.is_cancelled());
        assert!(!root.is_cancelled());

        let other = root.child();
        root.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn wrong_device_cannot_unlock_session() {
        let scope = scope();
        let moved = SessionScope::new(scope.session().clone(), DeviceCipher::new("app", "other"));
        assert!(moved.credentials().is_err());
    }
}
