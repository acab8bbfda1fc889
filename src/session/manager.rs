// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login/logout lifecycle.
//!
//! ## State Machine
//!
//! ```text
//! Unauthenticated ──login()──▶ Authenticating ──ok──▶ Authenticated
//!        ▲                          │                      │
//!        └──────────error───────────┘                      │
//!        └─────────────────────logout()────────────────────┘
//! ```
//!
//! The in-memory session lives only inside the [`SessionScope`] handed out
//! by [`SessionManager::login`] / [`SessionManager::restore`]. Callers pass
//! that scope explicitly to every data-access call.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::error::LoginError;
use super::scope::{Session, SessionScope};
use crate::adapters::{UserProfile, Users};
use crate::presenter::Presenter;
use crate::rpc::RpcClient;
use crate::storage::{LocalStore, Preferences, StorageKey, StoreResult};

pub const LOGOUT_PROMPT: &str = "Do you want to log out?";

/// Keys that make up a persisted session; dropped together when a login
/// fails.
const SESSION_KEYS: [StorageKey; 3] = [
    StorageKey::AuthToken,
    StorageKey::AuthData,
    StorageKey::Session,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

struct Inner {
    state: AuthState,
    scope: Option<SessionScope>,
    profile: Option<UserProfile>,
}

/// Owns the session lifecycle and its persisted state.
pub struct SessionManager {
    rpc: Arc<RpcClient>,
    store: LocalStore,
    inner: RwLock<Inner>,
}

impl SessionManager {
    pub fn new(rpc: Arc<RpcClient>, store: LocalStore) -> Self {
        Self {
            rpc,
            store,
            inner: RwLock::new(Inner {
                state: AuthState::Unauthenticated,
                scope: None,
                profile: None,
            }),
        }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub async fn state(&self) -> AuthState {
        self.inner.read().await.state
    }

    /// Root scope of the current session.
    pub async fn scope(&self) -> Option<SessionScope> {
        self.inner.read().await.scope.clone()
    }

    /// Authenticate, fetch the profile and persist the session.
    ///
    /// Any failure leaves the manager `Unauthenticated`.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<SessionScope, LoginError> {
        {
            let mut inner = self.inner.write().await;
            if inner.state == AuthState::Authenticating {
                return Err(LoginError::InProgress);
            }
            if let Some(previous) = inner.scope.take() {
                previous.cancel();
            }
            inner.profile = None;
            inner.state = AuthState::Authenticating;
        }

        let outcome = self.authenticate(identifier, secret).await;

        let mut inner = self.inner.write().await;
        match outcome {
            Ok((scope, profile)) => {
                info!(user_id = scope.user_id(), role = %profile.role, "Login succeeded");
                inner.state = AuthState::Authenticated;
                inner.scope = Some(scope.clone());
                inner.profile = Some(profile);
                Ok(scope)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Login failed");
                inner.state = AuthState::Unauthenticated;
                self.forget_persisted_session();
                Err(e)
            }
        }
    }

    async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<(SessionScope, UserProfile), LoginError> {
        let user_id = self
            .rpc
            .authenticate(identifier, secret)
            .await?
            .ok_or(LoginError::InvalidCredentials)?;

        let scope = SessionScope::establish(user_id, secret, self.store.cipher().clone())?;
        let profile = Users::new(&self.rpc, &scope)
            .profile(user_id)
            .await?
            .ok_or(LoginError::EmptyProfile { user_id })?;

        self.store.set(StorageKey::AuthData, &profile)?;
        self.store.set(StorageKey::AuthToken, secret)?;
        self.store.set(StorageKey::Session, scope.session())?;

        if let Err(e) = Preferences::new(&self.store).record_account(identifier) {
            warn!(error = %e, "Could not record account history");
        }
        Ok((scope, profile))
    }

    fn forget_persisted_session(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.store.remove(key) {
                warn!(key = %key, error = %e, "Could not drop stale session entry");
            }
        }
    }

    /// Rebuild the session from persisted state, e.g. at app start.
    pub async fn restore(&self) -> Result<SessionScope, LoginError> {
        let session: Session = self
            .store
            .get(StorageKey::Session)
            .ok_or(LoginError::NoStoredSession)?;
        if session.device_id != self.store.device_id() || !self.is_authenticated() {
            debug!(user_id = session.user_id, "Stored session is not usable on this device");
            return Err(LoginError::NoStoredSession);
        }

        let scope = SessionScope::new(session, self.store.cipher().clone());
        scope.credentials()?;
        let profile: Option<UserProfile> = self.store.get(StorageKey::AuthData);

        let mut inner = self.inner.write().await;
        if let Some(previous) = inner.scope.replace(scope.clone()) {
            previous.cancel();
        }
        inner.state = AuthState::Authenticated;
        inner.profile = profile;
        info!(user_id = scope.user_id(), "Session restored");
        Ok(scope)
    }

    /// Ask for confirmation, then end the session.
    ///
    /// Returns `false` when the user declined. In-flight calls of the
    /// session are cancelled and the store is wiped except
    /// [`StorageKey::LOGOUT_ALLOW_LIST`].
    pub async fn logout(&self, presenter: &dyn Presenter) -> StoreResult<bool> {
        if !presenter.confirm(LOGOUT_PROMPT).await {
            debug!("Logout declined");
            return Ok(false);
        }

        let previous = {
            let mut inner = self.inner.write().await;
            inner.state = AuthState::Unauthenticated;
            inner.profile = None;
            inner.scope.take()
        };
        if let Some(scope) = &previous {
            scope.cancel();
        }

        self.store.clear_except(&StorageKey::LOGOUT_ALLOW_LIST)?;
        info!(
            user_id = previous.as_ref().map(|s| s.user_id()),
            "Logged out"
        );
        presenter.show_login();
        Ok(true)
    }

    /// Whether a decryptable session token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.store
            .get::<String>(StorageKey::AuthToken)
            .map(zeroize::Zeroizing::new)
            .is_some()
    }

    /// Profile of the logged-in user.
    pub async fn auth_data(&self) -> Option<UserProfile> {
        if let Some(profile) = self.inner.read().await.profile.clone() {
            return Some(profile);
        }
        self.store.get(StorageKey::AuthData)
    }

    /// Replace the stored profile wholesale.
    pub async fn replace_auth_data(&self, profile: UserProfile) -> StoreResult<()> {
        self.store.set(StorageKey::AuthData, &profile)?;
        self.inner.write().await.profile = Some(profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceAccount;
    use crate::presenter::testing::RecordingPresenter;
    use crate::rpc::transport::testing::ScriptedTransport;
    use crate::rpc::{Call, RpcError};
    use crate::session::Role;
    use crate::storage::{KvBackend, MemoryBackend};
    use serde_json::json;
    use zeroize::Zeroizing;

    struct Harness {
        manager: SessionManager,
        transport: Arc<ScriptedTransport>,
        presenter: Arc<RecordingPresenter>,
    }

    fn harness() -> Harness {
        let transport = Arc::new(ScriptedTransport::new());
        let presenter = Arc::new(RecordingPresenter::new());
        let rpc = RpcClient::new(
            "wellbeing",
            ServiceAccount {
                uid: 2,
                password: Zeroizing::new("portal".into()),
            },
            transport.clone(),
            presenter.clone(),
        );
        let store = LocalStore::open(Arc::new(MemoryBackend::new()), "app-secret").unwrap();
        Harness {
            manager: SessionManager::new(Arc::new(rpc), store),
            transport,
            presenter,
        }
    }

    fn script_login(transport: &ScriptedTransport) {
        transport.push_result(json!(1));
        transport.push_result(json!([{
            "id": 1,
            "name": "Nguyen An",
            "login": "0964164434",
            "role": "student",
            "partner_id": [11, "Nguyen An"],
            "school_id": false,
            "class_id": false
        }]));
    }

    #[tokio::test]
    async fn login_persists_session() {
        let h = harness();
        script_login(&h.transport);
        assert!(!h.manager.is_authenticated());

        let scope = h.manager.login("0964164434", "s3cret").await.unwrap();
        assert_eq!(scope.user_id(), 1);
        assert!(h.manager.is_authenticated());
        assert_eq!(h.manager.state().await, AuthState::Authenticated);

        let profile = h.manager.auth_data().await.unwrap();
        assert_eq!(profile.name, "Nguyen An");
        assert_eq!(profile.role, Role::Student);

        // profile read is authenticated with the new session
        let read = &h.transport.sent()[1]["params"]["args"];
        assert_eq!(read[1], json!(1));
        assert_eq!(read[2], json!("s3cret"));

        assert_eq!(
            Preferences::new(h.manager.store()).account_history(),
            vec!["0964164434".to_string()]
        );
    }

    #[tokio::test]
    async fn token_is_never_stored_in_clear() {
        let backend = Arc::new(MemoryBackend::new());
        let transport = Arc::new(ScriptedTransport::new());
        let rpc = RpcClient::new(
            "wellbeing",
            ServiceAccount {
                uid: 2,
                password: Zeroizing::new("portal".into()),
            },
            transport.clone(),
            Arc::new(RecordingPresenter::new()),
        );
        let store = LocalStore::open(backend.clone(), "app-secret").unwrap();
        let manager = SessionManager::new(Arc::new(rpc), store);
        script_login(&transport);
        manager.login("0964164434", "s3cret").await.unwrap();

        for key in backend.keys().unwrap() {
            let raw = backend.get(&key).unwrap().unwrap();
            assert!(!raw.contains("s3cret"), "{key} leaks the secret");
        }
    }

    #[tokio::test]
    async fn bad_credentials_stay_unauthenticated() {
        let h = harness();
        h.transport.push_result(json!(false));

        let err = h.manager.login("0964164434", "wrong").await.unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));
        assert_eq!(h.manager.state().await, AuthState::Unauthenticated);
        assert!(!h.manager.is_authenticated());
        assert_eq!(h.transport.calls(), 1);
    }

    #[tokio::test]
    async fn failed_relogin_drops_previous_session() {
        let h = harness();
        script_login(&h.transport);
        h.manager.login("0964164434", "s3cret").await.unwrap();
        h.transport.push_result(json!(false));

        let err = h.manager.login("0964164434", "wrong").await.unwrap_err();
        assert!(matches!(err, LoginError::InvalidCredentials));
        assert_eq!(h.manager.state().await, AuthState::Unauthenticated);
        assert!(!h.manager.is_authenticated());
        assert!(h.manager.auth_data().await.is_none());
        assert!(matches!(
            h.manager.restore().await,
            Err(LoginError::NoStoredSession)
        ));
        assert_eq!(
            Preferences::new(h.manager.store()).account_history(),
            vec!["0964164434".to_string()]
        );
    }

    #[tokio::test]
    async fn empty_profile_fails_login() {
        let h = harness();
        h.transport.push_result(json!(1));
        h.transport.push_result(json!([]));

        let err = h.manager.login("0964164434", "s3cret").await.unwrap_err();
        assert!(matches!(err, LoginError::EmptyProfile { user_id: 1 }));
        assert!(!h.manager.is_authenticated());
        assert!(h.manager.auth_data().await.is_none());
    }

    #[tokio::test]
    async fn server_error_during_login_is_alerted() {
        let h = harness();
        h.transport
            .push_reply(json!({"error": {"data": {"message": "Database not found"}}}));

        let err = h.manager.login("0964164434", "s3cret").await.unwrap_err();
        assert!(matches!(err, LoginError::Rpc(RpcError::Server { .. })));
        assert_eq!(h.presenter.alerts(), vec!["Database not found".to_string()]);
    }

    #[tokio::test]
    async fn logout_wipes_all_but_allow_list() {
        let h = harness();
        script_login(&h.transport);
        let scope = h.manager.login("0964164434", "s3cret").await.unwrap();
        let screen = scope.child();

        let prefs = Preferences::new(h.manager.store());
        prefs.set_language("en").unwrap();
        prefs.set_push_token("push-123").unwrap();
        h.manager
            .store()
            .set(StorageKey::BiometricEnabled, &true)
            .unwrap();

        assert!(h.manager.logout(h.presenter.as_ref()).await.unwrap());

        assert!(!h.manager.is_authenticated());
        assert!(h.manager.auth_data().await.is_none());
        assert!(h.manager.scope().await.is_none());
        assert!(scope.is_cancelled());
        assert!(screen.is_cancelled());
        assert_eq!(h.presenter.login_shown(), 1);

        assert_eq!(prefs.language(), "en");
        assert_eq!(prefs.push_token().as_deref(), Some("push-123"));
        assert_eq!(
            h.manager.store().get::<bool>(StorageKey::BiometricEnabled),
            Some(true)
        );
        assert!(prefs.account_history().is_empty());
        assert!(!h.manager.store().contains(StorageKey::Session));
    }

    #[tokio::test]
    async fn declined_logout_keeps_session() {
        let h = harness();
        script_login(&h.transport);
        h.manager.login("0964164434", "s3cret").await.unwrap();

        let declining = RecordingPresenter::declining();
        assert!(!h.manager.logout(&declining).await.unwrap());
        assert!(h.manager.is_authenticated());
        assert_eq!(declining.login_shown(), 0);
    }

    #[tokio::test]
    async fn calls_after_logout_are_refused() {
        let h = harness();
        script_login(&h.transport);
        let scope = h.manager.login("0964164434", "s3cret").await.unwrap();
        h.manager.logout(h.presenter.as_ref()).await.unwrap();

        let sent_before = h.transport.calls();
        let err = h
            .manager
            .rpc()
            .call(Some(&scope), Call::new("project.task", "search"))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Cancelled));
        assert_eq!(h.transport.calls(), sent_before);
    }

    #[tokio::test]
    async fn restore_rebuilds_scope() {
        let backend = Arc::new(MemoryBackend::new());
        let make = |transport: Arc<ScriptedTransport>| {
            let rpc = RpcClient::new(
                "wellbeing",
                ServiceAccount {
                    uid: 2,
                    password: Zeroizing::new("portal".into()),
                },
                transport,
                Arc::new(RecordingPresenter::new()),
            );
            let store = LocalStore::open(backend.clone(), "app-secret").unwrap();
            SessionManager::new(Arc::new(rpc), store)
        };

        let transport = Arc::new(ScriptedTransport::new());
        script_login(&transport);
        make(transport).login("0964164434", "s3cret").await.unwrap();

        let restarted = make(Arc::new(ScriptedTransport::new()));
        assert_eq!(restarted.state().await, AuthState::Unauthenticated);
        let scope = restarted.restore().await.unwrap();
        assert_eq!(scope.user_id(), 1);
        assert_eq!(scope.credentials().unwrap().password.as_str(), "s3cret");
        assert_eq!(restarted.state().await, AuthState::Authenticated);
        assert_eq!(restarted.auth_data().await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn restore_without_session_fails() {
        let h = harness();
        let err = h.manager.restore().await.unwrap_err();
        assert!(matches!(err, LoginError::NoStoredSession));
        assert_eq!(h.manager.state().await, AuthState::Unauthenticated);
    }
}
