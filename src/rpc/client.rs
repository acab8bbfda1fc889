// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generic JSON-RPC client for the object-relational backend.
//!
//! ## Call Flow
//!
//! 1. Require a [`SessionScope`]; without one the call fails before any I/O
//! 2. Decrypt the session secret for this call only
//! 3. Build an `object.execute_kw` envelope with a fresh request id
//! 4. Post it, racing the scope's cancellation token
//! 5. Server error envelope: alert the user once, fail with the message
//! 6. Success: `result`, or `true` when the reply had none
//!
//! There is no retry. A failed call stays failed until the user triggers
//! it again.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::domain::{Domain, SearchOptions};
use super::envelope::{parse_reply, Envelope, ReplyOutcome, RequestIds, Service};
use super::error::{RpcError, RpcResult, TransportError};
use super::transport::{HttpTransport, Transport};
use crate::config::{ClientConfig, ServiceAccount};
use crate::normalize::Record;
use crate::presenter::Presenter;
use crate::session::SessionScope;

/// Model queried by the unauthenticated version check.
pub const APP_VERSION_MODEL: &str = "mobile.app.version";

/// Method queried by the unauthenticated version check.
pub const APP_VERSION_METHOD: &str = "get_latest_version";

/// One model method invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub model: String,
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

impl Call {
    pub fn new(model: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            method: method.into(),
            args: Vec::new(),
            kwargs: Map::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.to_string(), value.into());
        self
    }

    fn options(mut self, options: &SearchOptions) -> Self {
        options.apply(&mut self.kwargs);
        self
    }
}

/// JSON-RPC client bound to one backend database.
pub struct RpcClient {
    database: String,
    service_account: ServiceAccount,
    transport: Arc<dyn Transport>,
    presenter: Arc<dyn Presenter>,
    ids: RequestIds,
}

impl RpcClient {
    pub fn new(
        database: impl Into<String>,
        service_account: ServiceAccount,
        transport: Arc<dyn Transport>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            database: database.into(),
            service_account,
            transport,
            presenter,
            ids: RequestIds::new(),
        }
    }

    /// Client over HTTP using the configured endpoint.
    pub fn from_config(
        config: &ClientConfig,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.rpc_url.clone(), config.rpc_timeout)?;
        Ok(Self::new(
            config.database.clone(),
            config.service_account.clone(),
            Arc::new(transport),
            presenter,
        ))
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Invoke `call.method` on `call.model` as the scope's user.
    pub async fn call(&self, scope: Option<&SessionScope>, call: Call) -> RpcResult<Value> {
        let Some(scope) = scope else {
            debug!(model = %call.model, method = %call.method, "RPC call without session skipped");
            return Err(RpcError::NoSession);
        };
        if scope.is_cancelled() {
            return Err(RpcError::Cancelled);
        }

        let credentials = scope.credentials().map_err(|e| {
            warn!(user_id = scope.user_id(), error = %e, "Could not unlock session secret");
            RpcError::from(e)
        })?;

        let envelope = Envelope::execute_kw(
            self.ids.next_id(),
            &self.database,
            credentials.uid,
            &credentials.password,
            &call.model,
            &call.method,
            call.args,
            call.kwargs,
        );
        drop(credentials);

        debug!(
            request_id = envelope.id,
            model = %call.model,
            method = %call.method,
            "RPC call"
        );
        self.dispatch(envelope, Some(scope.cancellation())).await
    }

    /// `common.authenticate`: the user's uid, or `None` for bad credentials.
    pub async fn authenticate(&self, login: &str, password: &str) -> RpcResult<Option<i64>> {
        let envelope = Envelope::new(
            self.ids.next_id(),
            Service::Common,
            "authenticate",
            vec![
                Value::from(self.database.as_str()),
                Value::from(login),
                Value::from(password),
                Value::Object(Map::new()),
            ],
        );
        debug!(request_id = envelope.id, "RPC authenticate");

        match self.dispatch(envelope, None).await? {
            Value::Number(uid) => Ok(uid.as_i64()),
            Value::Bool(false) | Value::Null => Ok(None),
            other => Err(RpcError::Decode(format!("authenticate returned {other}"))),
        }
    }

    /// Latest published app version, queried as the service account.
    ///
    /// The only object call allowed without a session.
    pub async fn check_app_version(&self, platform: &str) -> RpcResult<Value> {
        let envelope = Envelope::execute_kw(
            self.ids.next_id(),
            &self.database,
            self.service_account.uid,
            &self.service_account.password,
            APP_VERSION_MODEL,
            APP_VERSION_METHOD,
            vec![Value::from(platform)],
            Map::new(),
        );
        debug!(request_id = envelope.id, platform = %platform, "RPC app version check");
        self.dispatch(envelope, None).await
    }

    pub async fn read(
        &self,
        scope: Option<&SessionScope>,
        model: &str,
        ids: &[i64],
        fields: &[&str],
    ) -> RpcResult<Vec<Value>> {
        let call = Call::new(model, "read")
            .arg(ids.to_vec())
            .kwarg("fields", fields.to_vec());
        expect_list(self.call(scope, call).await?)
    }

    /// Create a record; returns its id.
    pub async fn create(
        &self,
        scope: Option<&SessionScope>,
        model: &str,
        values: Record,
    ) -> RpcResult<i64> {
        let call = Call::new(model, "create").arg(Value::Object(values));
        let value = self.call(scope, call).await?;
        value
            .as_i64()
            .ok_or_else(|| RpcError::Decode(format!("create returned {value}")))
    }

    pub async fn write(
        &self,
        scope: Option<&SessionScope>,
        model: &str,
        ids: &[i64],
        values: Record,
    ) -> RpcResult<bool> {
        let call = Call::new(model, "write")
            .arg(ids.to_vec())
            .arg(Value::Object(values));
        Ok(truthy(&self.call(scope, call).await?))
    }

    pub async fn unlink(
        &self,
        scope: Option<&SessionScope>,
        model: &str,
        ids: &[i64],
    ) -> RpcResult<bool> {
        let call = Call::new(model, "unlink").arg(ids.to_vec());
        Ok(truthy(&self.call(scope, call).await?))
    }

    pub async fn search(
        &self,
        scope: Option<&SessionScope>,
        model: &str,
        domain: Domain,
        options: &SearchOptions,
    ) -> RpcResult<Vec<i64>> {
        let call = Call::new(model, "search")
            .arg(domain.into_value())
            .options(options);
        expect_list(self.call(scope, call).await?)?
            .into_iter()
            .map(|id| {
                id.as_i64()
                    .ok_or_else(|| RpcError::Decode(format!("search returned non-id {id}")))
            })
            .collect()
    }

    pub async fn search_read(
        &self,
        scope: Option<&SessionScope>,
        model: &str,
        domain: Domain,
        fields: &[&str],
        options: &SearchOptions,
    ) -> RpcResult<Vec<Value>> {
        let call = Call::new(model, "search_read")
            .arg(domain.into_value())
            .kwarg("fields", fields.to_vec())
            .options(options);
        expect_list(self.call(scope, call).await?)
    }

    pub async fn search_count(
        &self,
        scope: Option<&SessionScope>,
        model: &str,
        domain: Domain,
    ) -> RpcResult<u64> {
        let call = Call::new(model, "search_count").arg(domain.into_value());
        let value = self.call(scope, call).await?;
        value
            .as_u64()
            .ok_or_else(|| RpcError::Decode(format!("search_count returned {value}")))
    }

    async fn dispatch(
        &self,
        envelope: Envelope,
        cancel: Option<&CancellationToken>,
    ) -> RpcResult<Value> {
        let request_id = envelope.id;
        let reply = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(request_id, "RPC call cancelled");
                        return Err(RpcError::Cancelled);
                    }
                    reply = self.transport.post(&envelope) => reply,
                }
            }
            None => self.transport.post(&envelope).await,
        };

        let body = reply.map_err(|e| {
            warn!(request_id, error = %e, "RPC transport failure");
            RpcError::from(e)
        })?;

        match parse_reply(body)? {
            ReplyOutcome::Success(result) => Ok(result),
            ReplyOutcome::Fault(fault) => {
                let message = fault.user_message();
                warn!(
                    request_id,
                    code = ?fault.code,
                    error = %message,
                    "RPC server error"
                );
                self.presenter.alert(&message).await;
                Err(RpcError::Server { message })
            }
        }
    }
}

fn expect_list(value: Value) -> RpcResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(RpcError::Decode(format!("expected a list, got {other}"))),
    }
}

fn truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}
