// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC envelope construction and reply parsing.
//!
//! ## Wire Format
//!
//! ```text
//! {
//!   "id": 1710000000000,
//!   "jsonrpc": "2.0",
//!   "method": "call",
//!   "params": {
//!     "service": "object",
//!     "method": "execute_kw",
//!     "args": [database, uid, password, model, method, args, kwargs]
//!   }
//! }
//! ```
//!
//! A reply with a non-null `error` member is a fault. Otherwise `result` is
//! returned as sent, `null` included; a reply without the key yields `true`.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::RpcError;

pub const JSONRPC_VERSION: &str = "2.0";

/// Top-level JSON-RPC method; the backend dispatches on `params`.
pub const ENVELOPE_METHOD: &str = "call";

/// Object-service method used for every model call.
pub const EXECUTE_KW: &str = "execute_kw";

/// Backend service addressed by an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Login and version endpoints.
    Common,
    /// Model method execution.
    Object,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Common => "common",
            Service::Object => "object",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Params {
    pub service: &'static str,
    pub method: String,
    pub args: Vec<Value>,
}

/// One JSON-RPC request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Envelope {
    pub id: u64,
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: Params,
}

impl Envelope {
    pub fn new(id: u64, service: Service, method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            id,
            jsonrpc: JSONRPC_VERSION,
            method: ENVELOPE_METHOD,
            params: Params {
                service: service.as_str(),
                method: method.into(),
                args,
            },
        }
    }

    /// `object.execute_kw` envelope for a model method.
    #[allow(clippy::too_many_arguments)]
    pub fn execute_kw(
        id: u64,
        database: &str,
        uid: i64,
        password: &str,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Self {
        Self::new(
            id,
            Service::Object,
            EXECUTE_KW,
            vec![
                Value::from(database),
                Value::from(uid),
                Value::from(password),
                Value::from(model),
                Value::from(method),
                Value::Array(args),
                Value::Object(kwargs),
            ],
        )
    }
}

/// Error object of a failed reply.
///
/// Read field by field: a mistyped member is dropped, never the fault.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerFault {
    /// Numeric or string code, as sent.
    pub code: Option<Value>,
    pub message: Option<String>,
    pub data: Option<FaultData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaultData {
    pub name: Option<String>,
    pub message: Option<String>,
}

fn text(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

impl ServerFault {
    pub fn from_value(error: &Value) -> Self {
        Self {
            code: error.get("code").filter(|code| !code.is_null()).cloned(),
            message: text(error, "message"),
            data: error
                .get("data")
                .filter(|data| data.is_object())
                .map(|data| FaultData {
                    name: text(data, "name"),
                    message: text(data, "message"),
                }),
        }
    }

    /// Message to show the user: `data.message`, then `message`.
    pub fn user_message(&self) -> String {
        self.data
            .as_ref()
            .and_then(|data| data.message.clone())
            .filter(|message| !message.trim().is_empty())
            .or_else(|| self.message.clone())
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| "Unknown server error".to_string())
    }
}

/// Parsed reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyOutcome {
    /// `result` as sent (`null` included), or `true` when the key is absent.
    Success(Value),
    Fault(ServerFault),
}

pub fn parse_reply(body: Value) -> Result<ReplyOutcome, RpcError> {
    let mut reply = match body {
        Value::Object(reply) => reply,
        other => {
            return Err(RpcError::Decode(format!(
                "reply is not a JSON object: {other}"
            )))
        }
    };
    if let Some(error) = reply.get("error").filter(|error| !error.is_null()) {
        return Ok(ReplyOutcome::Fault(ServerFault::from_value(error)));
    }
    Ok(ReplyOutcome::Success(
        reply.remove("result").unwrap_or(Value::Bool(true)),
    ))
}

/// Request id source.
///
/// Seeded from wall-clock milliseconds and incremented per request, so ids
/// stay unique within a process even for calls in the same millisecond.
#[derive(Debug)]
pub struct RequestIds {
    next: AtomicU64,
}

impl RequestIds {
    pub fn new() -> Self {
        let seed = chrono::Utc::now().timestamp_millis().max(0) as u64;
        Self::starting_at(seed)
    }

    pub fn starting_at(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}
