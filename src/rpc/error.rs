// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RPC errors.

use crate::crypto::CryptoError;

/// Transport-level failure: the request never produced a JSON-RPC reply.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("endpoint returned HTTP {status}")]
    Status { status: u16 },

    #[error("response was not valid JSON: {0}")]
    InvalidBody(String),
}

/// Why an RPC call produced no result.
///
/// Callers typically only distinguish success from failure; the variants
/// exist for logging and tests. Server errors have already been shown to
/// the user by the time this is returned.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// No session scope was supplied; nothing was sent.
    #[error("no active session")]
    NoSession,

    /// The session secret could not be decrypted on this device.
    #[error("session credentials unavailable: {0}")]
    Credentials(#[from] CryptoError),

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with an error envelope.
    #[error("server error: {message}")]
    Server { message: String },

    /// The scope was cancelled before the reply arrived.
    #[error("call cancelled")]
    Cancelled,

    /// The reply did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl RpcError {
    /// Short machine-readable code for log fields.
    pub fn code(&self) -> &'static str {
        match self {
            RpcError::NoSession => "no_session",
            RpcError::Credentials(_) => "credentials",
            RpcError::Transport(_) => "transport",
            RpcError::Server { .. } => "server",
            RpcError::Cancelled => "cancelled",
            RpcError::Decode(_) => "decode",
        }
    }
}

pub type RpcResult<T> = Result<T, RpcError>;
