// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # JSON-RPC Access
//!
//! Envelope construction, HTTP transport and the generic model client.
//!
//! ```text
//! adapter ──Call──▶ RpcClient ──Envelope──▶ Transport ──HTTP──▶ backend
//!                      │
//!                      └─ server fault ──▶ Presenter::alert
//! ```

pub mod client;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod transport;

pub use client::{Call, RpcClient};
pub use domain::{Domain, SearchOptions};
pub use envelope::{Envelope, RequestIds, Service};
pub use error::{RpcError, RpcResult, TransportError};
pub use transport::{HttpTransport, Transport};
