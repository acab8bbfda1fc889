// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wellbeing Client - data access and session layer
//!
//! Client-side core of the student wellbeing and gamification platform:
//! encrypted local persistence, the login/logout lifecycle, a JSON-RPC
//! client for the object-relational backend, and typed per-entity adapters.
//!
//! ## Modules
//!
//! - `storage` - Device-bound encrypted key-value store (redb)
//! - `session` - Login/logout, session scope, roles, app lock
//! - `rpc` - JSON-RPC envelopes, HTTP transport, generic model client
//! - `adapters` - Typed wrappers per backend model
//! - `normalize` - Wire ↔ canonical record conversion
//! - `connectivity` - Reachability probe
//! - `presenter` - UI collaborator trait (alerts, toasts, confirmation)
//! - `crypto` - Key derivation and authenticated encryption
//! - `config` / `telemetry` - Environment configuration and logging
//!
//! ## Wiring
//!
//! ```no_run
//! use std::sync::Arc;
//! use wellbeing_client::config::ClientConfig;
//! use wellbeing_client::presenter::LogPresenter;
//! use wellbeing_client::rpc::RpcClient;
//! use wellbeing_client::session::SessionManager;
//! use wellbeing_client::storage::{LocalStore, RedbBackend};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! wellbeing_client::telemetry::init_tracing();
//! let config = ClientConfig::from_env()?;
//! let backend = Arc::new(RedbBackend::open(&config.store_path())?);
//! let store = LocalStore::open(backend, &config.app_secret)?;
//! let rpc = Arc::new(RpcClient::from_config(&config, Arc::new(LogPresenter))?);
//! let sessions = SessionManager::new(rpc, store);
//! let scope = sessions.login("0964164434", "secret").await?;
//! # let _ = scope;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod connectivity;
pub mod crypto;
pub mod normalize;
pub mod presenter;
pub mod rpc;
pub mod session;
pub mod storage;
pub mod telemetry;
