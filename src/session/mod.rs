// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session
//!
//! Authentication lifecycle, the explicit [`SessionScope`] passed to data
//! access, roles, and the app lock.

pub mod app_lock;
pub mod error;
pub mod manager;
pub mod roles;
pub mod scope;

pub use app_lock::{AppLock, BiometricVerifier};
pub use error::{LockError, LoginError};
pub use manager::{AuthState, SessionManager};
pub use roles::Role;
pub use scope::{Credentials, Session, SessionScope};
