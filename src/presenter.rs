// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User-facing collaborators supplied by the UI shell.
//!
//! The data layer never renders anything itself. It reports through this
//! trait: blocking alerts for server errors, toasts for connectivity,
//! confirmation before logout, and navigation back to the login screen.

use async_trait::async_trait;

#[async_trait]
pub trait Presenter: Send + Sync {
    /// Show a modal alert and wait until it is dismissed.
    async fn alert(&self, message: &str);

    /// Show a transient, non-blocking notice.
    fn toast(&self, message: &str);

    /// Ask the user to confirm; `true` means confirmed.
    async fn confirm(&self, message: &str) -> bool;

    /// Route to the login screen.
    fn show_login(&self);
}

/// Presenter that only logs. Confirms everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

#[async_trait]
impl Presenter for LogPresenter {
    async fn alert(&self, message: &str) {
        tracing::warn!(message = %message, "alert");
    }

    fn toast(&self, message: &str) {
        tracing::info!(message = %message, "toast");
    }

    async fn confirm(&self, message: &str) -> bool {
        tracing::info!(message = %message, "confirm (auto-accepted)");
        true
    }

    fn show_login(&self) {
        tracing::info!("navigate to login");
    }
}
