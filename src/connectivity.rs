// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Network reachability probe.
//!
//! A probe is one HTTP request to the backend with a one-second timeout.
//! Any HTTP response counts as online; the status code is irrelevant.
//! Offline results raise a toast through the [`Presenter`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::presenter::Presenter;
use crate::rpc::TransportError;

pub const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

pub const OFFLINE_MESSAGE: &str = "No internet connection";

pub struct NetworkMonitor {
    target: Url,
    http: Client,
    online: AtomicBool,
    presenter: Arc<dyn Presenter>,
}

impl NetworkMonitor {
    pub fn new(target: Url, presenter: Arc<dyn Presenter>) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build probe client: {e}")))?;
        Ok(Self {
            target,
            http,
            online: AtomicBool::new(true),
            presenter,
        })
    }

    /// Probe the configured RPC endpoint.
    pub fn from_config(
        config: &ClientConfig,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self, TransportError> {
        Self::new(config.rpc_url.clone(), presenter)
    }

    /// Result of the last probe; `true` before the first one.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    pub async fn probe(&self) -> bool {
        let online = match self.http.head(self.target.clone()).send().await {
            Ok(response) => {
                debug!(status = response.status().as_u16(), "Reachability probe answered");
                true
            }
            Err(e) => {
                warn!(target = %self.target, error = %e, "Reachability probe failed");
                false
            }
        };

        let was_online = self.online.swap(online, Ordering::Relaxed);
        if was_online != online {
            info!(online, "Connectivity changed");
        }
        if !online {
            self.presenter.toast(OFFLINE_MESSAGE);
        }
        online
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::testing::RecordingPresenter;

    #[tokio::test]
    async fn unreachable_target_is_offline_with_toast() {
        let presenter = Arc::new(RecordingPresenter::new());
        let monitor = NetworkMonitor::new(
            Url::parse("http://127.0.0.1:9/").unwrap(),
            presenter.clone(),
        )
        .unwrap();

        assert!(monitor.is_online());
        assert!(!monitor.probe().await);
        assert!(!monitor.is_online());
        assert_eq!(presenter.toasts(), vec![OFFLINE_MESSAGE.to_string()]);
    }
}
