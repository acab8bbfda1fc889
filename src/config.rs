// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the client. Configuration is loaded from the environment when
//! the embedding application starts.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `WELLBEING_RPC_URL` | JSON-RPC endpoint of the backend | Required |
//! | `WELLBEING_DATABASE` | Backend database name | Required |
//! | `WELLBEING_APP_SECRET` | Application secret for at-rest key derivation | Required |
//! | `WELLBEING_SERVICE_UID` | Service-account uid for unauthenticated calls | `2` |
//! | `WELLBEING_SERVICE_PASSWORD` | Service-account password | empty |
//! | `WELLBEING_RPC_TIMEOUT_SECS` | Per-request timeout for RPC calls | none |
//! | `WELLBEING_DATA_DIR` | Directory holding the local store | `./data` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;
use zeroize::Zeroizing;

/// Environment variable name for the JSON-RPC endpoint.
///
/// Every call goes to this single URL; the backend routes on the envelope.
pub const RPC_URL_ENV: &str = "WELLBEING_RPC_URL";

/// Environment variable name for the backend database.
pub const DATABASE_ENV: &str = "WELLBEING_DATABASE";

/// Environment variable name for the application-wide secret.
///
/// Combined with the device id as PBKDF2 input. Changing it makes every
/// stored blob undecryptable.
pub const APP_SECRET_ENV: &str = "WELLBEING_APP_SECRET";

/// Environment variable name for the service-account uid.
pub const SERVICE_UID_ENV: &str = "WELLBEING_SERVICE_UID";

/// Environment variable name for the service-account password.
pub const SERVICE_PASSWORD_ENV: &str = "WELLBEING_SERVICE_PASSWORD";

/// Environment variable name for the optional RPC timeout in seconds.
pub const RPC_TIMEOUT_ENV: &str = "WELLBEING_RPC_TIMEOUT_SECS";

/// Environment variable name for the local store directory.
pub const DATA_DIR_ENV: &str = "WELLBEING_DATA_DIR";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default local store directory.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// File name of the redb database inside the data directory.
pub const STORE_FILE_NAME: &str = "local-store.redb";

/// Default service-account uid (the backend's public portal user).
pub const DEFAULT_SERVICE_UID: i64 = 2;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Identity used for calls that run before anyone has logged in.
#[derive(Clone)]
pub struct ServiceAccount {
    pub uid: i64,
    pub password: Zeroizing<String>,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("uid", &self.uid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    pub rpc_url: Url,
    pub database: String,
    pub app_secret: Zeroizing<String>,
    pub service_account: ServiceAccount,
    pub rpc_timeout: Option<Duration>,
    pub data_dir: PathBuf,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("database", &self.database)
            .field("service_account", &self.service_account)
            .field("rpc_timeout", &self.rpc_timeout)
            .field("data_dir", &self.data_dir)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Build a configuration with defaults for everything but the required
    /// values.
    pub fn new(rpc_url: Url, database: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            rpc_url,
            database: database.into(),
            app_secret: Zeroizing::new(app_secret.into()),
            service_account: ServiceAccount {
                uid: DEFAULT_SERVICE_UID,
                password: Zeroizing::new(String::new()),
            },
            rpc_timeout: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }

    pub fn with_service_account(mut self, uid: i64, password: impl Into<String>) -> Self {
        self.service_account = ServiceAccount {
            uid,
            password: Zeroizing::new(password.into()),
        };
        self
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = Some(timeout);
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Path of the redb file backing the local store.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let raw_url = required(RPC_URL_ENV)?;
        let rpc_url = Url::parse(raw_url.trim()).map_err(|e| ConfigError::Invalid {
            name: RPC_URL_ENV,
            reason: e.to_string(),
        })?;

        let mut config = Self::new(rpc_url, required(DATABASE_ENV)?, required(APP_SECRET_ENV)?);

        let service_uid = match lookup(SERVICE_UID_ENV) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                name: SERVICE_UID_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_SERVICE_UID,
        };
        config = config.with_service_account(
            service_uid,
            lookup(SERVICE_PASSWORD_ENV).unwrap_or_default(),
        );

        if let Some(raw) = lookup(RPC_TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: RPC_TIMEOUT_ENV,
                reason: e.to_string(),
            })?;
            config = config.with_rpc_timeout(Duration::from_secs(secs));
        }

        if let Some(dir) = lookup(DATA_DIR_ENV) {
            config = config.with_data_dir(dir);
        }

        Ok(config)
    }
}
