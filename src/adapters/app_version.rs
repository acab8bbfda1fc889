// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Published app versions.
//!
//! Queried before login, so this adapter needs no session scope; the RPC
//! client uses its service account.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::decode_rows;
use crate::rpc::{RpcClient, RpcError, RpcResult};

/// Latest release for a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppVersion {
    pub version: String,
    #[serde(default)]
    pub force_update: bool,
    #[serde(default)]
    pub store_url: Option<String>,
    #[serde(default)]
    pub release_notes: Option<String>,
}

/// Outcome of comparing the running build with the latest release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    UpToDate,
    UpdateAvailable { latest: AppVersion, required: bool },
}

pub struct AppVersions<'a> {
    rpc: &'a RpcClient,
}

impl<'a> AppVersions<'a> {
    pub fn new(rpc: &'a RpcClient) -> Self {
        Self { rpc }
    }

    pub async fn latest(&self, platform: &str) -> RpcResult<AppVersion> {
        let value = self.rpc.check_app_version(platform).await?;
        let rows = match value {
            Value::Array(rows) => rows,
            Value::Object(object) => vec![Value::Object(object)],
            other => {
                return Err(RpcError::Decode(format!(
                    "version check returned {other}"
                )))
            }
        };
        decode_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| RpcError::Decode("no published version".to_string()))
    }

    /// Compare `current` with the latest release for `platform`.
    pub async fn check(&self, platform: &str, current: &str) -> RpcResult<VersionCheck> {
        let latest = self.latest(platform).await?;
        if compare_versions(current, &latest.version) != Ordering::Less {
            return Ok(VersionCheck::UpToDate);
        }
        info!(
            current = %current,
            latest = %latest.version,
            required = latest.force_update,
            "App update available"
        );
        let required = latest.force_update;
        Ok(VersionCheck::UpdateAvailable { latest, required })
    }
}

/// Compare dotted numeric versions; missing or non-numeric parts count as 0.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.trim()
            .trim_start_matches('v')
            .split('.')
            .map(|part| part.parse().unwrap_or(0))
            .collect()
    };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(0);
            let right = b.get(i).copied().unwrap_or(0);
            left.cmp(&right)
        })
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
