// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Adapters
//!
//! One thin adapter per backend entity. Each holds a borrowed
//! [`RpcClient`](crate::rpc::RpcClient) and [`SessionScope`](crate::session::SessionScope),
//! a fixed field list, and builds search domains from optional filters.
//! Results pass through [`normalize_records`] before decoding into typed
//! records.
//!
//! | Adapter | Model |
//! |---------|-------|
//! | [`Addresses`] | `res.country.state`, `res.country.district`, `res.country.ward` |
//! | [`Achievements`] | `gamification.goal` |
//! | [`Badges`] | `gamification.badge.user` |
//! | [`Leaderboard`] | `res.users` |
//! | [`Tasks`] | `project.task` |
//! | [`Diaries`] | `wellbeing.diary` |
//! | [`Users`] | `res.users` |
//! | [`AppVersions`] | `mobile.app.version` |

pub mod achievements;
pub mod addresses;
pub mod app_version;
pub mod badges;
pub mod diaries;
pub mod leaderboard;
pub mod tasks;
pub mod users;

pub use achievements::{Achievement, Achievements};
pub use addresses::{Addresses, Region};
pub use app_version::{AppVersion, AppVersions, VersionCheck};
pub use badges::{Badges, EarnedBadge};
pub use diaries::{Diaries, Diary, DiaryDraft};
pub use leaderboard::{Leaderboard, RankedUser};
pub use tasks::{Task, TaskState, Tasks};
pub use users::{UserProfile, Users};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::normalize::{denormalize_record, normalize_records, Record};
use crate::rpc::{RpcError, RpcResult};

/// Normalize raw rows and decode each into `T`.
pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> RpcResult<Vec<T>> {
    normalize_records(rows)
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| RpcError::Decode(e.to_string())))
        .collect()
}

/// Serialize a canonical record and convert it to write form.
pub(crate) fn write_values<T: Serialize>(value: &T) -> RpcResult<Record> {
    match serde_json::to_value(value).map_err(|e| RpcError::Decode(e.to_string()))? {
        Value::Object(record) => Ok(denormalize_record(record)),
        other => Err(RpcError::Decode(format!("expected an object, got {other}"))),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for adapter tests.

    use std::sync::Arc;

    use zeroize::Zeroizing;

    use crate::config::ServiceAccount;
    use crate::crypto::DeviceCipher;
    use crate::presenter::testing::RecordingPresenter;
    use crate::rpc::transport::testing::ScriptedTransport;
    use crate::rpc::RpcClient;
    use crate::session::SessionScope;

    pub(crate) struct Fixture {
        pub(crate) rpc: RpcClient,
        pub(crate) transport: Arc<ScriptedTransport>,
        pub(crate) scope: SessionScope,
    }

    pub(crate) fn fixture() -> Fixture {
        let transport = Arc::new(ScriptedTransport::new());
        let rpc = RpcClient::new(
            "wellbeing",
            ServiceAccount {
                uid: 2,
                password: Zeroizing::new("portal".into()),
            },
            transport.clone(),
            Arc::new(RecordingPresenter::new()),
        );
        let scope = SessionScope::establish(7, "pw", DeviceCipher::new("app", "device")).unwrap();
        Fixture {
            rpc,
            transport,
            scope,
        }
    }

    /// `args` of the `n`th execute_kw call: `[model, method, args, kwargs]`.
    pub(crate) fn sent_call(transport: &ScriptedTransport, n: usize) -> Vec<serde_json::Value> {
        let sent = transport.sent();
        let args = sent[n]["params"]["args"].as_array().unwrap().clone();
        args[3..].to_vec()
    }
}
