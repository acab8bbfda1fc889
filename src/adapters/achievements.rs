// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gamification goals reached or in progress.

use serde::{Deserialize, Serialize};

use super::decode_rows;
use crate::normalize::Relation;
use crate::rpc::{Domain, RpcClient, RpcResult, SearchOptions};
use crate::session::SessionScope;

pub const MODEL: &str = "gamification.goal";

pub const FIELDS: [&str; 9] = [
    "id",
    "definition_id",
    "challenge_id",
    "current",
    "target_goal",
    "completeness",
    "state",
    "create_date",
    "write_date",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: i64,
    #[serde(default, rename = "definition_id")]
    pub definition: Relation,
    #[serde(default, rename = "challenge_id")]
    pub challenge: Relation,
    #[serde(default)]
    pub current: f64,
    #[serde(default)]
    pub target_goal: f64,
    /// Progress in percent.
    #[serde(default)]
    pub completeness: f64,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub create_date: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
}

impl Achievement {
    pub fn is_reached(&self) -> bool {
        self.state.as_deref() == Some("reached")
    }
}

pub struct Achievements<'a> {
    rpc: &'a RpcClient,
    scope: &'a SessionScope,
}

impl<'a> Achievements<'a> {
    pub fn new(rpc: &'a RpcClient, scope: &'a SessionScope) -> Self {
        Self { rpc, scope }
    }

    /// Goals of the scope's user, newest first; `reached_only` drops goals
    /// still in progress.
    pub async fn list(&self, reached_only: bool) -> RpcResult<Vec<Achievement>> {
        let domain = Domain::new()
            .filter("user_id", "=", self.scope.user_id())
            .filter_if("state", "=", reached_only.then_some("reached"));
        let rows = self
            .rpc
            .search_read(
                Some(self.scope),
                MODEL,
                domain,
                &FIELDS,
                &SearchOptions::new().order("create_date desc"),
            )
            .await?;
        decode_rows(rows)
    }
}
