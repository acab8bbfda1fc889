// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Badges granted to a user.

use serde::{Deserialize, Serialize};

use super::decode_rows;
use crate::normalize::Relation;
use crate::rpc::{Domain, RpcClient, RpcResult, SearchOptions};
use crate::session::SessionScope;

pub const MODEL: &str = "gamification.badge.user";

pub const FIELDS: [&str; 6] = [
    "id",
    "badge_id",
    "badge_name",
    "sender_id",
    "comment",
    "create_date",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedBadge {
    pub id: i64,
    #[serde(default, rename = "badge_id")]
    pub badge: Relation,
    #[serde(default)]
    pub badge_name: Option<String>,
    /// Who granted it; unset for automatic grants.
    #[serde(default, rename = "sender_id")]
    pub sender: Relation,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub create_date: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
}

pub struct Badges<'a> {
    rpc: &'a RpcClient,
    scope: &'a SessionScope,
}

impl<'a> Badges<'a> {
    pub fn new(rpc: &'a RpcClient, scope: &'a SessionScope) -> Self {
        Self { rpc, scope }
    }

    /// Badges of `user_id`, or of the scope's user.
    pub async fn earned(&self, user_id: Option<i64>) -> RpcResult<Vec<EarnedBadge>> {
        let owner = user_id.unwrap_or_else(|| self.scope.user_id());
        let rows = self
            .rpc
            .search_read(
                Some(self.scope),
                MODEL,
                Domain::new().filter("user_id", "=", owner),
                &FIELDS,
                &SearchOptions::new().order("create_date desc"),
            )
            .await?;
        decode_rows(rows)
    }

    pub async fn count(&self) -> RpcResult<u64> {
        self.rpc
            .search_count(
                Some(self.scope),
                MODEL,
                Domain::new().filter("user_id", "=", self.scope.user_id()),
            )
            .await
    }
}
