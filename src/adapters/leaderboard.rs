// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Karma ranking.

use serde::{Deserialize, Serialize};

use super::decode_rows;
use crate::normalize::Relation;
use crate::rpc::{Domain, RpcClient, RpcResult, SearchOptions};
use crate::session::SessionScope;

pub const MODEL: &str = "res.users";

pub const FIELDS: [&str; 5] = ["id", "name", "karma", "school_id", "class_id"];

pub const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedUser {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub karma: i64,
    #[serde(default, rename = "school_id")]
    pub school: Relation,
    #[serde(default, rename = "class_id")]
    pub class: Relation,
}

pub struct Leaderboard<'a> {
    rpc: &'a RpcClient,
    scope: &'a SessionScope,
}

impl<'a> Leaderboard<'a> {
    pub fn new(rpc: &'a RpcClient, scope: &'a SessionScope) -> Self {
        Self { rpc, scope }
    }

    /// Top users by karma, optionally within one school.
    pub async fn top(&self, school_id: Option<i64>, limit: Option<u32>) -> RpcResult<Vec<RankedUser>> {
        let domain = Domain::new()
            .filter("karma", ">", 0)
            .filter_if("school_id", "=", school_id);
        let options = SearchOptions::new()
            .limit(limit.unwrap_or(DEFAULT_LIMIT))
            .order("karma desc");
        let rows = self
            .rpc
            .search_read(Some(self.scope), MODEL, domain, &FIELDS, &options)
            .await?;
        decode_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::{fixture, sent_call};
    use serde_json::json;

    #[tokio::test]
    async fn ranks_by_karma() {
        let fx = fixture();
        fx.transport.push_result(json!([
            {"id": 3, "name": "B", "karma": 120, "school_id": [1, "S"], "class_id": false},
            {"id": 7, "name": "A", "karma": 80, "school_id": [1, "S"], "class_id": [9, "7A"]}
        ]));

        let ranking = Leaderboard::new(&fx.rpc, &fx.scope)
            .top(None, None)
            .await
            .unwrap();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[1].class.name(), Some("7A"));

        let call = sent_call(&fx.transport, 0);
        assert_eq!(call[2], json!([[["karma", ">", 0]]]));
        assert_eq!(call[3]["order"], json!("karma desc"));
        assert_eq!(call[3]["limit"], json!(DEFAULT_LIMIT));
    }

    #[tokio::test]
    async fn school_filter_is_optional() {
        let fx = fixture();
        fx.transport.push_result(json!([]));
        Leaderboard::new(&fx.rpc, &fx.scope)
            .top(Some(1), Some(10))
            .await
            .unwrap();
        let call = sent_call(&fx.transport, 0);
        assert_eq!(call[2], json!([[["karma", ">", 0], ["school_id", "=", 1]]]));
        assert_eq!(call[3]["limit"], json!(10));
    }
}
