// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Personal diary entries.
//!
//! Reads come back normalized; writes go through
//! [`denormalize_record`](crate::normalize::denormalize_record), so a
//! [`Diary`] fetched from the server can be edited and written back as is.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{decode_rows, write_values};
use crate::normalize::Relation;
use crate::rpc::{Domain, RpcClient, RpcResult, SearchOptions};
use crate::session::SessionScope;

pub const MODEL: &str = "wellbeing.diary";

pub const FIELDS: [&str; 8] = [
    "id",
    "title",
    "content",
    "mood",
    "user_id",
    "tag_ids",
    "create_date",
    "write_date",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default, rename = "user_id")]
    pub author: Relation,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
    #[serde(default)]
    pub create_date: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub write_date: Option<String>,
    #[serde(default)]
    pub write_time: Option<String>,
}

/// A diary entry that does not exist on the server yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiaryDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<i64>,
}

pub struct Diaries<'a> {
    rpc: &'a RpcClient,
    scope: &'a SessionScope,
}

impl<'a> Diaries<'a> {
    pub fn new(rpc: &'a RpcClient, scope: &'a SessionScope) -> Self {
        Self { rpc, scope }
    }

    /// The scope user's entries, newest first.
    pub async fn list(&self, offset: u32, limit: u32) -> RpcResult<Vec<Diary>> {
        let rows = self
            .rpc
            .search_read(
                Some(self.scope),
                MODEL,
                Domain::new().filter("user_id", "=", self.scope.user_id()),
                &FIELDS,
                &SearchOptions::new()
                    .page(offset, limit)
                    .order("create_date desc"),
            )
            .await?;
        decode_rows(rows)
    }

    /// Create an entry owned by the scope's user; returns the new id.
    pub async fn create(&self, draft: &DiaryDraft) -> RpcResult<i64> {
        let mut values = write_values(draft)?;
        values.insert("user_id".to_string(), Value::from(self.scope.user_id()));
        let id = self.rpc.create(Some(self.scope), MODEL, values).await?;
        debug!(diary_id = id, "Diary created");
        Ok(id)
    }

    /// Write back an edited entry.
    pub async fn update(&self, diary: &Diary) -> RpcResult<bool> {
        let mut values = write_values(diary)?;
        values.remove("id");
        self.rpc
            .write(Some(self.scope), MODEL, &[diary.id], values)
            .await
    }

    pub async fn delete(&self, diary_id: i64) -> RpcResult<bool> {
        self.rpc.unlink(Some(self.scope), MODEL, &[diary_id]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::{fixture, sent_call};
    use serde_json::json;

    fn wire_diary() -> Value {
        json!({
            "id": 9,
            "title": "Monday",
            "content": "Played football",
            "mood": "happy",
            "user_id": [7, "Nguyen An"],
            "tag_ids": false,
            "create_date": "2026-03-02 19:45:10",
            "write_date": "2026-03-02 20:01:00"
        })
    }

    #[tokio::test]
    async fn list_then_update_round_trips_relations() {
        let fx = fixture();
        fx.transport.push_result(json!([wire_diary()]));
        fx.transport.push_result(json!(true));
        let diaries = Diaries::new(&fx.rpc, &fx.scope);

        let mut entry = diaries.list(0, 10).await.unwrap().remove(0);
        assert_eq!(entry.author, Relation::reference(7, "Nguyen An"));
        assert!(entry.tag_ids.is_empty());
        assert_eq!(entry.create_time.as_deref(), Some("19:45"));

        entry.mood = Some("calm".into());
        assert!(diaries.update(&entry).await.unwrap());

        let call = sent_call(&fx.transport, 1);
        assert_eq!(call[1], json!("write"));
        assert_eq!(
            call[2],
            json!([[9], {
                "title": "Monday",
                "content": "Played football",
                "mood": "calm",
                "user_id": 7,
                "tag_ids": []
            }])
        );
    }

    #[tokio::test]
    async fn create_sets_owner() {
        let fx = fixture();
        fx.transport.push_result(json!(15));
        let draft = DiaryDraft {
            title: "Tuesday".into(),
            mood: Some("tired".into()),
            ..Default::default()
        };

        let id = Diaries::new(&fx.rpc, &fx.scope).create(&draft).await.unwrap();
        assert_eq!(id, 15);
        assert_eq!(
            sent_call(&fx.transport, 0)[2],
            json!([{"title": "Tuesday", "mood": "tired", "user_id": 7}])
        );
    }

    #[tokio::test]
    async fn delete_unlinks() {
        let fx = fixture();
        fx.transport.push_result(json!(true));
        assert!(Diaries::new(&fx.rpc, &fx.scope).delete(9).await.unwrap());
        let call = sent_call(&fx.transport, 0);
        assert_eq!(call[1], json!("unlink"));
        assert_eq!(call[2], json!([[9]]));
    }
}
