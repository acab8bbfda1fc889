// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tasks assigned to a user (`project.task`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::decode_rows;
use crate::normalize::Relation;
use crate::rpc::{Domain, RpcClient, RpcResult, SearchOptions};
use crate::session::SessionScope;

pub const MODEL: &str = "project.task";

pub const FIELDS: [&str; 9] = [
    "id",
    "name",
    "description",
    "state",
    "priority",
    "date_deadline",
    "project_id",
    "user_ids",
    "create_date",
];

/// Backend task state codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    InProgress,
    ChangesRequested,
    Approved,
    Waiting,
    Done,
    Cancelled,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::InProgress => "01_in_progress",
            TaskState::ChangesRequested => "02_changes_requested",
            TaskState::Approved => "03_approved",
            TaskState::Waiting => "04_waiting_normal",
            TaskState::Done => "1_done",
            TaskState::Cancelled => "1_canceled",
        }
    }

    pub fn parse(raw: &str) -> Option<TaskState> {
        [
            TaskState::InProgress,
            TaskState::ChangesRequested,
            TaskState::Approved,
            TaskState::Waiting,
            TaskState::Done,
            TaskState::Cancelled,
        ]
        .into_iter()
        .find(|state| state.as_str() == raw)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, TaskState::Done | TaskState::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub date_deadline: Option<String>,
    #[serde(default, rename = "project_id")]
    pub project: Relation,
    #[serde(default)]
    pub user_ids: Vec<i64>,
    #[serde(default)]
    pub create_date: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
}

impl Task {
    /// Parsed state; `None` for codes this client does not know.
    pub fn task_state(&self) -> Option<TaskState> {
        self.state.as_deref().and_then(TaskState::parse)
    }
}

pub struct Tasks<'a> {
    rpc: &'a RpcClient,
    scope: &'a SessionScope,
}

impl<'a> Tasks<'a> {
    pub fn new(rpc: &'a RpcClient, scope: &'a SessionScope) -> Self {
        Self { rpc, scope }
    }

    /// Tasks assigned to the scope's user, nearest deadline first.
    pub async fn assigned(
        &self,
        state: Option<TaskState>,
        offset: u32,
        limit: u32,
    ) -> RpcResult<Vec<Task>> {
        let domain = Domain::new()
            .filter("user_ids", "in", vec![self.scope.user_id()])
            .filter_if("state", "=", state.map(|s| s.as_str()));
        let options = SearchOptions::new()
            .page(offset, limit)
            .order("date_deadline asc, id desc");
        let rows = self
            .rpc
            .search_read(Some(self.scope), MODEL, domain, &FIELDS, &options)
            .await?;
        decode_rows(rows)
    }

    pub async fn set_state(&self, task_id: i64, state: TaskState) -> RpcResult<bool> {
        let mut values = Map::new();
        values.insert("state".to_string(), Value::from(state.as_str()));
        self.rpc
            .write(Some(self.scope), MODEL, &[task_id], values)
            .await
    }
}
