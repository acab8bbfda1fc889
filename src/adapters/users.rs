// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User profiles (`res.users`).

use serde::{Deserialize, Deserializer, Serialize};

use super::{decode_rows, write_values};
use crate::normalize::Relation;
use crate::rpc::{RpcClient, RpcResult};
use crate::session::{Role, SessionScope};

pub const MODEL: &str = "res.users";

pub const FIELDS: [&str; 9] = [
    "id",
    "name",
    "login",
    "email",
    "phone",
    "role",
    "partner_id",
    "school_id",
    "class_id",
];

/// Profile of a platform user, as kept in the local store after login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Role,
    #[serde(default, rename = "partner_id")]
    pub partner: Relation,
    #[serde(default, rename = "school_id")]
    pub school: Relation,
    #[serde(default, rename = "class_id")]
    pub class: Relation,
}

/// Fields a user may edit on their own profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Role, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Role::parse).unwrap_or_default())
}

pub struct Users<'a> {
    rpc: &'a RpcClient,
    scope: &'a SessionScope,
}

impl<'a> Users<'a> {
    pub fn new(rpc: &'a RpcClient, scope: &'a SessionScope) -> Self {
        Self { rpc, scope }
    }

    /// Profile of `user_id`, or `None` if the read returned nothing.
    pub async fn profile(&self, user_id: i64) -> RpcResult<Option<UserProfile>> {
        let rows = self
            .rpc
            .read(Some(self.scope), MODEL, &[user_id], &FIELDS)
            .await?;
        Ok(decode_rows(rows)?.into_iter().next())
    }

    /// Profile of the scope's own user.
    pub async fn me(&self) -> RpcResult<Option<UserProfile>> {
        self.profile(self.scope.user_id()).await
    }

    pub async fn update_me(&self, update: &ProfileUpdate) -> RpcResult<bool> {
        let values = write_values(update)?;
        self.rpc
            .write(Some(self.scope), MODEL, &[self.scope.user_id()], values)
            .await
    }
}
