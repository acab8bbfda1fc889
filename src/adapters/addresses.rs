// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Administrative regions: provinces, districts and wards.

use serde::{Deserialize, Serialize};

use super::decode_rows;
use crate::normalize::Relation;
use crate::rpc::{Domain, RpcClient, RpcResult, SearchOptions};
use crate::session::SessionScope;

pub const PROVINCE_MODEL: &str = "res.country.state";
pub const DISTRICT_MODEL: &str = "res.country.district";
pub const WARD_MODEL: &str = "res.country.ward";

/// Provinces are limited to this country.
pub const COUNTRY_CODE: &str = "VN";

pub const FIELDS: [&str; 4] = ["id", "name", "code", "parent_id"];

/// A province, district or ward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Enclosing region; unset for provinces.
    #[serde(default, rename = "parent_id")]
    pub parent: Relation,
}

pub struct Addresses<'a> {
    rpc: &'a RpcClient,
    scope: &'a SessionScope,
}

impl<'a> Addresses<'a> {
    pub fn new(rpc: &'a RpcClient, scope: &'a SessionScope) -> Self {
        Self { rpc, scope }
    }

    pub async fn provinces(&self) -> RpcResult<Vec<Region>> {
        let domain = Domain::new().filter("country_id.code", "=", COUNTRY_CODE);
        self.list(PROVINCE_MODEL, domain).await
    }

    pub async fn districts(&self, province_id: i64) -> RpcResult<Vec<Region>> {
        let domain = Domain::new().filter("state_id", "=", province_id);
        self.list(DISTRICT_MODEL, domain).await
    }

    /// Wards, narrowed to one district when given.
    pub async fn wards(&self, district_id: Option<i64>) -> RpcResult<Vec<Region>> {
        let domain = Domain::new().filter_if("district_id", "=", district_id);
        self.list(WARD_MODEL, domain).await
    }

    async fn list(&self, model: &str, domain: Domain) -> RpcResult<Vec<Region>> {
        let rows = self
            .rpc
            .search_read(
                Some(self.scope),
                model,
                domain,
                &FIELDS,
                &SearchOptions::new().order("name asc"),
            )
            .await?;
        decode_rows(rows)
    }
}
