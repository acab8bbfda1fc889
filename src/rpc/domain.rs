// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Search domains and paging options.

use serde_json::{Map, Value};

/// Backend filter expression: a list of `[field, operator, value]` triples,
/// implicitly AND-ed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain(Vec<Value>);

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `[field, operator, value]` triple.
    pub fn filter(mut self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.0.push(Value::Array(vec![
            Value::from(field),
            Value::from(operator),
            value.into(),
        ]));
        self
    }

    /// Append a triple only when `value` is present.
    pub fn filter_if<T: Into<Value>>(self, field: &str, operator: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.filter(field, operator, value),
            None => self,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Array(self.0)
    }
}

/// `offset` / `limit` / `order` keyword arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub order: Option<String>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, offset: u32, limit: u32) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub(crate) fn apply(&self, kwargs: &mut Map<String, Value>) {
        if let Some(offset) = self.offset {
            kwargs.insert("offset".into(), Value::from(offset));
        }
        if let Some(limit) = self.limit {
            kwargs.insert("limit".into(), Value::from(limit));
        }
        if let Some(order) = &self.order {
            kwargs.insert("order".into(), Value::from(order.as_str()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_triples_in_order() {
        let domain = Domain::new()
            .filter("user_id", "=", 5)
            .filter("state", "in", json!(["open", "done"]));
        assert_eq!(
            domain.into_value(),
            json!([["user_id", "=", 5], ["state", "in", ["open", "done"]]])
        );
    }

    #[test]
    fn optional_filter_only_when_present() {
        let with = Domain::new().filter_if("district_id", "=", Some(12));
        let without = Domain::new().filter_if::<i64>("district_id", "=", None);
        assert_eq!(with.len(), 1);
        assert!(without.is_empty());
    }

    #[test]
    fn options_fill_kwargs() {
        let mut kwargs = Map::new();
        SearchOptions::new()
            .page(20, 10)
            .order("karma desc")
            .apply(&mut kwargs);
        assert_eq!(
            Value::Object(kwargs),
            json!({"offset": 20, "limit": 10, "order": "karma desc"})
        );

        let mut empty = Map::new();
        SearchOptions::default().apply(&mut empty);
        assert!(empty.is_empty());
    }
}
