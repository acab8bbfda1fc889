// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Record Normalization
//!
//! Converts between the backend's wire encoding of records and the client's
//! canonical form.
//!
//! ## Wire → Canonical ([`normalize_record`])
//!
//! | Wire value | Canonical value |
//! |------------|-----------------|
//! | `false` on a `*_ids` key | `[]` |
//! | `false` on any other key | `null` |
//! | `[id, "label"]` | `{"id": id, "name": "label"}` |
//! | `create_date` / `write_date` `"YYYY-MM-DD HH:MM:SS"` | date part, plus `create_time` / `write_time` `"HH:MM"` |
//!
//! ## Canonical → Wire ([`denormalize_record`])
//!
//! `{"id": id, ...}` becomes the bare `id`, and server-managed fields are
//! dropped. Labels are not restored, so a round trip keeps only the id.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A record as exchanged with the backend.
pub type Record = Map<String, Value>;

/// Timestamp fields split into date and time-of-day.
const TIMESTAMP_FIELDS: [(&str, &str); 2] =
    [("create_date", "create_time"), ("write_date", "write_time")];

/// Fields the server maintains itself; never sent on writes.
const SERVER_MANAGED_FIELDS: [&str; 7] = [
    "create_date",
    "create_time",
    "write_date",
    "write_time",
    "create_uid",
    "write_uid",
    "__last_update",
];

const SERVER_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A many-to-one reference.
///
/// Decoded explicitly from the wire form with [`Relation::decode`];
/// serializes to the canonical `{"id", "name"}` / `null` form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Relation {
    #[default]
    Unset,
    Reference { id: i64, name: String },
}

#[derive(Serialize, Deserialize)]
struct CanonicalRef {
    id: i64,
    name: String,
}

impl Relation {
    pub fn reference(id: i64, name: impl Into<String>) -> Self {
        Relation::Reference {
            id,
            name: name.into(),
        }
    }

    /// Decode the wire form: `false`/`null` or an `[id, label]` pair.
    ///
    /// Returns `None` for values that are not relational references.
    pub fn decode(value: &Value) -> Option<Relation> {
        match value {
            Value::Bool(false) | Value::Null => Some(Relation::Unset),
            Value::Array(items) if items.len() == 2 => {
                let id = items[0].as_i64()?;
                let name = items[1].as_str()?;
                Some(Relation::reference(id, name))
            }
            _ => None,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Relation::Unset => None,
            Relation::Reference { id, .. } => Some(*id),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Relation::Unset => None,
            Relation::Reference { name, .. } => Some(name),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Relation::Reference { .. })
    }

    /// Wire form for writes: the bare id, or `false`.
    pub fn to_wire(&self) -> Value {
        match self {
            Relation::Unset => Value::Bool(false),
            Relation::Reference { id, .. } => Value::from(*id),
        }
    }

    fn to_canonical(&self) -> Value {
        match self {
            Relation::Unset => Value::Null,
            Relation::Reference { id, name } => {
                let mut object = Map::new();
                object.insert("id".to_string(), Value::from(*id));
                object.insert("name".to_string(), Value::String(name.clone()));
                Value::Object(object)
            }
        }
    }
}

impl Serialize for Relation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Relation::Unset => serializer.serialize_none(),
            Relation::Reference { id, name } => CanonicalRef {
                id: *id,
                name: name.clone(),
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Relation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<CanonicalRef>::deserialize(deserializer)? {
            Some(CanonicalRef { id, name }) => Relation::Reference { id, name },
            None => Relation::Unset,
        })
    }
}

/// Normalize every object in a `search_read`/`read` result.
///
/// Non-object entries are passed through unchanged.
pub fn normalize_records(records: Vec<Value>) -> Vec<Value> {
    records
        .into_iter()
        .map(|record| match record {
            Value::Object(object) => Value::Object(normalize_record(object)),
            other => other,
        })
        .collect()
}

/// Convert one wire record to canonical form.
pub fn normalize_record(record: Record) -> Record {
    let mut out = Record::new();
    let mut derived_times = Vec::new();

    for (key, value) in record {
        let value = match value {
            Value::Bool(false) if key.contains("_ids") => Value::Array(Vec::new()),
            Value::Bool(false) => Value::Null,
            Value::Array(items) if is_reference_pair(&items) => {
                let pair = Value::Array(items);
                match Relation::decode(&pair) {
                    Some(relation) => relation.to_canonical(),
                    None => pair,
                }
            }
            Value::String(raw) => match timestamp_time_field(&key) {
                Some(time_key) => match NaiveDateTime::parse_from_str(&raw, SERVER_DATETIME_FORMAT) {
                    Ok(parsed) => {
                        derived_times.push((time_key, parsed.format("%H:%M").to_string()));
                        Value::String(parsed.format("%Y-%m-%d").to_string())
                    }
                    Err(_) => Value::String(raw),
                },
                None => Value::String(raw),
            },
            other => other,
        };
        out.insert(key, value);
    }

    for (time_key, time) in derived_times {
        out.insert(time_key.to_string(), Value::String(time));
    }
    out
}

/// Convert one canonical record back to the wire form for `create`/`write`.
pub fn denormalize_record(record: Record) -> Record {
    record
        .into_iter()
        .filter(|(key, _)| !SERVER_MANAGED_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| {
            let value = match value {
                Value::Object(object) => match object.get("id").filter(|id| id.is_i64()).cloned() {
                    Some(id) => id,
                    None => Value::Object(object),
                },
                other => other,
            };
            (key, value)
        })
        .collect()
}

fn is_reference_pair(items: &[Value]) -> bool {
    items.len() == 2 && items[0].is_i64() && items[1].is_string()
}

fn timestamp_time_field(key: &str) -> Option<&'static str> {
    TIMESTAMP_FIELDS
        .iter()
        .find(|(date_key, _)| *date_key == key)
        .map(|(_, time_key)| *time_key)
}
