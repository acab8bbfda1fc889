// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Platform roles.

use serde::{Deserialize, Serialize};

/// Role a profile acts in.
///
/// ## Visibility
///
/// - `School` - every class and student of the school
/// - `Teacher` - own classes and their students
/// - `Parent` - linked children
/// - `Student` - self only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Parent,
    Teacher,
    School,
}

impl Role {
    /// Whether this role may see data scoped to `other`.
    pub fn can_view(&self, other: Role) -> bool {
        match (self, other) {
            (Role::School, _) => true,
            (Role::Teacher, Role::Student | Role::Teacher) => true,
            (Role::Parent, Role::Student | Role::Parent) => true,
            (Role::Student, Role::Student) => true,
            _ => false,
        }
    }

    /// Case-insensitive parse of the backend's role code.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_lowercase().as_str() {
            "student" => Some(Role::Student),
            "parent" => Some(Role::Parent),
            "teacher" => Some(Role::Teacher),
            "school" => Some(Role::School),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Parent => write!(f, "parent"),
            Role::Teacher => write!(f, "teacher"),
            Role::School => write!(f, "school"),
        }
    }
}
