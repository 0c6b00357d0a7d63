use serde::{Deserialize, Serialize};

use crate::entities::{permissions, roles};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

impl From<roles::Model> for Role {
    fn from(model: roles::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i32,
    pub name: String,
}

impl From<permissions::Model> for Permission {
    fn from(model: permissions::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// A role together with its permission edges.
#[derive(Debug, Clone)]
pub struct RoleDetails {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub permission_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleChanges {
    pub name: Option<String>,

    /// Replaces the whole permission set when present.
    pub permission_ids: Option<Vec<i32>>,
}
