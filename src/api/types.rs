use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::models::category::Category;
use crate::models::person::PersonDetails;
use crate::models::role::{Permission, Role, RoleDetails};

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A person as exposed over HTTP. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct PersonDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub picture: Option<String>,
    /// Base64 of the stored blob
    pub biometric_fingerprint: Option<String>,
    pub category: Option<Category>,
    pub roles: Vec<Role>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PersonDetails> for PersonDto {
    fn from(details: PersonDetails) -> Self {
        let person = details.person;
        Self {
            id: person.id,
            first_name: person.first_name,
            last_name: person.last_name,
            email: person.email,
            picture: person.picture,
            biometric_fingerprint: person
                .biometric_fingerprint
                .map(|bytes| STANDARD.encode(bytes)),
            category: details.category,
            roles: details.roles,
            created_at: person.created_at,
            updated_at: person.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoleDto {
    pub id: i32,
    pub name: String,
    pub permissions: Vec<Permission>,
}

impl From<RoleDetails> for RoleDto {
    fn from(details: RoleDetails) -> Self {
        Self {
            id: details.role.id,
            name: details.role.name,
            permissions: details.permissions,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: PersonDto,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub uptime_seconds: u64,
}

// Requests. Required fields are still `Option` so that a missing field is
// reported as a 400 with a readable message.

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub picture: Option<String>,
    pub biometric_fingerprint: Option<String>,
    pub category_id: Option<i32>,
    #[serde(alias = "roleIds")]
    pub role_ids: Option<Vec<i32>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePersonRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub picture: Option<String>,
    pub biometric_fingerprint: Option<String>,
    pub category_id: Option<i32>,
    #[serde(alias = "roleIds")]
    pub role_ids: Option<Vec<i32>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePersonRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub picture: Option<String>,
    pub biometric_fingerprint: Option<String>,
    pub category_id: Option<i32>,
    #[serde(alias = "roleIds")]
    pub role_ids: Option<Vec<i32>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleRequest {
    pub name: Option<String>,
    #[serde(alias = "permissionIds")]
    pub permission_ids: Option<Vec<i32>>,
}

/// Body for entities that only carry a name (permissions, categories).
#[derive(Debug, Default, Deserialize)]
pub struct NameRequest {
    pub name: Option<String>,
}
