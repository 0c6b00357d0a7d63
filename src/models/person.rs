use crate::entities::persons;
use crate::models::category::Category;
use crate::models::role::Role;

/// Person data returned from the store (without the password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub picture: Option<String>,
    pub biometric_fingerprint: Option<Vec<u8>>,
    pub category_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<persons::Model> for Person {
    fn from(model: persons::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            picture: model.picture,
            biometric_fingerprint: model.biometric_fingerprint,
            category_id: model.category_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A person with its category and current role edges.
#[derive(Debug, Clone)]
pub struct PersonDetails {
    pub person: Person,
    pub category: Option<Category>,
    pub roles: Vec<Role>,
}

impl PersonDetails {
    #[must_use]
    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }

    /// True when at least one of the person's roles is in `required`.
    #[must_use]
    pub fn has_any_role(&self, required: &[&str]) -> bool {
        self.roles
            .iter()
            .any(|role| required.contains(&role.name.as_str()))
    }
}

/// Input for creating a person. The password is plaintext here and is hashed
/// by the store before it is written.
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub picture: Option<String>,
    pub biometric_fingerprint: Option<Vec<u8>>,
    pub category_id: Option<i32>,

    /// `None` or empty assigns the `user` role.
    pub role_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Default)]
pub struct PersonChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub picture: Option<String>,
    pub biometric_fingerprint: Option<Vec<u8>>,
    pub category_id: Option<i32>,

    /// Replaces the whole role set when present.
    pub role_ids: Option<Vec<i32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(roles: &[&str]) -> PersonDetails {
        PersonDetails {
            person: Person {
                id: 1,
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                picture: None,
                biometric_fingerprint: None,
                category_id: None,
                created_at: String::new(),
                updated_at: String::new(),
            },
            category: None,
            roles: roles
                .iter()
                .zip(1..)
                .map(|(name, id)| Role {
                    id,
                    name: (*name).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_has_any_role() {
        let person = details(&["user", "editor"]);
        assert!(person.has_any_role(&["admin", "editor"]));
        assert!(!person.has_any_role(&["admin"]));
        assert!(!person.has_any_role(&[]));
    }

    #[test]
    fn test_no_roles_never_matches() {
        let person = details(&[]);
        assert!(!person.has_any_role(&["user"]));
        assert!(person.role_names().is_empty());
    }
}
