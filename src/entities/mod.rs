pub mod prelude;

pub mod categories;
pub mod permissions;
pub mod person_roles;
pub mod persons;
pub mod role_permissions;
pub mod roles;
