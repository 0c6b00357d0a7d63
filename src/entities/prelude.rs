pub use super::categories::Entity as Categories;
pub use super::permissions::Entity as Permissions;
pub use super::person_roles::Entity as PersonRoles;
pub use super::persons::Entity as Persons;
pub use super::role_permissions::Entity as RolePermissions;
pub use super::roles::Entity as Roles;
