pub mod category;
pub mod permission;
pub mod person;
pub mod role;
