pub mod category;
pub mod person;
pub mod role;
