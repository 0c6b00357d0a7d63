mod persons;
mod seed;

pub use persons::cmd_list_persons;
pub use seed::cmd_seed;
