pub mod args;
pub mod backend;
pub mod command;

pub use args::IndexArgs;
pub use backend::{Backend, Response};
pub use command::{parse_command, Command};
