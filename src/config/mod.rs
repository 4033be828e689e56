pub mod args;
mod r#impl;
mod structs;

pub use args::CliArgs;
pub use r#impl::{get_config, init_config, try_get_config};
pub use structs::*;
