pub mod commands;

pub use commands::{Cli, Commands, init_logging, run};
