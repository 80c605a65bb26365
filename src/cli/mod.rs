mod commands;
pub mod handlers;

pub use commands::{Cli, Commands, CompletionArgs, FrameworkArg, PrioritizeArgs};
