//! Shell command execution.

pub mod command;
pub mod platform;

pub use command::{execute, execute_checked, CommandOptions, CommandResult};
pub use platform::{is_ci, ShellType};
