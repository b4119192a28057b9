//! Shell command execution and environment management.

pub mod command;
pub mod mock;
pub mod platform;
pub mod profile;

pub use command::{
    execute, shell_quote, CancelToken, CommandOptions, CommandResult,
    CommandRunner, ShellRunner,
};
pub use mock::{MemoryProfile, MockRunner};
pub use platform::{current_platform, is_ci, is_elevated, ShellType};
pub use profile::{EnvironmentMutator, ShellProfile};
