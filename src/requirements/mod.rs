//! Requirement detection.
//!
//! This module answers whether the package manager, runtime, and installer
//! tool are resolvable, and summarizes the host for the `status` command.
//!
//! # Modules
//!
//! - [`probe`] - PATH lookup and the [`ToolLocator`] seam
//! - [`status`] - Tool status and environment fact types

pub mod probe;
pub mod status;

pub use probe::{
    is_executable, parse_system_path, resolve_tool_path, PathLocator, StaticLocator, ToolLocator,
};
pub use status::{EnvironmentFacts, ToolFact, ToolStatus};
