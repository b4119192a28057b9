//! macboot - Bootstrap a macOS Python development environment.
//!
//! macboot brings a fresh macOS machine to the point where a project's
//! dependencies are installed: it checks the platform, installs Homebrew
//! if needed, installs a pinned Python and its pip, then installs the
//! project's `requirements.txt` from a mirror with a single fallback.
//! Every step checks first and only installs what is missing.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, layering, and validation
//! - [`error`] - Error types and result aliases
//! - [`fetch`] - Downloading the package manager's install script
//! - [`requirements`] - Tool lookup on PATH and environment facts
//! - [`runner`] - Step orchestration and failure classification
//! - [`shell`] - Shell command execution and shell profile management
//! - [`steps`] - The individual bootstrap steps
//! - [`ui`] - Spinners, summaries, and terminal output
//!
//! # Example
//!
//! ```
//! use macboot::requirements::{EnvironmentFacts, StaticLocator};
//! use macboot::config::BootConfig;
//! use macboot::shell::MemoryProfile;
//! use std::path::Path;
//!
//! let config = BootConfig::default().render();
//! let locator = StaticLocator::with_tools(&["brew", "python3.11"]);
//! let facts = EnvironmentFacts::gather(
//!     &config,
//!     "macos",
//!     Path::new("/nonexistent"),
//!     Path::new("/nonexistent"),
//!     &locator,
//!     &MemoryProfile::new(),
//! );
//! assert!(facts.runtime.status.is_present());
//! assert!(!facts.installer.status.is_present());
//! assert!(!facts.is_ready());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod requirements;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{BootError, Result};
