//! Error types for macboot operations.
//!
//! This module defines [`BootError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `BootError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `BootError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Core error type for macboot operations.
#[derive(Debug, Error)]
pub enum BootError {
    /// The running platform is not the supported one.
    #[error("Unsupported platform '{actual}': this setup only supports {expected}")]
    UnsupportedPlatform { expected: String, actual: String },

    /// The dependency manifest does not exist.
    #[error("Dependency manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Configuration file not found at an explicitly requested location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Shell command could not be spawned or exited non-zero.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Shell command ran past its deadline and was killed.
    #[error("Command timed out after {}s: {command}", timeout.as_secs())]
    CommandTimedOut { command: String, timeout: Duration },

    /// Shell command was cancelled before it finished.
    #[error("Command cancelled: {command}")]
    CommandCancelled { command: String },

    /// A tool is still not resolvable after its installer reported success.
    #[error("Missing requirement '{requirement}': {message}")]
    RequirementMissing {
        requirement: String,
        message: String,
    },

    /// Downloading a remote resource failed.
    #[error("Failed to fetch {url}: {message}")]
    FetchFailed { url: String, message: String },

    /// Reading or writing a shell profile failed.
    #[error("Shell profile {path}: {message}")]
    ProfileError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BootError {
    /// Whether this error is one of the preconditions that halt the run
    /// before anything is installed.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatform { .. } | Self::ManifestNotFound { .. }
        )
    }
}

/// Result type alias for macboot operations.
pub type Result<T> = std::result::Result<T, BootError>;
