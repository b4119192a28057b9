//! Platform and shell detection.

use std::path::{Path, PathBuf};

/// Identifier of the platform this binary is running on.
///
/// Matches `std::env::consts::OS` (`macos`, `linux`, `windows`, ...).
/// `MACBOOT_PLATFORM` overrides it, which lets the guard be exercised on
/// any host.
pub fn current_platform() -> String {
    std::env::var("MACBOOT_PLATFORM").unwrap_or_else(|_| std::env::consts::OS.to_string())
}

/// Known shell types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Zsh,
    Unknown,
}

impl ShellType {
    /// Infer which shell reads a given startup file.
    pub fn for_profile(profile: &Path) -> Self {
        let name = profile
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if name.starts_with(".zsh") || name == ".zprofile" || name == ".zlogin" {
            ShellType::Zsh
        } else if name.starts_with(".bash") {
            ShellType::Bash
        } else {
            ShellType::Unknown
        }
    }

    /// Interpreter used to source files written for this shell.
    pub fn interpreter(&self) -> PathBuf {
        match self {
            ShellType::Zsh => PathBuf::from("/bin/zsh"),
            ShellType::Bash => PathBuf::from("/bin/bash"),
            ShellType::Unknown => PathBuf::from("/bin/sh"),
        }
    }
}

/// Check if running in a CI environment.
///
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "JENKINS_URL"]
        .iter()
        .any(|var| std::env::var(var).is_ok())
}

/// Check if running as root.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    {
        false
    }
}
