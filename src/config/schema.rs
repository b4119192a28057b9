//! Configuration schema types.
//!
//! Every field carries a default, so an empty file (or no file at all)
//! yields the stock macOS + Homebrew + Python setup. Strings may contain a
//! `{version}` placeholder that is filled from `runtime.version` by
//! [`BootConfig::render`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BootError, Result};

/// Placeholder substituted with the pinned runtime version.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootConfig {
    /// The single supported platform, as reported by `std::env::consts::OS`.
    pub platform: String,

    /// Package manager (Homebrew) settings.
    pub package_manager: PackageManagerConfig,

    /// Pinned language runtime settings.
    pub runtime: RuntimeConfig,

    /// Package installer settings.
    pub installer: InstallerConfig,

    /// Dependency manifest settings.
    pub manifest: ManifestConfig,

    /// Shell profile candidates, first existing wins.
    pub profiles: Vec<String>,

    /// Time limits for external operations.
    pub timeouts: TimeoutConfig,

    /// Continue to later steps after a bootstrap step fails.
    pub keep_going: bool,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            platform: "macos".to_string(),
            package_manager: PackageManagerConfig::default(),
            runtime: RuntimeConfig::default(),
            installer: InstallerConfig::default(),
            manifest: ManifestConfig::default(),
            profiles: vec!["~/.zshrc".to_string(), "~/.bash_profile".to_string()],
            timeouts: TimeoutConfig::default(),
            keep_going: false,
        }
    }
}

/// Package manager settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageManagerConfig {
    /// Executable looked up on PATH.
    pub binary: String,
    /// Remote bootstrap script.
    pub install_script_url: String,
    /// Profile line that activates the package manager.
    pub activation_line: String,
    /// Profile lines that point the package manager at a mirror.
    pub mirror_exports: Vec<String>,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            binary: "brew".to_string(),
            install_script_url:
                "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh".to_string(),
            activation_line: r#"eval "$(/opt/homebrew/bin/brew shellenv)""#.to_string(),
            mirror_exports: vec![
                "export HOMEBREW_BOTTLE_DOMAIN=https://mirrors.tuna.tsinghua.edu.cn/homebrew-bottles"
                    .to_string(),
                "export HOMEBREW_API_DOMAIN=https://mirrors.tuna.tsinghua.edu.cn/homebrew-bottles/api"
                    .to_string(),
            ],
        }
    }
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Pinned version, e.g. `3.11`.
    pub version: String,
    /// Package-manager formula to install.
    pub formula: String,
    /// Version-suffixed executable.
    pub binary: String,
    /// Profile line that puts the pinned runtime first on PATH.
    pub path_export: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            version: "3.11".to_string(),
            formula: "python@{version}".to_string(),
            binary: "python{version}".to_string(),
            path_export: r#"export PATH="/opt/homebrew/opt/python@{version}/bin:$PATH""#
                .to_string(),
        }
    }
}

/// Installer tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// Version-suffixed installer executable.
    pub binary: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            binary: "pip{version}".to_string(),
        }
    }
}

/// Manifest settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Manifest path, relative to the project root.
    pub path: PathBuf,
    /// Index tried first.
    pub primary_index: String,
    /// Index tried once if the primary attempt fails.
    pub fallback_index: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("requirements.txt"),
            primary_index: "https://pypi.tuna.tsinghua.edu.cn/simple".to_string(),
            fallback_index: "https://pypi.org/simple".to_string(),
        }
    }
}

/// Time limits, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutConfig {
    /// Limit for each external command.
    pub command_secs: u64,
    /// Limit for HTTP downloads.
    pub network_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            command_secs: 1800,
            network_secs: 60,
        }
    }
}

impl BootConfig {
    /// Fill `{version}` placeholders from `runtime.version`.
    pub fn render(mut self) -> Self {
        let version = self.runtime.version.clone();
        for field in [
            &mut self.runtime.formula,
            &mut self.runtime.binary,
            &mut self.runtime.path_export,
            &mut self.installer.binary,
        ] {
            *field = field.replace(VERSION_PLACEHOLDER, &version);
        }
        self
    }

    /// Check values that serde cannot check for us.
    pub fn validate(&self) -> Result<()> {
        if self.runtime.version.trim().is_empty() {
            return Err(invalid("runtime.version must not be empty"));
        }
        if self.profiles.is_empty() {
            return Err(invalid("at least one shell profile candidate is required"));
        }
        if self.timeouts.command_secs == 0 || self.timeouts.network_secs == 0 {
            return Err(invalid("timeouts must be greater than zero"));
        }
        for (key, url) in [
            ("manifest.primary_index", &self.manifest.primary_index),
            ("manifest.fallback_index", &self.manifest.fallback_index),
            (
                "package_manager.install_script_url",
                &self.package_manager.install_script_url,
            ),
        ] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(invalid(&format!("{} must be an http(s) URL: {}", key, url)));
            }
        }
        Ok(())
    }

    /// Profile candidates with `~` expanded against `home`.
    pub fn profile_paths(&self, home: &Path) -> Vec<PathBuf> {
        self.profiles
            .iter()
            .map(|p| expand_home(p, home))
            .collect()
    }

    /// Limit for each external command.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.command_secs)
    }

    /// Limit for HTTP downloads.
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.network_secs)
    }

    /// All lines the package-manager step writes, activation first.
    pub fn package_manager_lines(&self) -> Vec<String> {
        let mut lines = vec![self.package_manager.activation_line.clone()];
        lines.extend(self.package_manager.mirror_exports.iter().cloned());
        lines
    }
}

fn invalid(message: &str) -> BootError {
    BootError::ConfigValidationError {
        message: message.to_string(),
    }
}

fn expand_home(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}
