//! Environment facts.
//!
//! A snapshot of what is present on this machine, gathered fresh each time
//! and never cached. The `status` command prints it; nothing here changes
//! the system.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::BootConfig;
use crate::shell::EnvironmentMutator;

use super::probe::ToolLocator;

/// Whether a single tool is resolvable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ToolStatus {
    /// Found on PATH.
    Present { path: PathBuf },
    /// Not resolvable.
    Missing,
}

impl ToolStatus {
    /// Look `tool` up with `locator`.
    pub fn probe(tool: &str, locator: &dyn ToolLocator) -> Self {
        match locator.locate(tool) {
            Some(path) => ToolStatus::Present { path },
            None => ToolStatus::Missing,
        }
    }

    /// Whether the tool was found.
    pub fn is_present(&self) -> bool {
        matches!(self, ToolStatus::Present { .. })
    }
}

/// A named tool and its status.
#[derive(Debug, Clone, Serialize)]
pub struct ToolFact {
    /// Executable name that was looked up.
    pub name: String,
    /// What the lookup found.
    pub status: ToolStatus,
}

impl ToolFact {
    fn probe(name: &str, locator: &dyn ToolLocator) -> Self {
        Self {
            name: name.to_string(),
            status: ToolStatus::probe(name, locator),
        }
    }
}

/// Everything the run checks before acting.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentFacts {
    /// Platform identifier of this host.
    pub platform: String,
    /// Whether that platform is the supported one.
    pub platform_supported: bool,
    /// The package manager executable.
    pub package_manager: ToolFact,
    /// The pinned runtime executable.
    pub runtime: ToolFact,
    /// The installer tool executable.
    pub installer: ToolFact,
    /// Absolute manifest path.
    pub manifest: PathBuf,
    /// Whether the manifest exists.
    pub manifest_present: bool,
    /// Shell profile that would receive exports, if any.
    pub profile: Option<PathBuf>,
}

impl EnvironmentFacts {
    /// Gather facts for `config` on this host.
    pub fn gather(
        config: &BootConfig,
        platform: &str,
        project_root: &Path,
        home: &Path,
        locator: &dyn ToolLocator,
        env: &dyn EnvironmentMutator,
    ) -> Self {
        let manifest = project_root.join(&config.manifest.path);
        Self {
            platform: platform.to_string(),
            platform_supported: platform == config.platform,
            package_manager: ToolFact::probe(&config.package_manager.binary, locator),
            runtime: ToolFact::probe(&config.runtime.binary, locator),
            installer: ToolFact::probe(&config.installer.binary, locator),
            manifest_present: manifest.is_file(),
            manifest,
            profile: env.select_profile(&config.profile_paths(home)),
        }
    }

    /// Whether a run would have nothing to install before the manifest.
    pub fn is_ready(&self) -> bool {
        self.platform_supported
            && self.package_manager.status.is_present()
            && self.runtime.status.is_present()
            && self.installer.status.is_present()
            && self.manifest_present
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::StaticLocator;
    use crate::shell::MemoryProfile;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn tool_status_probe() {
        let locator = StaticLocator::with_tools(&["brew"]);
        assert!(ToolStatus::probe("brew", &locator).is_present());
        assert_eq!(ToolStatus::probe("python3.11", &locator), ToolStatus::Missing);
    }

    #[test]
    fn gather_reports_missing_tools() {
        let temp = TempDir::new().unwrap();
        let config = BootConfig::default().render();
        let locator = StaticLocator::with_tools(&["brew"]);
        let env = MemoryProfile::new();

        let facts =
            EnvironmentFacts::gather(&config, "macos", temp.path(), temp.path(), &locator, &env);

        assert!(facts.platform_supported);
        assert!(facts.package_manager.status.is_present());
        assert!(!facts.runtime.status.is_present());
        assert!(!facts.manifest_present);
        assert!(facts.profile.is_none());
        assert!(!facts.is_ready());
    }

    #[test]
    fn gather_ready_when_everything_present() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("requirements.txt"), "requests\n").unwrap();
        let config = BootConfig::default().render();
        let locator = StaticLocator::with_tools(&["brew", "python3.11", "pip3.11"]);
        let env = MemoryProfile::new().with_file(temp.path().join(".zshrc"));

        let facts =
            EnvironmentFacts::gather(&config, "macos", temp.path(), temp.path(), &locator, &env);

        assert!(facts.is_ready());
        assert_eq!(facts.profile, Some(temp.path().join(".zshrc")));
    }

    #[test]
    fn unsupported_platform_is_not_ready() {
        let temp = TempDir::new().unwrap();
        let config = BootConfig::default().render();
        let locator = StaticLocator::new();
        let env = MemoryProfile::new();

        let facts =
            EnvironmentFacts::gather(&config, "linux", temp.path(), temp.path(), &locator, &env);

        assert!(!facts.platform_supported);
        assert!(!facts.is_ready());
    }

    #[test]
    fn facts_serialize_to_json() {
        let temp = TempDir::new().unwrap();
        let config = BootConfig::default().render();
        let locator = StaticLocator::with_tools(&["brew"]);
        let env = MemoryProfile::new();

        let facts =
            EnvironmentFacts::gather(&config, "macos", temp.path(), temp.path(), &locator, &env);
        let json = serde_json::to_value(&facts).unwrap();

        assert_eq!(json["package_manager"]["status"]["state"], "present");
        assert_eq!(json["runtime"]["status"]["state"], "missing");
        assert_eq!(json["platform"], "macos");
    }
}
