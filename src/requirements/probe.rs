//! Executable lookup on the search path.
//!
//! Lookups read `PATH` every time they run. A profile reload earlier in the
//! run can change `PATH`, and a cached answer would miss a tool that was
//! just installed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On other platforms executability is not tracked by permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable. Does NOT use
/// the `which` command, whose behavior varies across systems.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    if tool.contains('/') {
        let candidate = PathBuf::from(tool);
        return (candidate.is_file() && is_executable(&candidate)).then_some(candidate);
    }

    path_entries
        .iter()
        .map(|dir| dir.join(tool))
        .find(|candidate| candidate.is_file() && is_executable(candidate))
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Answers "is this executable resolvable right now?".
pub trait ToolLocator {
    /// Full path of `tool`, if resolvable.
    fn locate(&self, tool: &str) -> Option<PathBuf>;
}

/// Looks tools up on the live process `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        let found = resolve_tool_path(tool, &parse_system_path());
        tracing::debug!("Lookup {} -> {:?}", tool, found);
        found
    }
}

/// Locator backed by a fixed, mutable set of tools, for tests.
///
/// # Example
///
/// ```
/// use macboot::requirements::{StaticLocator, ToolLocator};
///
/// let locator = StaticLocator::with_tools(&["brew"]);
/// assert!(locator.locate("brew").is_some());
/// assert!(locator.locate("python3.11").is_none());
///
/// locator.add("python3.11");
/// assert!(locator.locate("python3.11").is_some());
/// ```
#[derive(Debug, Default)]
pub struct StaticLocator {
    tools: RefCell<HashMap<String, PathBuf>>,
}

impl StaticLocator {
    /// Create with no tools.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with the given tools under `/usr/local/bin`.
    pub fn with_tools(tools: &[&str]) -> Self {
        let locator = Self::new();
        for tool in tools {
            locator.add(tool);
        }
        locator
    }

    /// Make `tool` resolvable.
    pub fn add(&self, tool: &str) {
        self.tools
            .borrow_mut()
            .insert(tool.to_string(), Path::new("/usr/local/bin").join(tool));
    }

    /// Make `tool` unresolvable again.
    pub fn remove(&self, tool: &str) {
        self.tools.borrow_mut().remove(tool);
    }
}

impl ToolLocator for StaticLocator {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        self.tools.borrow().get(tool).cloned()
    }
}
