//! In-memory stand-ins for the shell seams, for tests.
//!
//! # Example
//!
//! ```
//! use macboot::shell::{CommandOptions, CommandRunner, MockRunner};
//!
//! let mut runner = MockRunner::new();
//! runner.fail_when("pypi.tuna");
//!
//! let ok = runner.run("pip install -i https://pypi.org/simple", &CommandOptions::default());
//! let bad = runner.run("pip install -i https://pypi.tuna.tsinghua.edu.cn/simple", &CommandOptions::default());
//!
//! assert!(ok.unwrap().success);
//! assert!(!bad.unwrap().success);
//! assert_eq!(runner.commands().len(), 2);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BootError, Result};

use super::command::{CancelToken, CommandOptions, CommandResult, CommandRunner};
use super::profile::{contains_line, EnvironmentMutator};

type Hook = Box<dyn FnMut()>;

/// Records commands instead of running them.
///
/// Commands succeed unless they contain a substring registered with
/// [`fail_when`](Self::fail_when) or [`time_out_when`](Self::time_out_when).
/// Hooks registered with [`on_command`](Self::on_command) fire after a
/// matching command succeeds, which lets a test make a tool "appear".
/// Once a token passed to [`cancel_with`](Self::cancel_with) is cancelled,
/// every further command is refused like the real runner refuses it.
#[derive(Default)]
pub struct MockRunner {
    commands: Vec<String>,
    options: Vec<CommandOptions>,
    cancel: Option<CancelToken>,
    failing: Vec<String>,
    timing_out: Vec<String>,
    hooks: Vec<(String, Hook)>,
}

impl MockRunner {
    /// Create a runner where every command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make commands containing `pattern` exit 1.
    pub fn fail_when(&mut self, pattern: &str) {
        self.failing.push(pattern.to_string());
    }

    /// Make commands containing `pattern` time out.
    pub fn time_out_when(&mut self, pattern: &str) {
        self.timing_out.push(pattern.to_string());
    }

    /// Refuse commands once `token` is cancelled.
    pub fn cancel_with(&mut self, token: CancelToken) {
        self.cancel = Some(token);
    }

    /// Run `hook` whenever a command containing `pattern` succeeds.
    pub fn on_command(&mut self, pattern: &str, hook: impl FnMut() + 'static) {
        self.hooks.push((pattern.to_string(), Box::new(hook)));
    }

    /// Every command issued, in order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Options passed with each command, in order.
    pub fn options(&self) -> &[CommandOptions] {
        &self.options
    }

    /// Whether any issued command contains `pattern`.
    pub fn ran(&self, pattern: &str) -> bool {
        self.commands.iter().any(|c| c.contains(pattern))
    }

    /// How many issued commands contain `pattern`.
    pub fn count(&self, pattern: &str) -> usize {
        self.commands.iter().filter(|c| c.contains(pattern)).count()
    }
}

impl CommandRunner for MockRunner {
    fn run(&mut self, command: &str, options: &CommandOptions) -> Result<CommandResult> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(BootError::CommandCancelled {
                command: command.to_string(),
            });
        }

        self.commands.push(command.to_string());
        self.options.push(options.clone());

        if self.timing_out.iter().any(|p| command.contains(p.as_str())) {
            return Err(BootError::CommandTimedOut {
                command: command.to_string(),
                timeout: options.timeout.unwrap_or_default(),
            });
        }

        if self.failing.iter().any(|p| command.contains(p.as_str())) {
            return Ok(CommandResult::failure(
                Some(1),
                String::new(),
                format!("mock failure: {}", command),
                Duration::ZERO,
            ));
        }

        for (pattern, hook) in &mut self.hooks {
            if command.contains(pattern.as_str()) {
                hook();
            }
        }

        Ok(CommandResult::success(
            String::new(),
            String::new(),
            Duration::ZERO,
        ))
    }
}

/// Profile files and process environment kept in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryProfile {
    existing: HashSet<PathBuf>,
    files: HashMap<PathBuf, Vec<String>>,
    reloads: Vec<PathBuf>,
    applied: Vec<String>,
}

impl MemoryProfile {
    /// Create with no profile files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `path` exists (empty).
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.existing.insert(path.clone());
        self.files.entry(path).or_default();
        self
    }

    /// Lines currently in `path`.
    pub fn lines(&self, path: &Path) -> &[String] {
        self.files.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Paths reloaded, in order.
    pub fn reloads(&self) -> &[PathBuf] {
        &self.reloads
    }

    /// Lines applied without a profile, in order.
    pub fn applied(&self) -> &[String] {
        &self.applied
    }
}

impl EnvironmentMutator for MemoryProfile {
    fn select_profile(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        candidates.iter().find(|p| self.existing.contains(*p)).cloned()
    }

    fn append_line(&mut self, path: &Path, text: &str) -> Result<bool> {
        let lines = self.files.entry(path.to_path_buf()).or_default();
        if contains_line(&lines.join("\n"), text) {
            return Ok(false);
        }
        lines.push(text.to_string());
        self.existing.insert(path.to_path_buf());
        Ok(true)
    }

    fn reload(&mut self, path: &Path) -> Result<()> {
        self.reloads.push(path.to_path_buf());
        Ok(())
    }

    fn apply(&mut self, lines: &[String]) -> Result<()> {
        self.applied.extend(lines.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn mock_runner_records_in_order() {
        let mut runner = MockRunner::new();
        runner.run("first", &CommandOptions::default()).unwrap();
        runner.run("second", &CommandOptions::default()).unwrap();
        assert_eq!(runner.commands(), &["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn mock_runner_hooks_fire_on_success_only() {
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let mut runner = MockRunner::new();
        runner.on_command("brew install", move || counter.set(counter.get() + 1));
        runner.fail_when("broken");

        runner.run("brew install python@3.11", &CommandOptions::default()).unwrap();
        runner.run("brew install broken", &CommandOptions::default()).unwrap();

        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn mock_runner_time_out() {
        let mut runner = MockRunner::new();
        runner.time_out_when("sleep");
        let err = runner.run("sleep 10", &CommandOptions::default()).unwrap_err();
        assert!(matches!(err, BootError::CommandTimedOut { .. }));
    }

    #[test]
    fn mock_runner_refuses_after_cancel() {
        let cancel = CancelToken::new();
        let mut runner = MockRunner::new();
        runner.cancel_with(cancel.clone());

        runner.run("first", &CommandOptions::default()).unwrap();
        cancel.cancel();
        let err = runner.run("second", &CommandOptions::default()).unwrap_err();

        assert!(matches!(err, BootError::CommandCancelled { .. }));
        assert_eq!(runner.commands(), &["first".to_string()]);
    }

    #[test]
    fn memory_profile_dedupes() {
        let path = PathBuf::from("/home/dev/.zshrc");
        let mut profile = MemoryProfile::new().with_file(&path);
        assert!(profile.append_line(&path, "export A=1").unwrap());
        assert!(!profile.append_line(&path, "export A=1").unwrap());
        assert_eq!(profile.lines(&path).len(), 1);
    }

    #[test]
    fn memory_profile_selects_existing() {
        let zshrc = PathBuf::from("/home/dev/.zshrc");
        let bash = PathBuf::from("/home/dev/.bash_profile");
        let profile = MemoryProfile::new().with_file(&bash);
        assert_eq!(profile.select_profile(&[zshrc, bash.clone()]), Some(bash));
    }
}
