//! Shell profile mutation.
//!
//! The profile is the only file this tool writes. Lines are appended, never
//! rewritten, and an exact line that is already present is not appended a
//! second time, so repeated runs leave the file unchanged.
//!
//! Reloading sources the profile in a child shell, reads back the resulting
//! environment, and copies new or changed variables into this process.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BootError, Result};

use super::command::{execute, shell_quote, CancelToken, CommandOptions};
use super::platform::ShellType;

/// Variables that describe the child shell itself rather than the profile.
const SHELL_LOCAL_VARS: &[&str] = &["_", "SHLVL", "PWD", "OLDPWD", "PS1", "PS2"];

/// Persistent and in-process environment changes.
pub trait EnvironmentMutator {
    /// First candidate that exists as a file.
    fn select_profile(&self, candidates: &[PathBuf]) -> Option<PathBuf>;

    /// Append `text` as a line of `path`. Returns `false` when the exact
    /// line was already there and nothing was written.
    fn append_line(&mut self, path: &Path, text: &str) -> Result<bool>;

    /// Apply the profile at `path` to the current process environment.
    fn reload(&mut self, path: &Path) -> Result<()>;

    /// Apply shell statements to the current process without persisting them.
    fn apply(&mut self, lines: &[String]) -> Result<()>;
}

/// Real profile files and the real process environment.
#[derive(Debug, Clone)]
pub struct ShellProfile {
    cancel: CancelToken,
    timeout: Duration,
}

impl ShellProfile {
    /// Create a profile mutator whose reloads obey `timeout`.
    pub fn new(cancel: CancelToken, timeout: Duration) -> Self {
        Self { cancel, timeout }
    }

    fn capture_env(&self, shell: PathBuf, script: &str) -> Result<HashMap<String, String>> {
        let command = format!("{{ {}\n}} >/dev/null 2>&1; env -0", script);
        let options = CommandOptions {
            shell: Some(shell),
            ..CommandOptions::captured().with_timeout(self.timeout)
        };
        let result = execute(&command, &options, &self.cancel)?.check(&command)?;
        Ok(parse_env_block(&result.stdout))
    }
}

impl EnvironmentMutator for ShellProfile {
    fn select_profile(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        candidates.iter().find(|p| p.is_file()).cloned()
    }

    fn append_line(&mut self, path: &Path, text: &str) -> Result<bool> {
        let existing = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(profile_error(path, e)),
        };

        if contains_line(&existing, text) {
            tracing::debug!("{} already contains: {}", path.display(), text);
            return Ok(false);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| profile_error(path, e))?;

        let separator = if existing.is_empty() || existing.ends_with('\n') {
            ""
        } else {
            "\n"
        };
        writeln!(file, "{}{}", separator, text.trim_end()).map_err(|e| profile_error(path, e))?;

        tracing::info!("Appended to {}: {}", path.display(), text);
        Ok(true)
    }

    fn reload(&mut self, path: &Path) -> Result<()> {
        let shell = ShellType::for_profile(path).interpreter();
        let script = format!(". {}", shell_quote(&path.to_string_lossy()));
        let captured = self.capture_env(shell, &script)?;
        let changed = apply_to_process(&captured);
        tracing::debug!("Reloaded {} ({} variables changed)", path.display(), changed);
        Ok(())
    }

    fn apply(&mut self, lines: &[String]) -> Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        let captured = self.capture_env(PathBuf::from("/bin/sh"), &lines.join("\n"))?;
        apply_to_process(&captured);
        Ok(())
    }
}

/// Whether `content` already has `line` as one of its lines.
pub fn contains_line(content: &str, line: &str) -> bool {
    let wanted = line.trim();
    content.lines().any(|l| l.trim() == wanted)
}

/// Parse the NUL-separated output of `env -0`.
pub fn parse_env_block(block: &str) -> HashMap<String, String> {
    block
        .split('\0')
        .filter_map(|entry| {
            let entry = entry.trim_start_matches('\n');
            let (key, value) = entry.split_once('=')?;
            if key.is_empty() {
                None
            } else {
                Some((key.to_string(), value.to_string()))
            }
        })
        .collect()
}

fn apply_to_process(vars: &HashMap<String, String>) -> usize {
    let mut changed = 0;
    for (key, value) in vars {
        if SHELL_LOCAL_VARS.contains(&key.as_str()) {
            continue;
        }
        if std::env::var(key).ok().as_deref() != Some(value.as_str()) {
            std::env::set_var(key, value);
            changed += 1;
        }
    }
    changed
}

fn profile_error(path: &Path, e: std::io::Error) -> BootError {
    BootError::ProfileError {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile() -> ShellProfile {
        ShellProfile::new(CancelToken::new(), Duration::from_secs(10))
    }

    #[test]
    fn select_profile_takes_first_existing() {
        let temp = TempDir::new().unwrap();
        let zshrc = temp.path().join(".zshrc");
        let bash_profile = temp.path().join(".bash_profile");
        fs::write(&bash_profile, "").unwrap();

        let candidates = vec![zshrc.clone(), bash_profile.clone()];
        assert_eq!(profile().select_profile(&candidates), Some(bash_profile));

        fs::write(&zshrc, "").unwrap();
        assert_eq!(profile().select_profile(&candidates), Some(zshrc));
    }

    #[test]
    fn select_profile_none_when_nothing_exists() {
        let temp = TempDir::new().unwrap();
        let candidates = vec![temp.path().join(".zshrc")];
        assert_eq!(profile().select_profile(&candidates), None);
    }

    #[test]
    fn append_line_writes_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".zshrc");
        fs::write(&path, "alias ll='ls -l'\n").unwrap();
        let mut profile = profile();

        assert!(profile.append_line(&path, "export A=1").unwrap());
        assert!(!profile.append_line(&path, "export A=1").unwrap());

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "alias ll='ls -l'\nexport A=1\n");
    }

    #[test]
    fn append_line_adds_missing_newline() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".zshrc");
        fs::write(&path, "export OLD=1").unwrap();

        profile().append_line(&path, "export NEW=2").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "export OLD=1\nexport NEW=2\n");
    }

    #[test]
    fn contains_line_ignores_surrounding_whitespace() {
        assert!(contains_line("  export A=1  \nexport B=2\n", "export A=1"));
        assert!(!contains_line("export A=10\n", "export A=1"));
    }

    #[test]
    fn parse_env_block_splits_on_nul() {
        let vars = parse_env_block("A=1\0B=x=y\0MULTI=line1\nline2\0");
        assert_eq!(vars.get("A").map(String::as_str), Some("1"));
        assert_eq!(vars.get("B").map(String::as_str), Some("x=y"));
        assert_eq!(vars.get("MULTI").map(String::as_str), Some("line1\nline2"));
    }

    #[test]
    fn reload_applies_profile_exports() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("profile.sh");
        fs::write(&path, "export MACBOOT_RELOAD_TEST=from_profile\n").unwrap();

        profile().reload(&path).unwrap();

        assert_eq!(
            std::env::var("MACBOOT_RELOAD_TEST").as_deref(),
            Ok("from_profile")
        );
    }

    #[test]
    fn output_of_every_statement_is_discarded() {
        let script = "echo first\necho second\nexport MACBOOT_QUIET_TEST=1";
        let vars = profile()
            .capture_env(PathBuf::from("/bin/sh"), script)
            .unwrap();

        assert_eq!(vars.get("MACBOOT_QUIET_TEST").map(String::as_str), Some("1"));
        assert!(vars.keys().all(|k| !k.contains("first") && !k.contains("second")));
    }

    #[test]
    fn apply_sets_variables_without_a_file() {
        profile()
            .apply(&["export MACBOOT_APPLY_TEST=direct".to_string()])
            .unwrap();

        assert_eq!(std::env::var("MACBOOT_APPLY_TEST").as_deref(), Ok("direct"));
    }
}
