//! The bootstrap steps.
//!
//! Each step is an existence check followed by install-or-skip:
//!
//! - [`OsGuard`] - refuse to run on an unsupported platform
//! - [`PackageManagerStep`] - Homebrew via its remote install script
//! - [`RuntimeStep`] - the pinned Python through the package manager
//! - [`InstallerToolStep`] - pip through the runtime's `ensurepip`
//! - [`ManifestGuard`] - refuse to continue without the manifest
//! - [`DependencyStep`] - upgrade pip, install the manifest, fall back once
//!
//! Steps never touch the outside world directly. Everything goes through
//! the collaborators in [`StepContext`], so tests can swap them out.
//!
//! # Example
//!
//! ```
//! use macboot::steps::{default_steps, StepKind};
//!
//! let steps = default_steps();
//! assert_eq!(steps.len(), 6);
//! assert_eq!(steps[0].kind(), StepKind::Guard);
//! ```

pub mod dependencies;
pub mod installer_tool;
pub mod os_guard;
pub mod package_manager;
pub mod runtime;

use std::path::{Path, PathBuf};

use crate::config::BootConfig;
use crate::error::{BootError, Result};
use crate::fetch::ScriptFetcher;
use crate::requirements::ToolLocator;
use crate::shell::{CommandOptions, CommandResult, CommandRunner, EnvironmentMutator};
use crate::ui::UserInterface;

pub use dependencies::{DependencyStep, ManifestGuard};
pub use installer_tool::InstallerToolStep;
pub use os_guard::OsGuard;
pub use package_manager::PackageManagerStep;
pub use runtime::RuntimeStep;

/// Lines of stderr kept when a command fails.
const STDERR_TAIL_LINES: usize = 5;

/// How a failure of a step is treated by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// A precondition. Failure always stops the run.
    Guard,
    /// Installs a tool. Failure stops the run unless keep-going is set.
    Bootstrap,
    /// Installs the manifest. Failure always stops the run.
    Dependencies,
}

/// What a step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing to do.
    AlreadyPresent,
    /// Something was installed or changed.
    Installed { detail: String },
    /// Dry run: what would have been done.
    Planned { actions: Vec<String> },
}

/// A single bootstrap step.
pub trait Step {
    /// Short identifier shown in the summary.
    fn name(&self) -> &'static str;

    /// Failure class.
    fn kind(&self) -> StepKind;

    /// What the step is doing, for spinners.
    fn description(&self, config: &BootConfig) -> String;

    /// Whether the step may run a command attached to the terminal, which
    /// rules out an animated spinner.
    fn uses_terminal(&self) -> bool {
        false
    }

    /// Run the step.
    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome>;
}

/// Everything a step may read or act on.
pub struct StepContext<'a> {
    /// Rendered configuration.
    pub config: &'a BootConfig,
    /// Directory commands run in and the manifest is resolved against.
    pub project_root: &'a Path,
    /// Identifier of the running platform.
    pub platform: &'a str,
    /// Home directory profile paths are expanded against.
    pub home: &'a Path,
    /// Report instead of act.
    pub dry_run: bool,
    /// Runs external commands.
    pub runner: &'a mut dyn CommandRunner,
    /// Resolves executables.
    pub locator: &'a dyn ToolLocator,
    /// Owns the shell profile and process environment.
    pub env: &'a mut dyn EnvironmentMutator,
    /// Downloads remote scripts.
    pub fetcher: &'a dyn ScriptFetcher,
    /// User-facing output.
    pub ui: &'a mut dyn UserInterface,
}

impl StepContext<'_> {
    /// Default options for external commands: project root, captured
    /// output, configured timeout.
    pub fn command_options(&self) -> CommandOptions {
        CommandOptions {
            cwd: Some(self.project_root.to_path_buf()),
            ..CommandOptions::captured().with_timeout(self.config.command_timeout())
        }
    }

    /// Full path of `tool`, if resolvable right now.
    pub fn locate(&self, tool: &str) -> Option<PathBuf> {
        self.locator.locate(tool)
    }

    /// Run `command` and turn a non-zero exit into an error.
    pub fn run_checked(&mut self, command: &str) -> Result<CommandResult> {
        let options = self.command_options();
        self.run_checked_with(command, &options)
    }

    /// Like [`run_checked`](Self::run_checked) with explicit options.
    pub fn run_checked_with(
        &mut self,
        command: &str,
        options: &CommandOptions,
    ) -> Result<CommandResult> {
        let result = self.runner.run(command, options)?;
        if !result.success {
            let tail = result.stderr_tail(STDERR_TAIL_LINES);
            if !tail.is_empty() {
                tracing::warn!("{} failed:\n{}", command, tail);
            }
        }
        result.check(command)
    }

    /// Persist `lines` in the first existing shell profile, then reload it.
    ///
    /// Lines already in the profile are not written again. Without any
    /// profile the lines are applied to this process only and the user is
    /// told what to add by hand.
    pub fn persist_lines(&mut self, lines: &[String]) -> Result<()> {
        let candidates = self.config.profile_paths(self.home);
        let Some(profile) = self.env.select_profile(&candidates) else {
            self.ui.warning(&format!(
                "No shell profile found (looked for {}); add these lines manually:",
                self.config.profiles.join(", ")
            ));
            for line in lines {
                self.ui.message(&format!("    {}", line));
            }
            return self.env.apply(lines);
        };

        let mut appended = 0;
        for line in lines {
            if self.env.append_line(&profile, line)? {
                appended += 1;
            }
        }
        tracing::info!(
            "{} of {} lines appended to {}",
            appended,
            lines.len(),
            profile.display()
        );

        self.env.reload(&profile)
    }

    /// Look `tool` up after its installer reported success.
    pub fn verify_installed(&self, tool: &str) -> Result<PathBuf> {
        self.locate(tool).ok_or_else(|| BootError::RequirementMissing {
            requirement: tool.to_string(),
            message: "installed but not found on PATH".to_string(),
        })
    }

    /// The profile that would receive lines, for dry-run reports.
    pub fn target_profile(&self) -> Option<PathBuf> {
        self.env
            .select_profile(&self.config.profile_paths(self.home))
    }

    /// Dry-run actions that describe appending `lines`.
    pub fn planned_profile_actions(&self, lines: &[String]) -> Vec<String> {
        let target = match self.target_profile() {
            Some(path) => path.display().to_string(),
            None => "current environment (no profile found)".to_string(),
        };
        lines
            .iter()
            .map(|line| format!("append to {}: {}", target, line))
            .collect()
    }
}

/// The full sequence, in execution order.
pub fn default_steps() -> Vec<Box<dyn Step>> {
    vec![
        Box::new(OsGuard),
        Box::new(PackageManagerStep),
        Box::new(RuntimeStep),
        Box::new(InstallerToolStep),
        Box::new(ManifestGuard),
        Box::new(DependencyStep),
    ]
}
