//! Run command implementation.
//!
//! The `macboot run` command (and bare `macboot`) bootstraps the machine.

use std::path::{Path, PathBuf};

use anyhow::anyhow;

use crate::cli::args::RunArgs;
use crate::config::{load_config, BootConfig};
use crate::error::{BootError, Result};
use crate::fetch::HttpFetcher;
use crate::requirements::PathLocator;
use crate::runner::{Orchestrator, RunReport};
use crate::shell::{current_platform, is_elevated, CancelToken, ShellProfile, ShellRunner};
use crate::steps::{default_steps, StepContext};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

const ELEVATION_HINT: &str = "Some installers need administrator rights: re-run from an \
     administrator account and enter your password when prompted. Do not run macboot itself \
     with sudo.";

const ROOT_HINT: &str =
    "Homebrew refuses to install as root: re-run macboot as your normal (administrator) user.";

/// Hint shown after a failed run.
fn failure_hint(elevated: bool) -> &'static str {
    if elevated {
        ROOT_HINT
    } else {
        ELEVATION_HINT
    }
}

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(Path::to_path_buf),
            args,
        }
    }

    /// Load configuration and fold in the command-line overrides.
    fn load(&self) -> Result<BootConfig> {
        let config = load_config(&self.project_root, self.config_path.as_deref())?;
        apply_overrides(config, &self.args)
    }

    fn report_failure(&self, report: &RunReport, ui: &mut dyn UserInterface) {
        if let Some(err) = &report.halted_by {
            ui.error(&err.to_string());
            if matches!(err, BootError::CommandCancelled { .. }) {
                return;
            }
        }
        ui.show_hint(failure_hint(is_elevated()));
    }
}

/// Merge `--keep-going` and `--timeout` over the loaded configuration.
pub fn apply_overrides(mut config: BootConfig, args: &RunArgs) -> Result<BootConfig> {
    config.keep_going |= args.keep_going;
    if let Some(secs) = args.timeout {
        config.timeouts.command_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.load()?;
        let home = dirs::home_dir()
            .ok_or_else(|| BootError::Other(anyhow!("could not determine home directory")))?;
        let platform = current_platform();

        let cancel = CancelToken::on_interrupt();
        let streaming = ui.output_mode().shows_command_output();
        let mut runner = ShellRunner::new(cancel.clone()).streaming(streaming);
        let mut env = ShellProfile::new(cancel, config.command_timeout());
        let fetcher = HttpFetcher::with_timeout(config.network_timeout())?;
        let locator = PathLocator;

        if self.args.dry_run {
            ui.show_header("macboot (dry run)");
        } else {
            ui.show_header("macboot");
        }
        tracing::info!(
            "Bootstrapping {} on {} (runtime {})",
            self.project_root.display(),
            platform,
            config.runtime.version
        );

        let orchestrator = Orchestrator::new(default_steps()).keep_going(config.keep_going);
        let report = {
            let mut ctx = StepContext {
                config: &config,
                project_root: &self.project_root,
                platform: &platform,
                home: &home,
                dry_run: self.args.dry_run,
                runner: &mut runner,
                locator: &locator,
                env: &mut env,
                fetcher: &fetcher,
                ui: &mut *ui,
            };
            orchestrator.run(&mut ctx)
        };

        ui.show_summary(&report.summary());

        if report.success() {
            Ok(CommandResult::success())
        } else {
            self.report_failure(&report, ui);
            Ok(CommandResult::failure(report.exit_code()))
        }
    }
}
