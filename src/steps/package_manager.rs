//! Package manager (Homebrew) bootstrap.
//!
//! The install script is downloaded first, under the network timeout, and
//! written to a temporary file. Running it is a separate command under the
//! command timeout. Profile lines are written only after the script exits
//! zero, and the profile is reloaded only after they are written.
//!
//! The script runs attached to the terminal: it asks for the user's sudo
//! password and confirmation itself, and falls back to its own
//! non-interactive mode when stdin is not a terminal.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::BootConfig;
use crate::error::{BootError, Result};
use crate::shell::shell_quote;

use super::{Step, StepContext, StepKind, StepOutcome};

static SCRIPT_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Ensures the package manager executable is resolvable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageManagerStep;

impl PackageManagerStep {
    fn script_path() -> PathBuf {
        let n = SCRIPT_COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("macboot-install-{}-{}.sh", std::process::id(), n))
    }
}

impl Step for PackageManagerStep {
    fn name(&self) -> &'static str {
        "package-manager"
    }

    fn kind(&self) -> StepKind {
        StepKind::Bootstrap
    }

    fn description(&self, config: &BootConfig) -> String {
        format!("Checking for {}", config.package_manager.binary)
    }

    fn uses_terminal(&self) -> bool {
        true
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let config = ctx.config;
        let pm = &config.package_manager;

        if let Some(path) = ctx.locate(&pm.binary) {
            tracing::debug!("{} found at {}", pm.binary, path.display());
            return Ok(StepOutcome::AlreadyPresent);
        }

        let lines = config.package_manager_lines();

        if ctx.dry_run {
            let mut actions = vec![
                format!("download {}", pm.install_script_url),
                "run the downloaded script with /bin/bash (may prompt for your password)"
                    .to_string(),
            ];
            actions.extend(ctx.planned_profile_actions(&lines));
            return Ok(StepOutcome::Planned { actions });
        }

        tracing::info!("Installing {} from {}", pm.binary, pm.install_script_url);
        let script = ctx.fetcher.fetch(&pm.install_script_url)?;

        let script_path = Self::script_path();
        fs::write(&script_path, script).map_err(BootError::Io)?;

        let command = format!("/bin/bash {}", shell_quote(&script_path.to_string_lossy()));
        let options = ctx.command_options().attached();
        let result = ctx.run_checked_with(&command, &options);

        if let Err(e) = fs::remove_file(&script_path) {
            tracing::debug!("Could not remove {}: {}", script_path.display(), e);
        }
        result?;

        ctx.persist_lines(&lines)?;
        let installed = ctx.verify_installed(&pm.binary)?;

        Ok(StepOutcome::Installed {
            detail: format!("{} at {}", pm.binary, installed.display()),
        })
    }
}
