//! Installer tool (pip) bootstrap.

use crate::config::BootConfig;
use crate::error::Result;

use super::{Step, StepContext, StepKind, StepOutcome};

/// Ensures the installer executable is resolvable, using the runtime's
/// bundled bootstrap module. Writes nothing to the profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallerToolStep;

impl InstallerToolStep {
    fn bootstrap_command(config: &BootConfig) -> String {
        format!("{} -m ensurepip --upgrade", config.runtime.binary)
    }
}

impl Step for InstallerToolStep {
    fn name(&self) -> &'static str {
        "installer-tool"
    }

    fn kind(&self) -> StepKind {
        StepKind::Bootstrap
    }

    fn description(&self, config: &BootConfig) -> String {
        format!("Checking for {}", config.installer.binary)
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let config = ctx.config;
        let installer = &config.installer;

        if let Some(path) = ctx.locate(&installer.binary) {
            tracing::debug!("{} found at {}", installer.binary, path.display());
            return Ok(StepOutcome::AlreadyPresent);
        }

        let command = Self::bootstrap_command(config);

        if ctx.dry_run {
            return Ok(StepOutcome::Planned {
                actions: vec![command],
            });
        }

        ctx.run_checked(&command)?;
        let installed = ctx.verify_installed(&installer.binary)?;

        Ok(StepOutcome::Installed {
            detail: format!("{} at {}", installer.binary, installed.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootError;
    use crate::steps::testing::Fixture;

    #[test]
    fn present_installer_is_left_alone() {
        let mut fx = Fixture::new();
        fx.locator.add("pip3.11");

        assert_eq!(
            fx.run(&InstallerToolStep).unwrap(),
            StepOutcome::AlreadyPresent
        );
        assert!(fx.runner.commands().is_empty());
    }

    #[test]
    fn missing_installer_is_bootstrapped_from_runtime() {
        let mut fx = Fixture::new().with_profile();
        fx.installs("ensurepip", "pip3.11");

        let outcome = fx.run(&InstallerToolStep).unwrap();

        assert!(matches!(outcome, StepOutcome::Installed { .. }));
        assert_eq!(
            fx.runner.commands(),
            &["python3.11 -m ensurepip --upgrade".to_string()]
        );
        assert!(fx.env.lines(&fx.zshrc()).is_empty());
        assert!(fx.env.reloads().is_empty());
    }

    #[test]
    fn bootstrap_failure_is_reported() {
        let mut fx = Fixture::new();
        fx.runner.fail_when("ensurepip");

        let err = fx.run(&InstallerToolStep).unwrap_err();
        assert!(matches!(err, BootError::CommandFailed { .. }));
    }

    #[test]
    fn bootstrap_that_leaves_installer_missing_fails() {
        let mut fx = Fixture::new();

        let err = fx.run(&InstallerToolStep).unwrap_err();
        assert!(matches!(err, BootError::RequirementMissing { .. }));
    }
}
