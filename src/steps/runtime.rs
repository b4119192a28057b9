//! Pinned runtime bootstrap.

use crate::config::BootConfig;
use crate::error::Result;

use super::{Step, StepContext, StepKind, StepOutcome};

/// Ensures the pinned runtime executable is resolvable and first on PATH.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeStep;

impl RuntimeStep {
    fn install_command(config: &BootConfig) -> String {
        format!(
            "{} install {}",
            config.package_manager.binary, config.runtime.formula
        )
    }
}

impl Step for RuntimeStep {
    fn name(&self) -> &'static str {
        "runtime"
    }

    fn kind(&self) -> StepKind {
        StepKind::Bootstrap
    }

    fn description(&self, config: &BootConfig) -> String {
        format!("Checking for {}", config.runtime.binary)
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let config = ctx.config;
        let runtime = &config.runtime;

        if let Some(path) = ctx.locate(&runtime.binary) {
            tracing::debug!("{} found at {}", runtime.binary, path.display());
            return Ok(StepOutcome::AlreadyPresent);
        }

        let command = Self::install_command(config);
        let lines = vec![runtime.path_export.clone()];

        if ctx.dry_run {
            let mut actions = vec![command];
            actions.extend(ctx.planned_profile_actions(&lines));
            return Ok(StepOutcome::Planned { actions });
        }

        tracing::info!("Installing {}", runtime.formula);
        ctx.run_checked(&command)?;
        ctx.persist_lines(&lines)?;
        let installed = ctx.verify_installed(&runtime.binary)?;

        Ok(StepOutcome::Installed {
            detail: format!("{} at {}", runtime.formula, installed.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootError;
    use crate::steps::testing::Fixture;

    #[test]
    fn present_runtime_is_left_alone() {
        let mut fx = Fixture::new().with_profile();
        fx.locator.add("python3.11");

        assert_eq!(fx.run(&RuntimeStep).unwrap(), StepOutcome::AlreadyPresent);
        assert!(fx.runner.commands().is_empty());
        assert!(fx.env.reloads().is_empty());
    }

    #[test]
    fn missing_runtime_installs_pinned_formula() {
        let mut fx = Fixture::new().with_profile();
        fx.installs("brew install python@3.11", "python3.11");

        let outcome = fx.run(&RuntimeStep).unwrap();

        assert!(matches!(outcome, StepOutcome::Installed { .. }));
        assert_eq!(fx.runner.commands(), &["brew install python@3.11".to_string()]);
        assert_eq!(
            fx.env.lines(&fx.zshrc()),
            &[r#"export PATH="/opt/homebrew/opt/python@3.11/bin:$PATH""#.to_string()]
        );
        assert_eq!(fx.env.reloads(), &[fx.zshrc()]);
    }

    #[test]
    fn failed_formula_install_is_reported() {
        let mut fx = Fixture::new().with_profile();
        fx.runner.fail_when("brew install");

        let err = fx.run(&RuntimeStep).unwrap_err();

        assert!(matches!(err, BootError::CommandFailed { .. }));
        assert!(fx.env.lines(&fx.zshrc()).is_empty());
    }

    #[test]
    fn configured_version_is_used() {
        let mut fx = Fixture::new().with_profile();
        let mut config = crate::config::BootConfig::default();
        config.runtime.version = "3.12".to_string();
        fx.config = config.render();
        fx.installs("python@3.12", "python3.12");

        fx.run(&RuntimeStep).unwrap();

        assert!(fx.runner.ran("brew install python@3.12"));
    }

    #[test]
    fn dry_run_lists_command_and_export() {
        let mut fx = Fixture::new().with_profile();
        fx.dry_run = true;

        let outcome = fx.run(&RuntimeStep).unwrap();

        let StepOutcome::Planned { actions } = outcome else {
            panic!("expected a plan");
        };
        assert_eq!(actions[0], "brew install python@3.11");
        assert!(actions[1].contains("export PATH="));
        assert!(fx.runner.commands().is_empty());
    }
}
