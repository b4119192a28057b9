//! Platform guard.

use crate::config::BootConfig;
use crate::error::{BootError, Result};

use super::{Step, StepContext, StepKind, StepOutcome};

/// Stops the run on any platform but the configured one.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsGuard;

impl Step for OsGuard {
    fn name(&self) -> &'static str {
        "os-guard"
    }

    fn kind(&self) -> StepKind {
        StepKind::Guard
    }

    fn description(&self, config: &BootConfig) -> String {
        format!("Checking platform is {}", config.platform)
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        if ctx.platform == ctx.config.platform {
            return Ok(StepOutcome::AlreadyPresent);
        }

        Err(BootError::UnsupportedPlatform {
            expected: ctx.config.platform.clone(),
            actual: ctx.platform.to_string(),
        })
    }
}
