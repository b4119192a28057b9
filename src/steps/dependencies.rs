//! Manifest guard and dependency installation.
//!
//! Installation is upgrade-then-install. The install runs against the
//! primary mirror and, only if that attempt fails, exactly once against
//! the fallback index. There is no partial-success accounting: a failed
//! attempt is retried from scratch.

use std::path::PathBuf;

use crate::config::BootConfig;
use crate::error::{BootError, Result};
use crate::shell::shell_quote;

use super::{Step, StepContext, StepKind, StepOutcome};

fn manifest_path(ctx: &StepContext<'_>) -> PathBuf {
    ctx.project_root.join(&ctx.config.manifest.path)
}

/// Stops the run when the dependency manifest is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestGuard;

impl Step for ManifestGuard {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn kind(&self) -> StepKind {
        StepKind::Guard
    }

    fn description(&self, config: &BootConfig) -> String {
        format!("Checking for {}", config.manifest.path.display())
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let path = manifest_path(ctx);
        if path.is_file() {
            Ok(StepOutcome::AlreadyPresent)
        } else {
            Err(BootError::ManifestNotFound { path })
        }
    }
}

/// Installs every manifest entry with the pinned runtime's installer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyStep;

impl DependencyStep {
    fn upgrade_command(config: &BootConfig) -> String {
        format!("{} -m pip install --upgrade pip", config.runtime.binary)
    }

    fn install_command(config: &BootConfig, index: &str) -> String {
        format!(
            "{} -m pip install -r {} -i {}",
            config.runtime.binary,
            shell_quote(&config.manifest.path.to_string_lossy()),
            shell_quote(index)
        )
    }
}

impl Step for DependencyStep {
    fn name(&self) -> &'static str {
        "dependencies"
    }

    fn kind(&self) -> StepKind {
        StepKind::Dependencies
    }

    fn description(&self, config: &BootConfig) -> String {
        format!("Installing {}", config.manifest.path.display())
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let config = ctx.config;
        let manifest = &config.manifest;
        let upgrade = Self::upgrade_command(config);
        let primary = Self::install_command(config, &manifest.primary_index);
        let fallback = Self::install_command(config, &manifest.fallback_index);

        if ctx.dry_run {
            return Ok(StepOutcome::Planned {
                actions: vec![upgrade, primary, format!("on failure: {}", fallback)],
            });
        }

        match ctx.run_checked(&upgrade) {
            Ok(_) => {}
            Err(e @ BootError::CommandCancelled { .. }) => return Err(e),
            Err(e) => {
                tracing::warn!("Installer upgrade failed: {}", e);
                ctx.ui
                    .warning("Could not upgrade pip; continuing with the installed version");
            }
        }

        match ctx.run_checked(&primary) {
            Ok(_) => Ok(StepOutcome::Installed {
                detail: format!("from {}", manifest.primary_index),
            }),
            Err(e @ BootError::CommandCancelled { .. }) => Err(e),
            Err(e) => {
                tracing::warn!("Primary index failed: {}", e);
                ctx.ui.warning(&format!(
                    "Install from {} failed; retrying with {}",
                    manifest.primary_index, manifest.fallback_index
                ));
                ctx.run_checked(&fallback)?;
                Ok(StepOutcome::Installed {
                    detail: format!("from {} (fallback)", manifest.fallback_index),
                })
            }
        }
    }
}
