//! Status command implementation.
//!
//! The `macboot status` command reports what a run would find, without
//! installing or writing anything.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

use crate::cli::args::StatusArgs;
use crate::config::load_config;
use crate::error::{BootError, Result};
use crate::requirements::{EnvironmentFacts, PathLocator, ToolFact, ToolStatus};
use crate::shell::{current_platform, CancelToken, ShellProfile};
use crate::ui::{StatusKind, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The status command implementation.
pub struct StatusCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: StatusArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(Path::to_path_buf),
            args,
        }
    }
}

fn row(label: &str, present: bool, detail: &str) -> String {
    let kind = if present {
        StatusKind::Present
    } else {
        StatusKind::Failed
    };
    format!("  {} {:<16} {}", kind.icon(), label, detail)
}

fn tool_row(label: &str, fact: &ToolFact) -> String {
    match &fact.status {
        ToolStatus::Present { path } => {
            row(label, true, &format!("{} ({})", fact.name, path.display()))
        }
        ToolStatus::Missing => {
            row(label, false, &format!("{} not found", fact.name))
        }
    }
}

/// Render facts as the lines the status command prints.
pub fn render_facts(facts: &EnvironmentFacts) -> Vec<String> {
    let profile = match &facts.profile {
        Some(path) => row("profile", true, &path.display().to_string()),
        None => row("profile", false, "no candidate exists"),
    };
    vec![
        row("platform", facts.platform_supported, &facts.platform),
        tool_row("package manager", &facts.package_manager),
        tool_row("runtime", &facts.runtime),
        tool_row("installer", &facts.installer),
        row(
            "manifest",
            facts.manifest_present,
            &facts.manifest.display().to_string(),
        ),
        profile,
    ]
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.project_root, self.config_path.as_deref())?;
        let home = dirs::home_dir()
            .ok_or_else(|| BootError::Other(anyhow!("could not determine home directory")))?;
        let env = ShellProfile::new(CancelToken::new(), config.command_timeout());

        let facts = EnvironmentFacts::gather(
            &config,
            &current_platform(),
            &self.project_root,
            &home,
            &PathLocator,
            &env,
        );

        if self.args.json {
            let json = serde_json::to_string_pretty(&facts)
                .context("failed to serialize status")?;
            println!("{}", json);
        } else {
            ui.show_header("macboot - Status");
            for line in render_facts(&facts) {
                ui.message(&line);
            }
            ui.message("");
            if facts.is_ready() {
                ui.success("Ready: only the dependency install would run");
            } else {
                ui.warning("Not ready: `macboot run` would install missing pieces");
            }
        }

        Ok(if facts.is_ready() {
            CommandResult::success()
        } else {
            CommandResult::failure(1)
        })
    }
}
