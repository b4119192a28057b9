//! End-of-run summary box.

use std::time::Duration;

use super::icons::StatusKind;
use super::output::format_duration;
use super::theme::{BootTheme, Role};

const RULE: &str = "────────────────────────────────────";
const TITLE_RULE: &str = "──────────────────────────";

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// Step name.
    pub name: String,
    /// How the step ended.
    pub status: StatusKind,
    /// Short extra text (what was installed, why it failed).
    pub detail: Option<String>,
}

/// Outcome of a whole run, as shown to the user.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// One row per step, in execution order.
    pub rows: Vec<SummaryRow>,
    /// Whether the run ends with exit code 0.
    pub success: bool,
    /// Wall-clock time of the run.
    pub duration: Duration,
}

/// How row labels are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Colored icons, for terminals.
    Icons,
    /// `[ok]`, `[FAIL]` and so on, for logs.
    Brackets,
}

impl RunSummary {
    /// Number of rows with `status`.
    pub fn count(&self, status: StatusKind) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }

    /// Names of failed steps.
    pub fn failed_steps(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.status == StatusKind::Failed)
            .map(|r| r.name.as_str())
            .collect()
    }

    /// The box: a row per step, then a totals line.
    pub fn render(&self, theme: &BootTheme, labels: LabelStyle) -> Vec<String> {
        let edge = |s: &str| theme.paint(Role::Dim, s);
        let dot = edge("·");

        let mut lines = vec![
            String::new(),
            format!("  {} Summary {}", edge("┌─"), edge(TITLE_RULE)),
        ];
        for row in &self.rows {
            let label = match labels {
                LabelStyle::Icons => row.status.styled(theme),
                LabelStyle::Brackets => row.status.bracketed().to_string(),
            };
            lines.push(format!(
                "  {} {} {:<18} {}",
                edge("│"),
                label,
                row.name,
                theme.paint(Role::Dim, row.detail.as_deref().unwrap_or("")),
            ));
        }
        lines.push(format!("  {}{}", edge("├"), edge(RULE)));
        lines.push(format!(
            "  {} Total: {} {} {} installed {} {} present",
            edge("│"),
            theme.paint(Role::Dim, format_duration(self.duration)),
            dot,
            self.count(StatusKind::Installed),
            dot,
            self.count(StatusKind::Present),
        ));
        lines.push(format!("  {}{}", edge("└"), edge(RULE)));
        lines
    }

    /// Final one-line verdict.
    pub fn verdict(&self, theme: &BootTheme) -> String {
        if self.success {
            format!("  {}", theme.status_line(StatusKind::Present, "Environment ready"))
        } else {
            let failed = self.failed_steps().join(", ");
            format!(
                "  {}",
                theme.status_line(StatusKind::Failed, &format!("Setup failed: {}", failed))
            )
        }
    }
}
