//! Status icons shared by spinners, summaries, and `status` output.

use super::theme::{BootTheme, Role};

/// How a step (or a probed tool) ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// Already satisfied, nothing was done.
    Present,
    /// Installed or changed during this run.
    Installed,
    /// Would be installed; shown by dry runs.
    Planned,
    /// Not attempted.
    Skipped,
    /// Attempted and failed.
    Failed,
}

impl StatusKind {
    /// Unicode icon for TTY output.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Present => "✓",
            Self::Installed => "✚",
            Self::Planned => "◌",
            Self::Skipped => "○",
            Self::Failed => "✗",
        }
    }

    /// Bracketed text for non-TTY output.
    pub fn bracketed(self) -> &'static str {
        match self {
            Self::Present => "[ok]",
            Self::Installed => "[installed]",
            Self::Planned => "[plan]",
            Self::Skipped => "[skip]",
            Self::Failed => "[FAIL]",
        }
    }

    /// Color role for this status.
    pub fn role(self) -> Role {
        match self {
            Self::Present => Role::Success,
            Self::Installed => Role::Info,
            Self::Planned | Self::Skipped => Role::Dim,
            Self::Failed => Role::Error,
        }
    }

    /// Styled icon string using the given theme.
    pub fn styled(self, theme: &BootTheme) -> String {
        theme.paint(self.role(), self.icon())
    }

    /// Format a status line for non-TTY: bracketed + message.
    pub fn format_plain(self, msg: &str) -> String {
        format!("{} {}", self.bracketed(), msg)
    }
}
