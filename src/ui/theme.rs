//! Colors for terminal output.
//!
//! Output code asks for a [`Role`] rather than a concrete color, so a plain
//! theme is the same theme with styling switched off.

use console::Style;
use std::fmt::Display;

use super::icons::StatusKind;

/// What a piece of text means, which decides its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Something is in place.
    Success,
    /// Recoverable problem.
    Warning,
    /// Failure.
    Error,
    /// In progress or freshly installed.
    Info,
    /// Secondary text, borders, durations.
    Dim,
    /// Banner titles.
    Header,
}

/// Colored or plain styling for all UI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootTheme {
    colored: bool,
}

impl Default for BootTheme {
    fn default() -> Self {
        Self::colored()
    }
}

impl BootTheme {
    /// Theme with colors.
    pub fn colored() -> Self {
        Self { colored: true }
    }

    /// Theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self { colored: false }
    }

    /// Colored when the terminal and environment allow it.
    pub fn detect() -> Self {
        Self {
            colored: should_use_colors(),
        }
    }

    /// Whether this theme emits ANSI styling.
    pub fn is_colored(&self) -> bool {
        self.colored
    }

    /// The console style for `role`.
    pub fn style(&self, role: Role) -> Style {
        if !self.colored {
            return Style::new();
        }
        match role {
            Role::Success => Style::new().green(),
            Role::Warning => Style::new().color256(208),
            Role::Error => Style::new().red().bold(),
            Role::Info => Style::new().cyan(),
            Role::Dim => Style::new().dim(),
            Role::Header => Style::new().cyan().bold(),
        }
    }

    /// Render `text` in the color for `role`.
    pub fn paint(&self, role: Role, text: impl Display) -> String {
        self.style(role).apply_to(text).to_string()
    }

    /// `msg` prefixed with the icon for `kind`, both colored.
    pub fn status_line(&self, kind: StatusKind, msg: &str) -> String {
        self.paint(kind.role(), format!("{} {}", kind.icon(), msg))
    }

    /// A warning line.
    pub fn warning_line(&self, msg: &str) -> String {
        self.paint(Role::Warning, format!("⚠ {}", msg))
    }

    /// A header banner.
    pub fn header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.paint(Role::Header, "⌘"),
            self.style(Role::Header).bold().apply_to(title)
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    console::colors_enabled()
}
