//! Terminal user interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for tests
//! - Spinners and the end-of-run summary table
//!
//! # Example
//!
//! ```
//! use macboot::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Silent);
//! ui.show_header("macboot");
//! ui.success("Environment ready");
//! ```

pub mod icons;
pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod spinner;
pub mod summary;
pub mod terminal;
pub mod theme;

pub use icons::StatusKind;
pub use mock::{MockUI, UiEvent};
pub use non_interactive::NonInteractiveUI;
pub use output::{format_duration, OutputMode};
pub use spinner::ProgressSpinner;
pub use summary::{LabelStyle, RunSummary, SummaryRow};
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, BootTheme, Role};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Start a progress line for an operation whose command may write to or
    /// prompt on the terminal. Nothing is animated while it runs.
    fn start_attached(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.start_spinner(message)
    }

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show a contextual hint below an error or summary.
    fn show_hint(&mut self, hint: &str);

    /// Show the end-of-run summary table.
    fn show_summary(&mut self, summary: &RunSummary);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);
}
