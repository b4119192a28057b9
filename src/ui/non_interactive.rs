//! Line-oriented UI for CI logs and piped output.

use super::theme::BootTheme;
use super::{LabelStyle, OutputMode, RunSummary, SpinnerHandle, StatusKind, UserInterface};

/// UI implementation for non-interactive mode.
///
/// No animation and no colors; summary rows use bracketed labels so logs
/// stay greppable. Warnings and errors go to stderr.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: BootTheme,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: BootTheme::plain(),
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.status_line(StatusKind::Present, msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.warning_line(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.status_line(StatusKind::Failed, msg));
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            println!("  {}", message);
        }
        Box::new(LineSpinner::new(self.mode.shows_status(), self.theme))
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            println!("  Hint: {}", hint);
        }
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        if !self.mode.shows_status() {
            return;
        }
        for line in summary.render(&self.theme, LabelStyle::Brackets) {
            println!("{}", line);
        }
        let verdict = summary.verdict(&self.theme);
        if summary.success {
            println!("{}", verdict);
        } else {
            eprintln!("{}", verdict);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner stand-in that prints only the final line.
///
/// Also used by the terminal UI in verbose mode, where command output is
/// streamed between the start and finish lines.
pub(crate) struct LineSpinner {
    show: bool,
    theme: BootTheme,
}

impl LineSpinner {
    pub(crate) fn new(show: bool, theme: BootTheme) -> Self {
        Self { show, theme }
    }

    fn finish(&self, kind: StatusKind, msg: &str) {
        let line = self.theme.status_line(kind, msg);
        match kind {
            StatusKind::Failed => eprintln!("{}", line),
            _ if self.show => println!("{}", line),
            _ => {}
        }
    }
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.finish(StatusKind::Present, msg);
    }

    fn finish_error(&mut self, msg: &str) {
        self.finish(StatusKind::Failed, msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.finish(StatusKind::Skipped, msg);
    }
}
