//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use super::non_interactive::LineSpinner;
use super::{
    BootTheme, LabelStyle, NonInteractiveUI, OutputMode, ProgressSpinner, Role, RunSummary,
    SpinnerHandle, StatusKind, UserInterface,
};

/// Colored output with animated spinners, for a TTY.
pub struct TerminalUI {
    term: Term,
    theme: BootTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a terminal UI writing to stdout.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            term: Term::stdout(),
            theme: BootTheme::detect(),
            mode,
        }
    }

    /// Write `line` unless the mode hides status output.
    fn status(&self, line: &str) {
        if self.mode.shows_status() {
            self.write(line);
        }
    }

    fn write(&self, line: &str) {
        let _ = writeln!(&self.term, "{}", line);
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.status(msg);
    }

    fn success(&mut self, msg: &str) {
        self.status(&self.theme.status_line(StatusKind::Present, msg));
    }

    fn warning(&mut self, msg: &str) {
        self.status(&self.theme.warning_line(msg));
    }

    fn error(&mut self, msg: &str) {
        self.write(&self.theme.status_line(StatusKind::Failed, msg));
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        match self.mode {
            OutputMode::Silent => Box::new(ProgressSpinner::hidden()),
            // Installer output is streamed in verbose mode.
            OutputMode::Verbose => self.start_attached(message),
            OutputMode::Normal | OutputMode::Quiet => Box::new(ProgressSpinner::new(message)),
        }
    }

    fn start_attached(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.status(&self.theme.paint(Role::Info, format!("◆ {}", message)));
        Box::new(LineSpinner::new(self.mode.shows_status(), self.theme))
    }

    fn show_header(&mut self, title: &str) {
        self.status(&format!("\n{}\n", self.theme.header(title)));
    }

    fn show_hint(&mut self, hint: &str) {
        self.status(&format!("  {}", self.theme.paint(Role::Info, hint)));
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        if !self.mode.shows_status() {
            return;
        }
        for line in summary.render(&self.theme, LabelStyle::Icons) {
            self.write(&line);
        }
        self.write(&summary.verdict(&self.theme));
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Pick the terminal UI for an interactive TTY, the line-based one otherwise.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}
