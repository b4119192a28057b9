//! Recording UI for tests.
//!
//! Every call is appended to one ordered event log, so tests can check both
//! what was shown and in which order.
//!
//! # Example
//!
//! ```
//! use macboot::ui::{MockUI, UiEvent, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Checking platform");
//! ui.success("Done!");
//!
//! assert!(ui.has_message("Checking platform"));
//! assert_eq!(ui.events().last(), Some(&UiEvent::Success("Done!".to_string())));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use super::{OutputMode, RunSummary, SpinnerHandle, StatusKind, UserInterface};

/// One recorded UI call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Message(String),
    Success(String),
    Warning(String),
    Error(String),
    Header(String),
    Hint(String),
    /// A spinner was started with this text.
    Spinner(String),
    /// A spinner finished.
    SpinnerDone(StatusKind, String),
}

type EventLog = Rc<RefCell<Vec<UiEvent>>>;

/// UI that records instead of printing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    events: EventLog,
    summaries: Vec<RunSummary>,
}

impl MockUI {
    /// Create a recorder in Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder reporting `mode`.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Everything recorded so far, in order.
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.borrow().clone()
    }

    /// Summaries passed to `show_summary`.
    pub fn summaries(&self) -> &[RunSummary] {
        &self.summaries
    }

    fn texts(&self, pick: impl Fn(&UiEvent) -> Option<&String>) -> Vec<String> {
        self.events.borrow().iter().filter_map(|e| pick(e).cloned()).collect()
    }

    /// Plain messages.
    pub fn messages(&self) -> Vec<String> {
        self.texts(|e| match e {
            UiEvent::Message(m) => Some(m),
            _ => None,
        })
    }

    /// Warnings.
    pub fn warnings(&self) -> Vec<String> {
        self.texts(|e| match e {
            UiEvent::Warning(m) => Some(m),
            _ => None,
        })
    }

    /// Errors.
    pub fn errors(&self) -> Vec<String> {
        self.texts(|e| match e {
            UiEvent::Error(m) => Some(m),
            _ => None,
        })
    }

    /// Texts of started spinners.
    pub fn spinners(&self) -> Vec<String> {
        self.texts(|e| match e {
            UiEvent::Spinner(m) => Some(m),
            _ => None,
        })
    }

    /// How each spinner finished, in order.
    pub fn spinner_results(&self) -> Vec<(StatusKind, String)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                UiEvent::SpinnerDone(kind, m) => Some((*kind, m.clone())),
                _ => None,
            })
            .collect()
    }

    fn any(&self, matches: impl Fn(&UiEvent) -> bool) -> bool {
        self.events.borrow().iter().any(matches)
    }

    /// Whether a message containing `text` was shown.
    pub fn has_message(&self, text: &str) -> bool {
        self.any(|e| matches!(e, UiEvent::Message(m) if m.contains(text)))
    }

    /// Whether a success containing `text` was shown.
    pub fn has_success(&self, text: &str) -> bool {
        self.any(|e| matches!(e, UiEvent::Success(m) if m.contains(text)))
    }

    /// Whether a warning containing `text` was shown.
    pub fn has_warning(&self, text: &str) -> bool {
        self.any(|e| matches!(e, UiEvent::Warning(m) if m.contains(text)))
    }

    /// Whether an error containing `text` was shown.
    pub fn has_error(&self, text: &str) -> bool {
        self.any(|e| matches!(e, UiEvent::Error(m) if m.contains(text)))
    }

    /// Whether a hint containing `text` was shown.
    pub fn has_hint(&self, text: &str) -> bool {
        self.any(|e| matches!(e, UiEvent::Hint(m) if m.contains(text)))
    }

    fn record(&self, event: UiEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.record(UiEvent::Message(msg.to_string()));
    }

    fn success(&mut self, msg: &str) {
        self.record(UiEvent::Success(msg.to_string()));
    }

    fn warning(&mut self, msg: &str) {
        self.record(UiEvent::Warning(msg.to_string()));
    }

    fn error(&mut self, msg: &str) {
        self.record(UiEvent::Error(msg.to_string()));
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.record(UiEvent::Spinner(message.to_string()));
        Box::new(MockSpinner {
            events: Rc::clone(&self.events),
        })
    }

    fn show_header(&mut self, title: &str) {
        self.record(UiEvent::Header(title.to_string()));
    }

    fn show_hint(&mut self, hint: &str) {
        self.record(UiEvent::Hint(hint.to_string()));
    }

    fn show_summary(&mut self, summary: &RunSummary) {
        self.summaries.push(summary.clone());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner that records how it finished into the owning [`MockUI`].
pub struct MockSpinner {
    events: EventLog,
}

impl MockSpinner {
    fn done(&self, kind: StatusKind, msg: &str) {
        self.events
            .borrow_mut()
            .push(UiEvent::SpinnerDone(kind, msg.to_string()));
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.done(StatusKind::Present, msg);
    }

    fn finish_error(&mut self, msg: &str) {
        self.done(StatusKind::Failed, msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.done(StatusKind::Skipped, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_messages_by_kind() {
        let mut ui = MockUI::new();
        ui.message("hello");
        ui.warning("careful");
        ui.error("broken");
        ui.show_hint("try sudo");

        assert!(ui.has_message("hello"));
        assert!(ui.has_warning("careful"));
        assert!(ui.has_error("broken"));
        assert!(ui.has_hint("sudo"));
        assert!(!ui.has_success("hello"));
        assert_eq!(ui.errors(), vec!["broken".to_string()]);
    }

    #[test]
    fn spinner_finish_lands_after_later_messages() {
        let mut ui = MockUI::new();
        let mut spinner = ui.start_spinner("Installing runtime");
        ui.warning("slow mirror");
        spinner.finish_success("Runtime installed");

        assert_eq!(
            ui.events(),
            vec![
                UiEvent::Spinner("Installing runtime".to_string()),
                UiEvent::Warning("slow mirror".to_string()),
                UiEvent::SpinnerDone(StatusKind::Present, "Runtime installed".to_string()),
            ]
        );
        assert_eq!(
            ui.spinner_results(),
            vec![(StatusKind::Present, "Runtime installed".to_string())]
        );
    }

    #[test]
    fn interactive_flag() {
        let mut ui = MockUI::new();
        assert!(!ui.is_interactive());
        ui.set_interactive(true);
        assert!(ui.is_interactive());
    }

    #[test]
    fn mode_is_reported() {
        let ui = MockUI::with_mode(OutputMode::Verbose);
        assert_eq!(ui.output_mode(), OutputMode::Verbose);
    }
}
