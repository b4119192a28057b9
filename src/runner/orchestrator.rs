//! Sequential step orchestration.
//!
//! Steps run strictly in order, one external process at a time. A failing
//! step is classified by its [`StepKind`]: guards and dependency
//! installation always halt the run, bootstrap steps halt unless
//! keep-going is set. Steps after a halt are reported as not run.

use std::time::{Duration, Instant};

use crate::error::BootError;
use crate::steps::{Step, StepContext, StepKind, StepOutcome};
use crate::ui::{RunSummary, StatusKind, SummaryRow};

/// What the orchestrator does after a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Stop; later steps do not run.
    Halt,
    /// Warn and move on to the next step.
    Continue,
}

/// Decide how a failure of a `kind` step is handled.
pub fn classify(kind: StepKind, error: &BootError, keep_going: bool) -> Disposition {
    if matches!(error, BootError::CommandCancelled { .. }) {
        return Disposition::Halt;
    }
    match kind {
        StepKind::Bootstrap if keep_going => Disposition::Continue,
        StepKind::Guard | StepKind::Bootstrap | StepKind::Dependencies => Disposition::Halt,
    }
}

/// How one step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// The step returned normally.
    Done(StepOutcome),
    /// The step failed; holds the error message.
    Failed(String),
    /// An earlier step halted the run.
    NotRun,
}

/// One step's entry in a [`RunReport`].
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Step name.
    pub name: &'static str,
    /// How it ended.
    pub status: StepStatus,
}

/// Result of a whole run.
#[derive(Debug)]
pub struct RunReport {
    /// Every step, in order, including those that did not run.
    pub steps: Vec<StepReport>,
    /// The failure that stopped the run, if any.
    pub halted_by: Option<BootError>,
    /// Wall-clock duration.
    pub duration: Duration,
}

impl RunReport {
    /// Whether every step that ran succeeded.
    pub fn success(&self) -> bool {
        self.halted_by.is_none()
            && !self
                .steps
                .iter()
                .any(|s| matches!(s.status, StepStatus::Failed(_)))
    }

    /// Process exit code for this run.
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }

    /// Status of the step called `name`.
    pub fn status_of(&self, name: &str) -> Option<&StepStatus> {
        self.steps.iter().find(|s| s.name == name).map(|s| &s.status)
    }

    /// Convert to the table shown at the end of a run.
    pub fn summary(&self) -> RunSummary {
        let rows = self
            .steps
            .iter()
            .map(|step| {
                let (status, detail) = match &step.status {
                    StepStatus::Done(StepOutcome::AlreadyPresent) => (StatusKind::Present, None),
                    StepStatus::Done(StepOutcome::Installed { detail }) => {
                        (StatusKind::Installed, Some(detail.clone()))
                    }
                    StepStatus::Done(StepOutcome::Planned { actions }) => (
                        StatusKind::Planned,
                        Some(format!("{} planned action(s)", actions.len())),
                    ),
                    StepStatus::Failed(message) => (StatusKind::Failed, Some(message.clone())),
                    StepStatus::NotRun => (StatusKind::Skipped, Some("not run".to_string())),
                };
                SummaryRow {
                    name: step.name.to_string(),
                    status,
                    detail,
                }
            })
            .collect();

        RunSummary {
            rows,
            success: self.success(),
            duration: self.duration,
        }
    }
}

/// Runs a fixed sequence of steps.
pub struct Orchestrator {
    steps: Vec<Box<dyn Step>>,
    keep_going: bool,
}

impl Orchestrator {
    /// Create an orchestrator over `steps`.
    pub fn new(steps: Vec<Box<dyn Step>>) -> Self {
        Self {
            steps,
            keep_going: false,
        }
    }

    /// Continue past failed bootstrap steps.
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Run every step in order.
    pub fn run(&self, ctx: &mut StepContext<'_>) -> RunReport {
        let start = Instant::now();
        let total = self.steps.len();
        let mut reports = Vec::with_capacity(total);
        let mut halted_by = None;

        for (index, step) in self.steps.iter().enumerate() {
            let name = step.name();

            if halted_by.is_some() {
                reports.push(StepReport {
                    name,
                    status: StepStatus::NotRun,
                });
                continue;
            }

            tracing::info!("[{}/{}] {}", index + 1, total, name);
            let description = step.description(ctx.config);
            let mut spinner = if step.uses_terminal() {
                ctx.ui.start_attached(&description)
            } else {
                ctx.ui.start_spinner(&description)
            };

            let status = match step.run(ctx) {
                Ok(outcome) => {
                    match &outcome {
                        StepOutcome::AlreadyPresent => {
                            spinner.finish_success(&format!("{}: ok", name))
                        }
                        StepOutcome::Installed { detail } => {
                            spinner.finish_success(&format!("{}: installed {}", name, detail))
                        }
                        StepOutcome::Planned { actions } => {
                            spinner.finish_skipped(&format!("{}: would run", name));
                            for action in actions {
                                ctx.ui.message(&format!("    → {}", action));
                            }
                        }
                    }
                    StepStatus::Done(outcome)
                }
                Err(err) => {
                    spinner.finish_error(&format!("{}: failed", name));
                    let message = err.to_string();
                    match classify(step.kind(), &err, self.keep_going) {
                        Disposition::Halt => {
                            tracing::debug!("{} halted the run: {}", name, message);
                            halted_by = Some(err);
                        }
                        Disposition::Continue => {
                            tracing::warn!("{} failed, continuing: {}", name, message);
                            ctx.ui.warning(&format!(
                                "{} failed ({}); continuing because keep-going is set",
                                name, message
                            ));
                        }
                    }
                    StepStatus::Failed(message)
                }
            };

            reports.push(StepReport { name, status });
        }

        RunReport {
            steps: reports,
            halted_by,
            duration: start.elapsed(),
        }
    }
}
