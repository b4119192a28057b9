//! Step execution orchestration.

pub mod orchestrator;

pub use orchestrator::{classify, Disposition, Orchestrator, RunReport, StepReport, StepStatus};
