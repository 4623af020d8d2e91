//! Output sinks for execution events.

use std::time::Duration;

use tracing::{error, info, warn};

use super::executor::StepOutcome;

/// Receives per-step notifications from the [`Executor`](super::Executor).
pub trait Reporter {
    /// A step is about to run. `index` is zero-based.
    fn step_started(&mut self, name: &str, index: usize, total: usize);

    /// A step finished successfully.
    fn step_succeeded(&mut self, name: &str, duration: Duration);

    /// A step's primary action or follow-up failed.
    fn step_failed(&mut self, outcome: &StepOutcome);

    /// A planned step was skipped on request.
    fn step_skipped(&mut self, name: &str);
}

/// Reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn step_started(&mut self, _name: &str, _index: usize, _total: usize) {}
    fn step_succeeded(&mut self, _name: &str, _duration: Duration) {}
    fn step_failed(&mut self, _outcome: &StepOutcome) {}
    fn step_skipped(&mut self, _name: &str) {}
}

/// Reporter that emits structured log events.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn step_started(&mut self, name: &str, index: usize, total: usize) {
        info!(step = name, index = index + 1, total, "Starting step");
    }

    fn step_succeeded(&mut self, name: &str, duration: Duration) {
        info!(step = name, elapsed_ms = duration.as_millis() as u64, "Step succeeded");
    }

    fn step_failed(&mut self, outcome: &StepOutcome) {
        error!(
            step = outcome.name.as_str(),
            error = outcome.error.as_deref().unwrap_or(""),
            "Step failed"
        );
        if let Some(follow_up) = &outcome.follow_up_error {
            error!(step = outcome.name.as_str(), error = follow_up.as_str(), "Follow-up failed");
        }
    }

    fn step_skipped(&mut self, name: &str) {
        warn!(step = name, "Step skipped");
    }
}
