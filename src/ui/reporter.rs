//! Executor events rendered through a [`UserInterface`].

use std::time::Duration;

use crate::runner::{Reporter, StepOutcome, StepStatus};

use super::UserInterface;

/// Forwards executor events to a UI.
pub struct UiReporter<'a> {
    ui: &'a mut dyn UserInterface,
}

impl<'a> UiReporter<'a> {
    pub fn new(ui: &'a mut dyn UserInterface) -> Self {
        Self { ui }
    }
}

impl Reporter for UiReporter<'_> {
    fn step_started(&mut self, name: &str, index: usize, total: usize) {
        self.ui.show_step_started(name, index, total);
    }

    fn step_succeeded(&mut self, name: &str, duration: Duration) {
        self.ui.show_step_result(&StepOutcome {
            name: name.to_string(),
            status: StepStatus::Succeeded,
            duration,
            error: None,
            follow_up_error: None,
        });
    }

    fn step_failed(&mut self, outcome: &StepOutcome) {
        self.ui.show_step_result(outcome);
    }

    fn step_skipped(&mut self, name: &str) {
        self.ui.show_step_result(&StepOutcome {
            name: name.to_string(),
            status: StepStatus::Skipped,
            duration: Duration::ZERO,
            error: None,
            follow_up_error: None,
        });
    }
}
