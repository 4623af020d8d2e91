//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.

use crate::runner::{RunReport, StepOutcome, StepStatus};

use super::{OutputMode, UserInterface};

/// Captures every UI interaction.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    started: Vec<(String, usize, usize)>,
    results: Vec<(String, StepStatus)>,
    summaries: Vec<Vec<(String, StepStatus)>>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// `(name, index, total)` for every started step.
    pub fn started(&self) -> &[(String, usize, usize)] {
        &self.started
    }

    /// `(name, status)` for every reported step result.
    pub fn results(&self) -> &[(String, StepStatus)] {
        &self.results
    }

    /// One entry per run summary, listing each outcome.
    pub fn summaries(&self) -> &[Vec<(String, StepStatus)>] {
        &self.summaries
    }

    /// Whether any captured output line contains `text`, ignoring styling.
    pub fn has_output(&self, text: &str) -> bool {
        self.messages
            .iter()
            .chain(&self.successes)
            .chain(&self.warnings)
            .chain(&self.errors)
            .chain(&self.headers)
            .any(|line| console::strip_ansi_codes(line).contains(text))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_step_started(&mut self, name: &str, index: usize, total: usize) {
        self.started.push((name.to_string(), index, total));
    }

    fn show_step_result(&mut self, outcome: &StepOutcome) {
        self.results.push((outcome.name.clone(), outcome.status));
    }

    fn show_run_summary(&mut self, report: &RunReport) {
        self.summaries.push(
            report
                .outcomes
                .iter()
                .map(|o| (o.name.clone(), o.status))
                .collect(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_messages_by_kind() {
        let mut ui = MockUI::new();
        ui.message("plain");
        ui.success("good");
        ui.warning("hmm");
        ui.error("bad");

        assert_eq!(ui.messages(), ["plain"]);
        assert_eq!(ui.successes(), ["good"]);
        assert_eq!(ui.warnings(), ["hmm"]);
        assert_eq!(ui.errors(), ["bad"]);
        assert!(ui.has_output("hm"));
        assert!(!ui.has_output("absent"));
    }

    #[test]
    fn with_mode_sets_mode() {
        assert_eq!(
            MockUI::with_mode(OutputMode::Quiet).output_mode(),
            OutputMode::Quiet
        );
    }
}
