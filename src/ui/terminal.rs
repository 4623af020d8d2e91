//! Console-backed UI.

use console::Term;
use std::io::Write;

use crate::runner::{RunReport, StepOutcome, StepStatus};

use super::progress::{format_counter, format_duration};
use super::{should_use_colors, KilnTheme, OutputMode, Table, UserInterface};

/// Terminal UI implementation. Errors go to stderr, everything else to
/// stdout.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: KilnTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            KilnTheme::new()
        } else {
            KilnTheme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        writeln!(self.out, "{}", msg).ok();
    }

    fn success(&mut self, msg: &str) {
        writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_progress() {
            writeln!(self.out, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_step_started(&mut self, name: &str, index: usize, total: usize) {
        if self.mode.shows_progress() {
            writeln!(
                self.out,
                "{} {}",
                self.theme.step_number.apply_to(format_counter(index, total)),
                self.theme.info.apply_to(name),
            )
            .ok();
        }
    }

    fn show_step_result(&mut self, outcome: &StepOutcome) {
        match outcome.status {
            StepStatus::Failed => {
                let detail = outcome
                    .error
                    .as_deref()
                    .or(outcome.follow_up_error.as_deref())
                    .unwrap_or("failed");
                writeln!(
                    self.err,
                    "  {}",
                    self.theme
                        .format_error(&format!("{}: {}", outcome.name, detail))
                )
                .ok();
                if let (Some(_), Some(follow_up)) = (&outcome.error, &outcome.follow_up_error) {
                    writeln!(
                        self.err,
                        "    {}",
                        self.theme
                            .dim
                            .apply_to(format!("follow-up also failed: {}", follow_up))
                    )
                    .ok();
                }
            }
            StepStatus::Succeeded if self.mode.shows_progress() => {
                writeln!(
                    self.out,
                    "  {} {}",
                    self.theme.format_success(&outcome.name),
                    self.theme
                        .duration
                        .apply_to(format_duration(outcome.duration)),
                )
                .ok();
            }
            StepStatus::Skipped if self.mode.shows_progress() => {
                let line = format!(
                    "{} {} (skipped)",
                    StepStatus::Skipped.display_char(),
                    outcome.name
                );
                writeln!(self.out, "{}", self.theme.warning.apply_to(line)).ok();
            }
            _ => {}
        }
    }

    fn show_run_summary(&mut self, report: &RunReport) {
        if self.mode.shows_progress() && !report.outcomes.is_empty() {
            let mut table = Table::new(vec!["Target", "Status", "Duration"]);
            for outcome in &report.outcomes {
                let duration = match outcome.status {
                    StepStatus::Succeeded | StepStatus::Failed => {
                        format_duration(outcome.duration)
                    }
                    _ => String::new(),
                };
                table.add_row(vec![
                    outcome.name.clone(),
                    self.theme.format_status(outcome.status),
                    duration,
                ]);
            }
            writeln!(self.out).ok();
            writeln!(self.out, "{}", table.render()).ok();
        }

        let total = format_duration(report.duration);
        if report.success {
            self.success(&format!("Build succeeded in {}", total));
        } else {
            let failed = report
                .failed_step()
                .map(|o| o.name.as_str())
                .unwrap_or("unknown");
            self.error(&format!("Build failed at '{}' after {}", failed, total));
        }
    }
}

/// Create the terminal UI for the given mode.
pub fn create_ui(mode: OutputMode) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode))
}
