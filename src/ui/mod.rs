//! User-facing terminal output.
//!
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] writing to the console
//! - [`MockUI`] capturing output for tests
//! - [`UiReporter`] bridging executor events to a UI
//!
//! # Example
//!
//! ```
//! use kiln::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("kiln · compile");
//! ui.success("Build succeeded");
//! assert_eq!(ui.successes(), ["Build succeeded"]);
//! ```

pub mod mock;
pub mod output;
pub mod progress;
pub mod reporter;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use progress::format_duration;
pub use reporter::UiReporter;
pub use table::Table;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, KilnTheme};

use crate::runner::{RunReport, StepOutcome};

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

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// A step is starting. `index` is zero-based.
    fn show_step_started(&mut self, name: &str, index: usize, total: usize);

    /// A step finished, failed or was skipped.
    fn show_step_result(&mut self, outcome: &StepOutcome);

    /// Per-step summary after a run.
    fn show_run_summary(&mut self, report: &RunReport);
}
