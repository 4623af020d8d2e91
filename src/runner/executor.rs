//! Sequential, fail-fast plan execution.

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{KilnError, Result};
use crate::steps::Step;

use super::plan::Plan;
use super::reporter::Reporter;

/// Final status of a planned step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Primary action and follow-up (if any) succeeded.
    Succeeded,
    /// Primary action or follow-up failed.
    Failed,
    /// Skipped on request; the action was not invoked.
    Skipped,
    /// Never reached because an earlier step failed.
    NotRun,
}

impl StepStatus {
    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Succeeded => '✓',
            StepStatus::Failed => '✗',
            StepStatus::Skipped => '⊘',
            StepStatus::NotRun => '○',
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
            StepStatus::NotRun => "not run",
        };
        write!(f, "{}", s)
    }
}

/// What happened to one planned step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Step name.
    pub name: String,
    /// Final status.
    pub status: StepStatus,
    /// Time spent in the primary action and follow-up.
    pub duration: Duration,
    /// Primary action failure, if any.
    pub error: Option<String>,
    /// Follow-up action failure, if any.
    pub follow_up_error: Option<String>,
}

impl StepOutcome {
    fn pending(name: &str, status: StepStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
            duration: Duration::ZERO,
            error: None,
            follow_up_error: None,
        }
    }

    /// Convert a failed outcome into the matching `StepExecution` error.
    ///
    /// The primary failure stays the headline; a follow-up failure is
    /// attached as extra context. When only the follow-up failed, it
    /// becomes the headline.
    pub fn to_error(&self) -> Option<KilnError> {
        if self.status != StepStatus::Failed {
            return None;
        }

        let (message, follow_up) = match (&self.error, &self.follow_up_error) {
            (Some(primary), follow_up) => (primary.clone(), follow_up.clone()),
            (None, Some(follow_up)) => (format!("follow-up failed: {}", follow_up), None),
            (None, None) => ("unknown failure".to_string(), None),
        };

        Some(KilnError::StepExecution {
            step: self.name.clone(),
            message,
            follow_up,
        })
    }
}

/// Result of running a plan.
#[derive(Debug)]
pub struct RunReport {
    /// One outcome per planned step, in plan order.
    pub outcomes: Vec<StepOutcome>,
    /// Total wall time.
    pub duration: Duration,
    /// Whether every non-skipped step succeeded.
    pub success: bool,
}

impl RunReport {
    /// The first (and only) failed step.
    pub fn failed_step(&self) -> Option<&StepOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.status == StepStatus::Failed)
    }

    /// Names of steps with the given status.
    pub fn names_with_status(&self, status: StepStatus) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.status == status)
            .map(|o| o.name.as_str())
            .collect()
    }

    /// The failure as an error, if the run failed.
    pub fn error(&self) -> Option<KilnError> {
        self.failed_step().and_then(StepOutcome::to_error)
    }

    /// `Ok(self)` on success, the `StepExecution` error otherwise.
    pub fn into_result(self) -> Result<Self> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Runs plans strictly in order, one step at a time.
///
/// Each step's primary action runs first; an attached follow-up runs right
/// after it regardless of the outcome. The first failure stops the run and
/// the remaining steps are reported as [`StepStatus::NotRun`].
pub struct Executor<'r> {
    reporter: &'r mut dyn Reporter,
    skip: HashSet<String>,
}

impl<'r> Executor<'r> {
    /// Create an executor reporting to the given sink.
    pub fn new(reporter: &'r mut dyn Reporter) -> Self {
        Self {
            reporter,
            skip: HashSet::new(),
        }
    }

    /// Steps to leave out of the run. They keep their place in the plan but
    /// their actions are not invoked.
    pub fn with_skipped<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(names.into_iter().map(Into::into));
        self
    }

    /// Run every step of the plan.
    pub fn run(&mut self, plan: &Plan<'_>) -> RunReport {
        let start = Instant::now();
        let total = plan.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut failed = false;

        for (index, step) in plan.steps().iter().enumerate() {
            if failed {
                outcomes.push(StepOutcome::pending(step.name(), StepStatus::NotRun));
                continue;
            }

            if self.skip.contains(step.name()) {
                debug!("Skipping step '{}'", step.name());
                self.reporter.step_skipped(step.name());
                outcomes.push(StepOutcome::pending(step.name(), StepStatus::Skipped));
                continue;
            }

            self.reporter.step_started(step.name(), index, total);
            let outcome = run_step(step);

            match outcome.status {
                StepStatus::Failed => {
                    debug!(
                        "Step '{}' failed: {}",
                        outcome.name,
                        outcome.error.as_deref().unwrap_or("follow-up failed")
                    );
                    self.reporter.step_failed(&outcome);
                    failed = true;
                }
                _ => self.reporter.step_succeeded(&outcome.name, outcome.duration),
            }

            outcomes.push(outcome);
        }

        RunReport {
            outcomes,
            duration: start.elapsed(),
            success: !failed,
        }
    }
}

fn run_step(step: &Step) -> StepOutcome {
    let start = Instant::now();
    debug!("Running step '{}'", step.name());

    let primary = step.run_action();
    let follow_up = step.run_follow_up();

    let error = primary.err().map(|e| format!("{:#}", e));
    let follow_up_error = follow_up.and_then(|r| r.err()).map(|e| format!("{:#}", e));

    let status = if error.is_some() || follow_up_error.is_some() {
        StepStatus::Failed
    } else {
        StepStatus::Succeeded
    };

    StepOutcome {
        name: step.name().to_string(),
        status,
        duration: start.elapsed(),
        error,
        follow_up_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{NullReporter, TargetGraph};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn record(log: &Log, entry: &str) -> impl Fn() -> anyhow::Result<()> + 'static {
        let log = Rc::clone(log);
        let entry = entry.to_string();
        move || {
            log.borrow_mut().push(entry.clone());
            Ok(())
        }
    }

    fn fail(log: &Log, entry: &str, message: &str) -> impl Fn() -> anyhow::Result<()> + 'static {
        let log = Rc::clone(log);
        let entry = entry.to_string();
        let message = message.to_string();
        move || {
            log.borrow_mut().push(entry.clone());
            Err(anyhow::anyhow!("{}", message))
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Vec<String>,
    }

    impl Reporter for RecordingReporter {
        fn step_started(&mut self, name: &str, index: usize, total: usize) {
            self.events.push(format!("start {} {}/{}", name, index + 1, total));
        }
        fn step_succeeded(&mut self, name: &str, _duration: Duration) {
            self.events.push(format!("ok {}", name));
        }
        fn step_failed(&mut self, outcome: &StepOutcome) {
            self.events.push(format!("fail {}", outcome.name));
        }
        fn step_skipped(&mut self, name: &str) {
            self.events.push(format!("skip {}", name));
        }
    }

    fn chain(log: &Log, failing: Option<&str>) -> TargetGraph {
        let mut builder = TargetGraph::builder();
        let mut previous: Option<&str> = None;
        for name in ["one", "two", "three"] {
            let handle = if failing == Some(name) {
                builder.declare(name, fail(log, name, "exit code 1")).unwrap()
            } else {
                builder.declare(name, record(log, name)).unwrap()
            };
            if let Some(prev) = previous {
                handle.depends_on(prev);
            }
            previous = Some(name);
        }
        builder.build().unwrap()
    }

    #[test]
    fn runs_all_steps_in_order() {
        let log = Log::default();
        let graph = chain(&log, None);
        let plan = graph.resolve("three").unwrap();

        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        assert!(report.success);
        assert_eq!(*log.borrow(), vec!["one", "two", "three"]);
        assert_eq!(report.names_with_status(StepStatus::Succeeded).len(), 3);
        assert!(report.error().is_none());
    }

    #[test]
    fn stops_at_first_failure() {
        let log = Log::default();
        let graph = chain(&log, Some("two"));
        let plan = graph.resolve("three").unwrap();

        let mut reporter = RecordingReporter::default();
        let report = Executor::new(&mut reporter).run(&plan);

        assert!(!report.success);
        assert_eq!(*log.borrow(), vec!["one", "two"]);
        assert_eq!(report.names_with_status(StepStatus::Succeeded), vec!["one"]);
        assert_eq!(report.names_with_status(StepStatus::Failed), vec!["two"]);
        assert_eq!(report.names_with_status(StepStatus::NotRun), vec!["three"]);
        assert_eq!(
            reporter.events,
            vec!["start one 1/3", "ok one", "start two 2/3", "fail two"]
        );
    }

    #[test]
    fn failure_identifies_step_and_cause() {
        let log = Log::default();
        let graph = chain(&log, Some("two"));
        let plan = graph.resolve("three").unwrap();

        let mut reporter = NullReporter;
        let err = Executor::new(&mut reporter)
            .run(&plan)
            .into_result()
            .unwrap_err();

        match err {
            KilnError::StepExecution {
                step,
                message,
                follow_up,
            } => {
                assert_eq!(step, "two");
                assert_eq!(message, "exit code 1");
                assert!(follow_up.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn follow_up_runs_once_after_failed_primary() {
        let log = Log::default();
        let mut builder = TargetGraph::builder();
        builder
            .declare("coverage", fail(&log, "cover", "tests failed"))
            .unwrap()
            .always(record(&log, "convert"));
        builder
            .declare("pack", record(&log, "pack"))
            .unwrap()
            .depends_on("coverage");
        let graph = builder.build().unwrap();
        let plan = graph.resolve("pack").unwrap();

        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        assert_eq!(*log.borrow(), vec!["cover", "convert"]);
        let err = report.error().unwrap();
        assert_eq!(err.to_string(), "Step 'coverage' failed: tests failed");
    }

    #[test]
    fn follow_up_failure_is_attached_not_substituted() {
        let log = Log::default();
        let mut builder = TargetGraph::builder();
        builder
            .declare("coverage", fail(&log, "cover", "tests failed"))
            .unwrap()
            .always(fail(&log, "convert", "Coverage.xml missing"));
        let graph = builder.build().unwrap();
        let plan = graph.resolve("coverage").unwrap();

        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        let outcome = report.failed_step().unwrap();
        assert_eq!(outcome.error.as_deref(), Some("tests failed"));
        assert_eq!(outcome.follow_up_error.as_deref(), Some("Coverage.xml missing"));

        match report.error().unwrap() {
            KilnError::StepExecution {
                message, follow_up, ..
            } => {
                assert_eq!(message, "tests failed");
                assert_eq!(follow_up.as_deref(), Some("Coverage.xml missing"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn follow_up_failure_after_success_fails_step() {
        let log = Log::default();
        let mut builder = TargetGraph::builder();
        builder
            .declare("coverage", record(&log, "cover"))
            .unwrap()
            .always(fail(&log, "convert", "converter crashed"));
        builder
            .declare("pack", record(&log, "pack"))
            .unwrap()
            .depends_on("coverage");
        let graph = builder.build().unwrap();
        let plan = graph.resolve("pack").unwrap();

        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        assert!(!report.success);
        assert_eq!(*log.borrow(), vec!["cover", "convert"]);
        assert_eq!(
            report.error().unwrap().to_string(),
            "Step 'coverage' failed: follow-up failed: converter crashed"
        );
    }

    #[test]
    fn skipped_steps_keep_position_without_running() {
        let log = Log::default();
        let graph = chain(&log, None);
        let plan = graph.resolve("three").unwrap();

        let mut reporter = RecordingReporter::default();
        let report = Executor::new(&mut reporter)
            .with_skipped(["two"])
            .run(&plan);

        assert!(report.success);
        assert_eq!(*log.borrow(), vec!["one", "three"]);
        assert_eq!(report.outcomes[1].status, StepStatus::Skipped);
        assert!(reporter.events.contains(&"skip two".to_string()));
        assert!(reporter.events.contains(&"start three 3/3".to_string()));
    }

    #[test]
    fn shared_prerequisite_runs_once() {
        let log = Log::default();
        let mut builder = TargetGraph::builder();
        builder.declare("compile", record(&log, "compile")).unwrap();
        builder
            .declare("test", record(&log, "test"))
            .unwrap()
            .depends_on("compile");
        builder
            .declare("coverage", record(&log, "coverage"))
            .unwrap()
            .depends_on("compile");
        let graph = builder.build().unwrap();
        let plan = graph.resolve_all(&["test", "coverage"]).unwrap();

        let mut reporter = NullReporter;
        Executor::new(&mut reporter).run(&plan);

        assert_eq!(*log.borrow(), vec!["compile", "test", "coverage"]);
    }

    #[test]
    fn anyhow_context_is_preserved_in_message() {
        let mut builder = TargetGraph::builder();
        builder
            .declare("restore", || {
                Err(anyhow::anyhow!("connection refused")).map_err(|e| e.context("nuget restore"))
            })
            .unwrap();
        let graph = builder.build().unwrap();
        let plan = graph.resolve("restore").unwrap();

        let mut reporter = NullReporter;
        let report = Executor::new(&mut reporter).run(&plan);

        assert_eq!(
            report.failed_step().unwrap().error.as_deref(),
            Some("nuget restore: connection refused")
        );
    }

    #[test]
    fn status_display() {
        assert_eq!(StepStatus::Succeeded.to_string(), "succeeded");
        assert_eq!(StepStatus::NotRun.to_string(), "not run");
        assert_eq!(StepStatus::Failed.display_char(), '✗');
    }
}
