//! Run command implementation.
//!
//! `kiln run [TARGETS]...` resolves the plan for the requested targets and
//! executes it fail-fast, then prints a per-target summary.

use std::path::{Path, PathBuf};

use crate::cli::args::RunArgs;
use crate::error::{KilnError, Result};
use crate::runner::Executor;
use crate::ui::{UiReporter, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path, config_path: Option<PathBuf>, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path,
            args,
        }
    }

    pub fn args(&self) -> &RunArgs {
        &self.args
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = Project::load(&self.project_root, self.config_path.as_deref())?;
        let ctx = project.context(self.args.configuration, self.args.dry_run);
        let graph = project.graph(&ctx)?;

        for name in &self.args.skip {
            if !graph.contains(name) {
                return Err(KilnError::UnknownStep {
                    name: name.clone(),
                    referenced_by: Some("--skip".to_string()),
                });
            }
        }

        let targets = project.targets_or_default(&self.args.targets);
        let plan = graph.resolve_all(&targets)?;

        ui.show_header(&format!(
            "kiln · {} · {}",
            targets.join(", "),
            ctx.configuration()
        ));
        if self.args.dry_run {
            ui.warning("Dry run: commands are printed, not executed");
        }
        if ui.output_mode().shows_details() {
            for step in plan.steps() {
                if let Some(description) = step.description() {
                    ui.message(&format!("  {}: {}", step.name(), description));
                }
            }
        }

        let report = {
            let mut reporter = UiReporter::new(ui);
            Executor::new(&mut reporter)
                .with_skipped(self.args.skip.iter().cloned())
                .run(&plan)
        };

        ui.show_run_summary(&report);

        if report.success {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::StepStatus;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn project(config: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".kiln")).unwrap();
        fs::write(temp.path().join(".kiln/config.yml"), config).unwrap();
        temp
    }

    fn run(temp: &TempDir, args: RunArgs) -> (Result<CommandResult>, MockUI) {
        let mut ui = MockUI::new();
        let result = RunCommand::new(temp.path(), None, args).execute(&mut ui);
        (result, ui)
    }

    const ECHO_PIPELINE: &str = r#"
default_target: test
commands:
  restore: echo restore >> log.txt
  compile: echo compile >> log.txt
  test: echo test >> log.txt
"#;

    #[test]
    fn runs_default_target_with_prerequisites() {
        let temp = project(ECHO_PIPELINE);
        fs::write(temp.path().join("App.sln"), "").unwrap();

        let (result, ui) = run(&temp, RunArgs::default());

        assert!(result.unwrap().success);
        let summary = &ui.summaries()[0];
        let names: Vec<_> = summary.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["restore", "compile", "test"]);
        assert!(summary.iter().all(|(_, s)| *s == StepStatus::Succeeded));

        let log = fs::read_to_string(temp.path().join("log.txt")).unwrap();
        let lines: Vec<_> = log.lines().map(str::trim).collect();
        assert_eq!(lines, vec!["restore", "compile", "test"]);
    }

    #[test]
    fn failing_step_stops_the_run() {
        let temp = project(
            "commands:\n  restore: echo ok\n  compile: exit 3\n  test: echo test > ran.txt\n",
        );
        fs::write(temp.path().join("App.sln"), "").unwrap();

        let (result, ui) = run(
            &temp,
            RunArgs {
                targets: vec!["test".to_string()],
                ..Default::default()
            },
        );

        let result = result.unwrap();
        assert_eq!(result.exit_code, 1);
        assert_eq!(
            ui.summaries()[0],
            vec![
                ("restore".to_string(), StepStatus::Succeeded),
                ("compile".to_string(), StepStatus::Failed),
                ("test".to_string(), StepStatus::NotRun),
            ]
        );
        assert!(!temp.path().join("ran.txt").exists());
    }

    #[test]
    fn skipped_targets_keep_their_place() {
        let temp = project(ECHO_PIPELINE);
        fs::write(temp.path().join("App.sln"), "").unwrap();

        let (result, ui) = run(
            &temp,
            RunArgs {
                skip: vec!["restore".to_string()],
                ..Default::default()
            },
        );

        assert!(result.unwrap().success);
        assert_eq!(ui.summaries()[0][0], ("restore".to_string(), StepStatus::Skipped));
        let log = fs::read_to_string(temp.path().join("log.txt")).unwrap();
        assert!(!log.contains("restore"));
    }

    #[test]
    fn unknown_skip_is_a_configuration_error() {
        let temp = project(ECHO_PIPELINE);
        let (result, _) = run(
            &temp,
            RunArgs {
                skip: vec!["restor".to_string()],
                ..Default::default()
            },
        );

        let err = result.unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("--skip"));
    }

    #[test]
    fn unknown_target_is_a_configuration_error() {
        let temp = project(ECHO_PIPELINE);
        let (result, _) = run(
            &temp,
            RunArgs {
                targets: vec!["deploy".to_string()],
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(KilnError::UnknownStep { .. })));
    }

    #[test]
    fn dry_run_executes_nothing() {
        let temp = project(ECHO_PIPELINE);
        fs::write(temp.path().join("App.sln"), "").unwrap();

        let (result, ui) = run(
            &temp,
            RunArgs {
                dry_run: true,
                ..Default::default()
            },
        );

        assert!(result.unwrap().success);
        assert!(!temp.path().join("log.txt").exists());
        assert!(ui.has_output("Dry run"));
    }

    #[test]
    fn header_names_targets_and_configuration() {
        let temp = project(ECHO_PIPELINE);
        fs::write(temp.path().join("App.sln"), "").unwrap();

        let (_, ui) = run(
            &temp,
            RunArgs {
                configuration: Some(crate::config::Configuration::Release),
                ..Default::default()
            },
        );
        assert_eq!(ui.headers(), ["kiln · test · Release"]);
    }
}
