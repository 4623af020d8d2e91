//! Plan command implementation.
//!
//! `kiln plan [TARGETS]...` prints the resolved execution order without
//! running anything.

use std::path::{Path, PathBuf};

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The plan command implementation.
pub struct PlanCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(project_root: &Path, config_path: Option<PathBuf>, args: PlanArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path,
            args,
        }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = Project::load(&self.project_root, self.config_path.as_deref())?;
        let ctx = project.context(None, true);
        let graph = project.graph(&ctx)?;

        let targets = project.targets_or_default(&self.args.targets);
        let plan = graph.resolve_all(&targets)?;

        ui.show_header(&format!("Plan for {}", targets.join(", ")));
        for (i, step) in plan.steps().iter().enumerate() {
            ui.message(&format!("{:>3}. {}", i + 1, step.name()));
        }

        Ok(CommandResult::success())
    }
}
