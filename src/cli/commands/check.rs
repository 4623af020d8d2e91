//! Check command implementation.
//!
//! `kiln check` validates configuration and the whole target graph without
//! running anything. Exit code 2 signals an invalid pipeline.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::pipeline;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The check command implementation.
pub struct CheckCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(project_root: &Path, config_path: Option<PathBuf>) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path,
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = Project::load(&self.project_root, self.config_path.as_deref())?;
        let ctx = project.context(None, true);
        let graph = project.graph(&ctx)?;

        if let Some(cycle) = graph.find_cycle() {
            ui.error(&format!("Circular dependency detected: {}", cycle.join(" -> ")));
            return Ok(CommandResult::failure(2));
        }

        let default = pipeline::default_target(project.config());
        if !graph.contains(default) {
            ui.error(&format!("Default target '{}' is not declared", default));
            return Ok(CommandResult::failure(2));
        }

        ui.success(&format!(
            "Pipeline is valid: {} targets, default '{}'",
            graph.len(),
            default
        ));
        Ok(CommandResult::success())
    }
}
