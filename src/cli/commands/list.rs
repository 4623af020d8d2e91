//! List command implementation.
//!
//! The `kiln list` command lists targets with their descriptions and edges.

use std::path::{Path, PathBuf};

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::pipeline;
use crate::ui::theme::KilnTheme;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::project::Project;

/// The list command implementation.
pub struct ListCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(project_root: &Path, config_path: Option<PathBuf>, args: ListArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path,
            args,
        }
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = Project::load(&self.project_root, self.config_path.as_deref())?;
        let ctx = project.context(None, true);
        let graph = project.graph(&ctx)?;

        if self.args.names {
            for name in graph.names() {
                ui.message(name);
            }
            return Ok(CommandResult::success());
        }

        let theme = if crate::ui::should_use_colors() {
            KilnTheme::new()
        } else {
            KilnTheme::plain()
        };
        let default = pipeline::default_target(project.config());

        ui.message(&format!("  {}", theme.highlight.apply_to("Targets:")));
        for step in graph.steps() {
            let marker = if step.name() == default {
                format!(" {}", theme.dim.apply_to("(default)"))
            } else {
                String::new()
            };
            ui.message(&format!(
                "    {}{}",
                theme.highlight.apply_to(step.name()),
                marker
            ));

            if let Some(description) = step.description() {
                ui.message(&format!("      {}", theme.dim.apply_to(description)));
            }
            if !step.depends_on().is_empty() {
                ui.message(&format!(
                    "      {} {}",
                    theme.dim.apply_to("└── depends on:"),
                    theme.dim.apply_to(step.depends_on().join(", "))
                ));
            }
            if !step.after().is_empty() {
                ui.message(&format!(
                    "      {} {}",
                    theme.dim.apply_to("└── runs after:"),
                    theme.dim.apply_to(step.after().join(", "))
                ));
            }
        }

        Ok(CommandResult::success())
    }
}
