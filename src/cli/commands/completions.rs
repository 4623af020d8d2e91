//! `kiln completions <shell>`.
//!
//! Scripts are generated from the clap definition, so subcommands, flags
//! and the `--configuration` values stay in sync with [`Cli`]. Target names
//! come from project config and are not completed.

use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::{Cli, CompletionsArgs};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Prints a completion script for one shell.
pub struct CompletionsCommand {
    shell: Shell,
}

impl CompletionsCommand {
    pub fn new(args: CompletionsArgs) -> Self {
        Self { shell: args.shell }
    }

    fn write_to(&self, out: &mut dyn Write) -> Result<()> {
        let mut cmd = Cli::command();
        let bin = cmd.get_name().to_string();
        clap_complete::generate(self.shell, &mut cmd, bin, out);
        out.flush()?;
        Ok(())
    }
}

impl Command for CompletionsCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        self.write_to(&mut std::io::stdout().lock())?;
        Ok(CommandResult::success())
    }
}
