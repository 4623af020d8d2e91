//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::Configuration;

/// kiln - declarative build pipeline runner for .NET solutions.
#[derive(Debug, Parser)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .kiln/config.yml and config.local.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root (default: nearest directory containing .kiln/ or .git)
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Show step descriptions while running
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only show errors and the final result
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run targets and their prerequisites (default if no command specified)
    Run(RunArgs),

    /// Print the execution plan without running it
    Plan(PlanArgs),

    /// List available targets
    List(ListArgs),

    /// Validate the pipeline definition
    Check,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Targets to run (default: the configured default target)
    pub targets: Vec<String>,

    /// Leave these planned targets out (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Build configuration (default: debug locally, release on CI)
    #[arg(long, value_enum, env = "KILN_CONFIGURATION")]
    pub configuration: Option<Configuration>,

    /// Print commands instead of executing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    /// Targets to plan (default: the configured default target)
    pub targets: Vec<String>,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Print target names only, one per line
    #[arg(long)]
    pub names: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
