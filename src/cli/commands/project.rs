//! Loading shared by the commands that need the target graph.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::config::{load_config, validate, Configuration, KilnConfig};
use crate::error::Result;
use crate::pipeline::{self, BuildContext};
use crate::runner::TargetGraph;

/// A project root with its validated configuration.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    config: KilnConfig,
}

impl Project {
    /// Load and validate the configuration for `root`.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = load_config(root, config_path)?;
        validate(&config)?;
        debug!("Loaded configuration for {}", root.display());

        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &KilnConfig {
        &self.config
    }

    /// Build context for one invocation.
    pub fn context(&self, configuration: Option<Configuration>, dry_run: bool) -> Rc<BuildContext> {
        let mut ctx = BuildContext::new(&self.root, &self.config).with_dry_run(dry_run);
        if let Some(configuration) = configuration {
            ctx = ctx.with_configuration(configuration);
        }
        Rc::new(ctx)
    }

    /// The full target graph for this project.
    pub fn graph(&self, ctx: &Rc<BuildContext>) -> Result<TargetGraph> {
        pipeline::build_graph(ctx, &self.config)
    }

    /// `requested`, or the default target when empty.
    pub fn targets_or_default(&self, requested: &[String]) -> Vec<String> {
        if requested.is_empty() {
            vec![pipeline::default_target(&self.config).to_string()]
        } else {
            requested.to_vec()
        }
    }
}
