//! The .NET build pipeline: built-in targets, custom targets from config,
//! and the [`BuildContext`] their actions share.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use kiln::config::KilnConfig;
//! use kiln::pipeline::{self, BuildContext};
//!
//! let config = KilnConfig::default();
//! let ctx = Rc::new(BuildContext::new(".", &config));
//! let graph = pipeline::build_graph(&ctx, &config).unwrap();
//!
//! let plan = graph.resolve_all(&["test", "clean"]).unwrap();
//! assert_eq!(plan.names(), vec!["clean", "restore", "compile", "test"]);
//! ```

pub mod context;
pub mod targets;
pub mod templates;

use std::rc::Rc;

use crate::config::KilnConfig;
use crate::error::Result;
use crate::runner::TargetGraph;

pub use context::{default_configuration, BuildContext, TEST_RESULTS_FILE};
pub use targets::{declare_builtin, declare_custom, BUILTIN_TARGETS, DEFAULT_TARGET};
pub use templates::{default_template, TEMPLATE_NAMES};

/// The graph of built-in targets only.
pub fn standard(ctx: &Rc<BuildContext>) -> Result<TargetGraph> {
    let mut builder = TargetGraph::builder();
    declare_builtin(&mut builder, ctx)?;
    builder.build()
}

/// The built-in targets plus the custom targets declared in `config`.
pub fn build_graph(ctx: &Rc<BuildContext>, config: &KilnConfig) -> Result<TargetGraph> {
    let mut builder = TargetGraph::builder();
    declare_builtin(&mut builder, ctx)?;
    declare_custom(&mut builder, ctx, &config.targets)?;
    builder.build()
}

/// The target to run when none is requested.
pub fn default_target(config: &KilnConfig) -> &str {
    config.default_target.as_deref().unwrap_or(DEFAULT_TARGET)
}
