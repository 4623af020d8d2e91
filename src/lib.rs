//! kiln - declarative build pipeline runner.
//!
//! kiln declares named build targets (clean, restore, compile, test,
//! coverage, pack) with hard dependencies and weak ordering constraints,
//! resolves a requested set of targets into a linear plan, and runs that
//! plan fail-fast with guaranteed follow-up actions.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, merging, and validation
//! - [`error`] - Error types and result aliases
//! - [`pipeline`] - Built-in .NET targets and the shared build context
//! - [`runner`] - Target graph, plan resolution, and execution
//! - [`shell`] - Shell command execution
//! - [`steps`] - The step type held by the graph
//! - [`sys`] - File-system helpers
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use kiln::runner::{Executor, NullReporter, TargetGraph};
//!
//! let mut builder = TargetGraph::builder();
//! builder.declare("restore", || Ok(())).unwrap();
//! builder
//!     .declare("compile", || Ok(()))
//!     .unwrap()
//!     .depends_on("restore");
//! let graph = builder.build().unwrap();
//!
//! let plan = graph.resolve("compile").unwrap();
//! let mut reporter = NullReporter;
//! let report = Executor::new(&mut reporter).run(&plan);
//! assert!(report.success);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod sys;
pub mod ui;

pub use error::{KilnError, Result};
