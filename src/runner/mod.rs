//! The target engine: graph declaration, plan resolution and execution.

pub mod dependency;
pub mod executor;
pub mod plan;
pub mod reporter;

pub use dependency::{EdgeKind, StepHandle, TargetGraph, TargetGraphBuilder};
pub use executor::{Executor, RunReport, StepOutcome, StepStatus};
pub use plan::Plan;
pub use reporter::{NullReporter, Reporter, TracingReporter};
