//! The step model: a named action plus its declared edges.

use std::fmt;

/// A step action.
///
/// Actions close over whatever configuration they need and report failure
/// through `anyhow`, which keeps toolchain glue free to attach context.
pub type Action = Box<dyn Fn() -> anyhow::Result<()>>;

/// A named unit of pipeline work.
///
/// Steps are created through
/// [`TargetGraphBuilder::declare`](crate::runner::TargetGraphBuilder::declare);
/// once the graph is built they are immutable.
pub struct Step {
    name: String,
    description: Option<String>,
    action: Action,
    follow_up: Option<Action>,
    depends_on: Vec<String>,
    after: Vec<String>,
}

impl Step {
    pub(crate) fn new(name: String, action: Action) -> Self {
        Self {
            name,
            description: None,
            action,
            follow_up: None,
            depends_on: Vec::new(),
            after: Vec::new(),
        }
    }

    /// The step's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description, if one was attached.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Hard prerequisites, in declaration order.
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    /// Steps that must run before this one when both are planned, in
    /// declaration order.
    pub fn after(&self) -> &[String] {
        &self.after
    }

    /// Whether a guaranteed follow-up action is attached.
    pub fn has_follow_up(&self) -> bool {
        self.follow_up.is_some()
    }

    /// Invoke the primary action.
    pub fn run_action(&self) -> anyhow::Result<()> {
        (self.action)()
    }

    /// Invoke the follow-up action. Returns `None` when there is none.
    pub fn run_follow_up(&self) -> Option<anyhow::Result<()>> {
        self.follow_up.as_ref().map(|follow_up| follow_up())
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = Some(description);
    }

    pub(crate) fn set_follow_up(&mut self, follow_up: Action) {
        self.follow_up = Some(follow_up);
    }

    pub(crate) fn push_dependency(&mut self, name: &str) {
        if !self.depends_on.iter().any(|d| d == name) {
            self.depends_on.push(name.to_string());
        }
    }

    pub(crate) fn push_predecessor(&mut self, name: &str) {
        if !self.after.iter().any(|d| d == name) {
            self.after.push(name.to_string());
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("depends_on", &self.depends_on)
            .field("after", &self.after)
            .field("follow_up", &self.follow_up.is_some())
            .finish()
    }
}
