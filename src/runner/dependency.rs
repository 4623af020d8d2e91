//! Target graph declaration and validation.
//!
//! Steps are declared on a [`TargetGraphBuilder`], which accepts edges by
//! name (forward references allowed) and validates them in
//! [`TargetGraphBuilder::build`]. The resulting [`TargetGraph`] is immutable.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{KilnError, Result};
use crate::steps::{Action, Step};

/// The kind of edge recorded between two steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Hard prerequisite: `to` must complete before `from` and is pulled
    /// into any plan containing `from`.
    DependsOn,
    /// Weak ordering: `to` runs before `from` only when both are planned.
    RunsAfter,
}

#[derive(Debug, Clone)]
struct Edge {
    from: String,
    to: String,
    kind: EdgeKind,
}

/// Accumulates step declarations and their edges.
#[derive(Default)]
pub struct TargetGraphBuilder {
    steps: Vec<Step>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
}

impl TargetGraphBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new step.
    ///
    /// Returns a handle for attaching edges, a description and a follow-up.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateStep` if the name is already declared.
    pub fn declare<F>(&mut self, name: impl Into<String>, action: F) -> Result<StepHandle<'_>>
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(KilnError::DuplicateStep { name });
        }

        debug!("Declared step '{}'", name);
        self.index.insert(name.clone(), self.steps.len());
        self.steps.push(Step::new(name.clone(), Box::new(action)));

        Ok(StepHandle {
            builder: self,
            name,
        })
    }

    /// Check whether a step has been declared so far.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Record that `from` depends on `to`.
    ///
    /// Neither step needs to be declared yet; unknown names are reported by
    /// [`build`](Self::build).
    pub fn add_dependency(&mut self, from: &str, to: &str) -> &mut Self {
        self.push_edge(from, to, EdgeKind::DependsOn)
    }

    /// Record that `to` must run before `from` whenever both are planned.
    ///
    /// Unlike [`add_dependency`](Self::add_dependency), this never pulls `to`
    /// into a plan.
    pub fn add_ordering_constraint(&mut self, from: &str, to: &str) -> &mut Self {
        self.push_edge(from, to, EdgeKind::RunsAfter)
    }

    fn push_edge(&mut self, from: &str, to: &str, kind: EdgeKind) -> &mut Self {
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
            kind,
        });
        self
    }

    fn step_mut(&mut self, name: &str) -> Option<&mut Step> {
        let idx = *self.index.get(name)?;
        self.steps.get_mut(idx)
    }

    /// Validate all edges and produce the immutable graph.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStep` for the first edge (in declaration order) that
    /// names an undeclared step.
    pub fn build(mut self) -> Result<TargetGraph> {
        let edges = std::mem::take(&mut self.edges);

        for edge in &edges {
            if !self.index.contains_key(&edge.from) {
                return Err(KilnError::UnknownStep {
                    name: edge.from.clone(),
                    referenced_by: Some(edge.to.clone()),
                });
            }
            if !self.index.contains_key(&edge.to) {
                return Err(KilnError::UnknownStep {
                    name: edge.to.clone(),
                    referenced_by: Some(edge.from.clone()),
                });
            }
        }

        for edge in &edges {
            if let Some(step) = self.step_mut(&edge.from) {
                match edge.kind {
                    EdgeKind::DependsOn => step.push_dependency(&edge.to),
                    EdgeKind::RunsAfter => step.push_predecessor(&edge.to),
                }
            }
        }

        debug!(
            "Built target graph with {} steps and {} edges",
            self.steps.len(),
            edges.len()
        );

        Ok(TargetGraph {
            steps: self.steps,
            index: self.index,
        })
    }
}

/// Handle to a freshly declared step.
///
/// All methods consume and return the handle so declarations chain:
///
/// ```
/// use kiln::runner::TargetGraph;
///
/// let mut builder = TargetGraph::builder();
/// builder.declare("clean", || Ok(())).unwrap().before("restore");
/// builder.declare("restore", || Ok(())).unwrap();
/// builder
///     .declare("compile", || Ok(()))
///     .unwrap()
///     .describe("Build the solution")
///     .depends_on("restore");
///
/// let graph = builder.build().unwrap();
/// let plan = graph.resolve("compile").unwrap();
/// assert_eq!(plan.names(), vec!["restore", "compile"]);
/// ```
pub struct StepHandle<'a> {
    builder: &'a mut TargetGraphBuilder,
    name: String,
}

impl StepHandle<'_> {
    /// Name of the declared step.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This step depends on `to`.
    pub fn depends_on(self, to: impl AsRef<str>) -> Self {
        self.builder.add_dependency(&self.name, to.as_ref());
        self
    }

    /// `to` runs before this step whenever both are planned.
    pub fn after(self, to: impl AsRef<str>) -> Self {
        self.builder.add_ordering_constraint(&self.name, to.as_ref());
        self
    }

    /// This step runs before `other` whenever both are planned.
    pub fn before(self, other: impl AsRef<str>) -> Self {
        self.builder.add_ordering_constraint(other.as_ref(), &self.name);
        self
    }

    /// Attach a description shown in listings.
    pub fn describe(self, description: impl Into<String>) -> Self {
        let description = description.into();
        if let Some(step) = self.builder.step_mut(&self.name) {
            step.set_description(description);
        }
        self
    }

    /// Attach a follow-up action that always runs after the primary action,
    /// whether it succeeded or not.
    pub fn always<F>(self, follow_up: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        let follow_up: Action = Box::new(follow_up);
        if let Some(step) = self.builder.step_mut(&self.name) {
            step.set_follow_up(follow_up);
        }
        self
    }
}

/// An immutable, validated set of steps.
#[derive(Debug)]
pub struct TargetGraph {
    steps: Vec<Step>,
    index: HashMap<String, usize>,
}

impl TargetGraph {
    /// Create a new graph builder.
    pub fn builder() -> TargetGraphBuilder {
        TargetGraphBuilder::new()
    }

    /// Look up a step by name.
    pub fn get(&self, name: &str) -> Option<&Step> {
        self.index.get(name).map(|&idx| &self.steps[idx])
    }

    /// Check if a step exists in the graph.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All steps in declaration order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }

    /// All step names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Get the number of steps in the graph.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps that depend on the given step, in declaration order.
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.depends_on().iter().any(|d| d == name))
            .map(|s| s.name())
            .collect()
    }

    /// Steps this step is ordered before (the reverse of [`Step::after`]).
    pub fn successors_of(&self, name: &str) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.after().iter().any(|d| d == name))
            .map(|s| s.name())
            .collect()
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn step_at(&self, idx: usize) -> &Step {
        &self.steps[idx]
    }

    /// Find a cycle over every edge in the graph, returning the path if one
    /// exists.
    ///
    /// Plan resolution only sees edges among planned steps; this checks the
    /// whole definition at once.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum State {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs(
            idx: usize,
            graph: &TargetGraph,
            state: &mut [State],
            path: &mut Vec<usize>,
        ) -> Option<Vec<String>> {
            state[idx] = State::Visiting;
            path.push(idx);

            let step = graph.step_at(idx);
            let edges = step.depends_on().iter().chain(step.after().iter());
            for next in edges.filter_map(|name| graph.index_of(name)) {
                match state[next] {
                    State::Visiting => {
                        let start = path.iter().position(|&p| p == next).unwrap_or(0);
                        let mut cycle: Vec<String> = path[start..]
                            .iter()
                            .map(|&p| graph.step_at(p).name().to_string())
                            .collect();
                        cycle.push(graph.step_at(next).name().to_string());
                        return Some(cycle);
                    }
                    State::Unvisited => {
                        if let Some(cycle) = dfs(next, graph, state, path) {
                            return Some(cycle);
                        }
                    }
                    State::Visited => {}
                }
            }

            path.pop();
            state[idx] = State::Visited;
            None
        }

        let mut state = vec![State::Unvisited; self.steps.len()];
        let mut path = Vec::new();

        for idx in 0..self.steps.len() {
            if state[idx] == State::Unvisited {
                if let Some(cycle) = dfs(idx, self, &mut state, &mut path) {
                    return Some(cycle);
                }
            }
        }

        None
    }
}
