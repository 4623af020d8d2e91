//! Plan resolution: turning requested targets into an ordered step list.
//!
//! Resolution is a depth-first, post-order walk from each requested target.
//! Depends-on edges pull steps into the plan; runs-after constraints only
//! order steps that are already part of it. The first visit of a step fixes
//! its position, so repeated resolutions of the same request always yield
//! the same plan.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::{KilnError, Result};
use crate::steps::Step;

use super::dependency::TargetGraph;

/// An ordered, deduplicated sequence of steps to execute.
#[derive(Debug)]
pub struct Plan<'g> {
    targets: Vec<String>,
    steps: Vec<&'g Step>,
}

impl<'g> Plan<'g> {
    /// The targets this plan was resolved for, in request order.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[&'g Step] {
        &self.steps
    }

    /// Step names in execution order.
    pub fn names(&self) -> Vec<&'g str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Number of steps in the plan.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether the named step is part of the plan.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Index of the named step in the plan.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name() == name)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

struct Resolver<'g> {
    graph: &'g TargetGraph,
    reachable: Vec<bool>,
    marks: Vec<Mark>,
    stack: Vec<usize>,
    order: Vec<usize>,
}

impl<'g> Resolver<'g> {
    fn new(graph: &'g TargetGraph, roots: &[usize]) -> Self {
        let mut reachable = vec![false; graph.len()];
        let mut queue: VecDeque<usize> = roots.iter().copied().collect();

        while let Some(idx) = queue.pop_front() {
            if reachable[idx] {
                continue;
            }
            reachable[idx] = true;
            for dep in graph.step_at(idx).depends_on() {
                if let Some(dep_idx) = graph.index_of(dep) {
                    queue.push_back(dep_idx);
                }
            }
        }

        Self {
            graph,
            reachable,
            marks: vec![Mark::Unvisited; graph.len()],
            stack: Vec::new(),
            order: Vec::new(),
        }
    }

    fn visit(&mut self, idx: usize) -> Result<()> {
        match self.marks[idx] {
            Mark::Done => return Ok(()),
            Mark::Visiting => return Err(self.cycle_error(idx)),
            Mark::Unvisited => {}
        }

        self.marks[idx] = Mark::Visiting;
        self.stack.push(idx);

        let graph = self.graph;
        let step = graph.step_at(idx);
        let predecessors = step
            .after()
            .iter()
            .filter(|name| self.is_reachable(name));

        let prerequisites: Vec<usize> = step
            .depends_on()
            .iter()
            .chain(predecessors)
            .filter_map(|name| graph.index_of(name))
            .collect();

        for prerequisite in prerequisites {
            self.visit(prerequisite)?;
        }

        self.stack.pop();
        self.marks[idx] = Mark::Done;
        self.order.push(idx);
        Ok(())
    }

    fn is_reachable(&self, name: &str) -> bool {
        self.graph
            .index_of(name)
            .map(|idx| self.reachable[idx])
            .unwrap_or(false)
    }

    fn cycle_error(&self, idx: usize) -> KilnError {
        let start = self.stack.iter().position(|&s| s == idx).unwrap_or(0);
        let mut cycle: Vec<&str> = self.stack[start..]
            .iter()
            .map(|&s| self.graph.step_at(s).name())
            .collect();
        cycle.push(self.graph.step_at(idx).name());

        KilnError::CyclicDependency {
            cycle: cycle.join(" -> "),
        }
    }
}

impl TargetGraph {
    /// Resolve the plan for a single target.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStep` if the target is not declared and
    /// `CyclicDependency` if its prerequisites form a cycle.
    pub fn resolve(&self, target: &str) -> Result<Plan<'_>> {
        self.resolve_all(&[target])
    }

    /// Resolve one plan covering several targets requested together.
    ///
    /// Targets are walked in request order. Runs-after constraints between
    /// any two steps of the combined closure are honored, so
    /// `resolve_all(&["test", "clean"])` still puts `clean` before
    /// `restore` when `clean` is declared to run before it.
    pub fn resolve_all<S: AsRef<str>>(&self, targets: &[S]) -> Result<Plan<'_>> {
        if targets.is_empty() {
            return Err(KilnError::ConfigValidationError {
                message: "No targets requested".to_string(),
            });
        }

        let mut roots = Vec::with_capacity(targets.len());
        for target in targets {
            let target = target.as_ref();
            let idx = self
                .index_of(target)
                .ok_or_else(|| KilnError::UnknownStep {
                    name: target.to_string(),
                    referenced_by: None,
                })?;
            roots.push(idx);
        }

        let mut resolver = Resolver::new(self, &roots);
        for &root in &roots {
            resolver.visit(root)?;
        }

        let plan = Plan {
            targets: targets.iter().map(|t| t.as_ref().to_string()).collect(),
            steps: resolver.order.iter().map(|&idx| self.step_at(idx)).collect(),
        };

        debug!(
            "Resolved plan for [{}]: {}",
            plan.targets.join(", "),
            plan.names().join(" -> ")
        );

        Ok(plan)
    }
}
