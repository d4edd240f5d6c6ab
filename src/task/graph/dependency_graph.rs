//! In-memory dependency graph with cycle rejection.

use super::has_path;
use crate::task::domain::{TaskDependency, TaskDomainError, TaskId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Directed `depends_on` graph over the active tasks of one project.
///
/// The graph is the single place where edge invariants are enforced: no
/// self-edges, at most one edge per ordered pair, and no cycles. Adapters
/// load the current edge set into a graph and call [`Self::add_edge`] inside
/// the same transaction that persists the edge.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    outgoing: HashMap<TaskId, Vec<TaskDependency>>,
    incoming: HashMap<TaskId, Vec<TaskId>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from already persisted edges without re-validating
    /// them.
    #[must_use]
    pub fn from_edges(edges: impl IntoIterator<Item = TaskDependency>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.insert_unchecked(edge);
        }
        graph
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outgoing.values().map(Vec::len).sum()
    }

    /// Returns `true` when the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outgoing.values().all(Vec::is_empty)
    }

    /// Returns the edge `task_id -> depends_on_task_id`, if present.
    #[must_use]
    pub fn edge(&self, task_id: TaskId, depends_on_task_id: TaskId) -> Option<&TaskDependency> {
        self.outgoing
            .get(&task_id)?
            .iter()
            .find(|edge| edge.depends_on_task_id() == depends_on_task_id)
    }

    /// Checks, in order, that the edge is not a self-dependency, is not a
    /// duplicate, and would not close a cycle.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SelfDependency`],
    /// [`TaskDomainError::DuplicateDependency`], or
    /// [`TaskDomainError::CircularDependency`].
    pub fn check_edge(
        &self,
        task_id: TaskId,
        depends_on_task_id: TaskId,
    ) -> Result<(), TaskDomainError> {
        if task_id == depends_on_task_id {
            return Err(TaskDomainError::SelfDependency(task_id));
        }
        if self.edge(task_id, depends_on_task_id).is_some() {
            return Err(TaskDomainError::DuplicateDependency {
                task_id,
                depends_on_task_id,
            });
        }
        if self.has_path(depends_on_task_id, task_id) {
            return Err(TaskDomainError::CircularDependency {
                task_id,
                depends_on_task_id,
            });
        }
        Ok(())
    }

    /// Validates and inserts an edge. The graph is unchanged on error.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition from [`Self::check_edge`].
    pub fn add_edge(&mut self, dependency: TaskDependency) -> Result<(), TaskDomainError> {
        self.check_edge(dependency.task_id(), dependency.depends_on_task_id())?;
        self.insert_unchecked(dependency);
        Ok(())
    }

    /// Removes the edge `task_id -> depends_on_task_id`. Returns whether an
    /// edge was removed.
    pub fn remove_edge(&mut self, task_id: TaskId, depends_on_task_id: TaskId) -> bool {
        let Some(edges) = self.outgoing.get_mut(&task_id) else {
            return false;
        };
        let before = edges.len();
        edges.retain(|edge| edge.depends_on_task_id() != depends_on_task_id);
        let removed = edges.len() != before;
        if edges.is_empty() {
            self.outgoing.remove(&task_id);
        }
        if removed {
            remove_incoming(&mut self.incoming, depends_on_task_id, task_id);
        }
        removed
    }

    /// Outgoing edges: the tasks `task_id` depends on.
    #[must_use]
    pub fn dependencies_of(&self, task_id: TaskId) -> Vec<&TaskDependency> {
        self.outgoing
            .get(&task_id)
            .map(|edges| edges.iter().collect())
            .unwrap_or_default()
    }

    /// Incoming edges: the tasks that depend on `task_id`.
    #[must_use]
    pub fn dependents_of(&self, task_id: TaskId) -> Vec<&TaskDependency> {
        self.incoming
            .get(&task_id)
            .map(|dependents| {
                dependents
                    .iter()
                    .filter_map(|dependent| self.edge(*dependent, task_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns every edge reachable from `task_id`, nearest prerequisites
    /// first.
    ///
    /// A visited set bounds the walk, so malformed data containing a cycle
    /// still terminates with each edge listed once.
    #[must_use]
    pub fn chain_from(&self, task_id: TaskId) -> Vec<&TaskDependency> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([task_id]);
        let mut queue = VecDeque::from([task_id]);

        while let Some(current) = queue.pop_front() {
            for edge in self.outgoing.get(&current).into_iter().flatten() {
                chain.push(edge);
                let next = edge.depends_on_task_id();
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        chain
    }

    /// Returns `true` when `target` is reachable from `source`.
    #[must_use]
    pub fn has_path(&self, source: TaskId, target: TaskId) -> bool {
        has_path(source, target, |current| {
            self.outgoing
                .get(&current)
                .into_iter()
                .flatten()
                .map(TaskDependency::depends_on_task_id)
        })
    }

    fn insert_unchecked(&mut self, dependency: TaskDependency) {
        self.incoming
            .entry(dependency.depends_on_task_id())
            .or_default()
            .push(dependency.task_id());
        self.outgoing
            .entry(dependency.task_id())
            .or_default()
            .push(dependency);
    }
}

fn remove_incoming(incoming: &mut HashMap<TaskId, Vec<TaskId>>, target: TaskId, dependent: TaskId) {
    if let Some(dependents) = incoming.get_mut(&target) {
        dependents.retain(|id| *id != dependent);
        if dependents.is_empty() {
            incoming.remove(&target);
        }
    }
}
