//! Blocked-state evaluation from direct dependencies.

use super::DependencyGraph;
use crate::task::domain::{Task, TaskId};
use std::collections::HashMap;

/// Answers whether a prerequisite task has been completed.
pub trait CompletionLookup {
    /// Returns `Some(true)` for completed tasks, `Some(false)` for open ones,
    /// and `None` when the task is unknown (deleted or out of scope).
    fn is_completed(&self, task_id: TaskId) -> Option<bool>;
}

impl<S: std::hash::BuildHasher> CompletionLookup for HashMap<TaskId, Task, S> {
    fn is_completed(&self, task_id: TaskId) -> Option<bool> {
        self.get(&task_id).map(Task::is_completed)
    }
}

impl CompletionLookup for [Task] {
    fn is_completed(&self, task_id: TaskId) -> Option<bool> {
        self.iter()
            .find(|task| task.id() == task_id)
            .map(Task::is_completed)
    }
}

/// Derives blocked state from a task's direct dependencies.
///
/// Only immediate prerequisites are inspected: a task becomes unblocked the
/// moment each of its direct prerequisites is completed. Unknown
/// prerequisites never block, since deleted tasks drop out of the graph.
#[derive(Debug, Clone, Copy)]
pub struct BlockingEvaluator<'g> {
    graph: &'g DependencyGraph,
}

impl<'g> BlockingEvaluator<'g> {
    /// Creates an evaluator over `graph`.
    #[must_use]
    pub const fn new(graph: &'g DependencyGraph) -> Self {
        Self { graph }
    }

    /// Returns `true` when at least one direct prerequisite is incomplete.
    #[must_use]
    pub fn is_blocked<L>(&self, task_id: TaskId, lookup: &L) -> bool
    where
        L: CompletionLookup + ?Sized,
    {
        self.graph
            .dependencies_of(task_id)
            .iter()
            .any(|edge| lookup.is_completed(edge.depends_on_task_id()) == Some(false))
    }

    /// Returns the incomplete direct prerequisites, in edge order.
    #[must_use]
    pub fn blocking_tasks_of<L>(&self, task_id: TaskId, lookup: &L) -> Vec<TaskId>
    where
        L: CompletionLookup + ?Sized,
    {
        self.graph
            .dependencies_of(task_id)
            .iter()
            .map(|edge| edge.depends_on_task_id())
            .filter(|prerequisite| lookup.is_completed(*prerequisite) == Some(false))
            .collect()
    }
}
