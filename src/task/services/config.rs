//! Explicit board configuration and listing parameters.

use crate::task::domain::{CompletionPolicy, Task, TaskStatus, TaskStatusId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Behavioural switches for a task board.
///
/// The defaults keep completion one-way and trust partial column reorder
/// lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Moving a task into a completed status stamps `completed_at`.
    pub complete_on_completed_status: bool,
    /// Moving a task out of a completed status clears `completed_at`.
    pub reopen_on_leave_completed: bool,
    /// Column reorder requests must list every status of the project.
    pub require_complete_status_reorder: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            complete_on_completed_status: true,
            reopen_on_leave_completed: false,
            require_complete_status_reorder: false,
        }
    }
}

impl BoardConfig {
    /// Sets whether entering a completed status completes the task.
    #[must_use]
    pub const fn with_complete_on_completed_status(mut self, enabled: bool) -> Self {
        self.complete_on_completed_status = enabled;
        self
    }

    /// Sets whether leaving a completed status reopens the task.
    #[must_use]
    pub const fn with_reopen_on_leave_completed(mut self, enabled: bool) -> Self {
        self.reopen_on_leave_completed = enabled;
        self
    }

    /// Sets whether column reorders must cover every status.
    #[must_use]
    pub const fn with_require_complete_status_reorder(mut self, enabled: bool) -> Self {
        self.require_complete_status_reorder = enabled;
        self
    }

    /// Returns the completion rules applied by task moves.
    #[must_use]
    pub const fn completion_policy(&self) -> CompletionPolicy {
        CompletionPolicy {
            complete_on_completed_status: self.complete_on_completed_status,
            reopen_on_leave_completed: self.reopen_on_leave_completed,
        }
    }
}

/// Sort order for task listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskListOrder {
    /// Column order, then position within the column.
    #[default]
    Board,
    /// Oldest first.
    CreatedAt,
    /// Alphabetical by title.
    Title,
}

/// Filter and sort parameters for listing the tasks of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskListFilter {
    /// Restricts the listing to one column.
    pub status_id: Option<TaskStatusId>,
    /// Includes completed tasks.
    pub include_completed: bool,
    /// Result ordering.
    pub order: TaskListOrder,
}

impl Default for TaskListFilter {
    fn default() -> Self {
        Self {
            status_id: None,
            include_completed: true,
            order: TaskListOrder::Board,
        }
    }
}

impl TaskListFilter {
    /// Restricts the listing to one column.
    #[must_use]
    pub const fn in_status(mut self, status_id: TaskStatusId) -> Self {
        self.status_id = Some(status_id);
        self
    }

    /// Leaves completed tasks out of the listing.
    #[must_use]
    pub const fn open_only(mut self) -> Self {
        self.include_completed = false;
        self
    }

    /// Sets the result ordering.
    #[must_use]
    pub const fn ordered_by(mut self, order: TaskListOrder) -> Self {
        self.order = order;
        self
    }

    /// Filters and sorts `tasks`. `statuses` supplies the column order used
    /// by [`TaskListOrder::Board`].
    #[must_use]
    pub fn apply(&self, tasks: Vec<Task>, statuses: &[TaskStatus]) -> Vec<Task> {
        let mut selected: Vec<Task> = tasks
            .into_iter()
            .filter(|task| task.is_active())
            .filter(|task| self.status_id.is_none_or(|id| task.status_id() == id))
            .filter(|task| self.include_completed || !task.is_completed())
            .collect();

        match self.order {
            TaskListOrder::Board => {
                let rank: HashMap<TaskStatusId, usize> = statuses
                    .iter()
                    .enumerate()
                    .map(|(position, status)| (status.id(), position))
                    .collect();
                selected.sort_by_key(|task| {
                    (
                        rank.get(&task.status_id()).copied().unwrap_or(usize::MAX),
                        task.sort(),
                        task.created_at(),
                        task.id(),
                    )
                });
            }
            TaskListOrder::CreatedAt => {
                selected.sort_by_key(|task| (task.created_at(), task.id()));
            }
            TaskListOrder::Title => {
                selected.sort_by(|left, right| {
                    left.title()
                        .to_lowercase()
                        .cmp(&right.title().to_lowercase())
                        .then_with(|| left.id().cmp(&right.id()))
                });
            }
        }
        selected
    }
}
