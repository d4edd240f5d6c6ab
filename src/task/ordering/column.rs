//! Ordered task sequence of a single column.

use crate::task::domain::{SortKey, Task, TaskDomainError, TaskId, TaskStatusId};
use serde::{Deserialize, Serialize};

/// New sort key for one task after a resequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortAssignment {
    /// Task whose key is rewritten.
    pub task_id: TaskId,
    /// Zero-based position within its column.
    pub sort: SortKey,
}

/// Total order of the active tasks in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSequence {
    status_id: TaskStatusId,
    task_ids: Vec<TaskId>,
}

impl ColumnSequence {
    /// Creates a sequence from ids already in display order.
    #[must_use]
    pub const fn new(status_id: TaskStatusId, task_ids: Vec<TaskId>) -> Self {
        Self {
            status_id,
            task_ids,
        }
    }

    /// Creates an empty column.
    #[must_use]
    pub const fn empty(status_id: TaskStatusId) -> Self {
        Self::new(status_id, Vec::new())
    }

    /// Builds the sequence for `status_id` from persisted tasks.
    ///
    /// Soft-deleted tasks and tasks of other columns are skipped. Ties on
    /// `sort` are broken by creation time, then id, so the result is always
    /// a strict order.
    #[must_use]
    pub fn from_tasks<'a>(status_id: TaskStatusId, tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut members: Vec<&Task> = tasks
            .into_iter()
            .filter(|task| task.is_active() && task.status_id() == status_id)
            .collect();
        members.sort_by_key(|task| (task.sort(), task.created_at(), task.id()));
        Self::new(status_id, members.into_iter().map(Task::id).collect())
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn status_id(&self) -> TaskStatusId {
        self.status_id
    }

    /// Returns the task ids in display order.
    #[must_use]
    pub fn task_ids(&self) -> &[TaskId] {
        &self.task_ids
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.task_ids.len()
    }

    /// Returns `true` when the column holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }

    /// Returns the zero-based position of `task_id`.
    #[must_use]
    pub fn position(&self, task_id: TaskId) -> Option<usize> {
        self.task_ids.iter().position(|id| *id == task_id)
    }

    /// Removes `task_id` and returns the position it occupied.
    pub fn remove(&mut self, task_id: TaskId) -> Option<usize> {
        let position = self.position(task_id)?;
        self.task_ids.remove(position);
        Some(position)
    }

    /// Inserts `task_id` at `index`, clamped to `[0, len]`, and returns the
    /// position actually used.
    pub fn insert_clamped(&mut self, task_id: TaskId, index: usize) -> usize {
        let position = index.min(self.task_ids.len());
        self.task_ids.insert(position, task_id);
        position
    }

    /// Returns contiguous zero-based sort keys matching the current order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SortKeyOverflow`] if the column is larger
    /// than the persisted key range.
    pub fn assignments(&self) -> Result<Vec<SortAssignment>, TaskDomainError> {
        self.task_ids
            .iter()
            .enumerate()
            .map(|(position, task_id)| {
                Ok(SortAssignment {
                    task_id: *task_id,
                    sort: SortKey::from_position(position)?,
                })
            })
            .collect()
    }
}
