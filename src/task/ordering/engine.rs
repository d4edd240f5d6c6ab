//! Positional moves with full rewrite of the affected columns.

use super::{ColumnSequence, SortAssignment};
use crate::task::domain::{SortKey, Task, TaskDomainError, TaskId, TaskStatusId};

/// Outcome of planning a move: the rewritten column(s) and the final
/// position of the moved task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    task_id: TaskId,
    source: ColumnSequence,
    destination: Option<ColumnSequence>,
    index: usize,
}

impl MovePlan {
    /// Returns the moved task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the column the task left.
    #[must_use]
    pub const fn source_status_id(&self) -> TaskStatusId {
        self.source.status_id()
    }

    /// Returns the column the task landed in.
    #[must_use]
    pub fn target_status_id(&self) -> TaskStatusId {
        self.target().status_id()
    }

    /// Returns `true` when the task stayed in its column.
    #[must_use]
    pub const fn is_same_column(&self) -> bool {
        self.destination.is_none()
    }

    /// Returns the clamped position of the moved task in the target column.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the source column after the move.
    #[must_use]
    pub const fn source(&self) -> &ColumnSequence {
        &self.source
    }

    /// Returns the target column after the move.
    #[must_use]
    pub fn target(&self) -> &ColumnSequence {
        self.destination.as_ref().unwrap_or(&self.source)
    }

    /// Returns the moved task's new sort key.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SortKeyOverflow`] for oversized columns.
    pub fn target_sort(&self) -> Result<SortKey, TaskDomainError> {
        SortKey::from_position(self.index)
    }

    /// Returns sort keys for every task in the affected column(s): the
    /// source column first, then the destination column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SortKeyOverflow`] for oversized columns.
    pub fn assignments(&self) -> Result<Vec<SortAssignment>, TaskDomainError> {
        let mut assignments = self.source.assignments()?;
        if let Some(destination) = &self.destination {
            assignments.extend(destination.assignments()?);
        }
        Ok(assignments)
    }

    /// Consumes the plan and returns the rewritten columns.
    #[must_use]
    pub fn into_columns(self) -> (ColumnSequence, Option<ColumnSequence>) {
        (self.source, self.destination)
    }
}

/// Maintains the total order of tasks within and across columns.
///
/// Every move rewrites all keys of the affected columns to contiguous
/// zero-based positions, so there are no gaps, ties, or key exhaustion.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderingEngine;

impl OrderingEngine {
    /// Plans moving `task_id` out of `source` and into `destination` at
    /// `target_index`, clamped to the destination length.
    ///
    /// `destination` is `None` for moves within `source`; passing the source
    /// column again is treated the same way.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TaskNotInColumn`] when `task_id` is not in
    /// `source`.
    pub fn plan_move(
        mut source: ColumnSequence,
        destination: Option<ColumnSequence>,
        task_id: TaskId,
        target_index: usize,
    ) -> Result<MovePlan, TaskDomainError> {
        if source.remove(task_id).is_none() {
            return Err(TaskDomainError::TaskNotInColumn {
                task_id,
                status_id: source.status_id(),
            });
        }

        let mut other = destination.filter(|column| column.status_id() != source.status_id());
        let index = match other.as_mut() {
            Some(column) => {
                column.remove(task_id);
                column.insert_clamped(task_id, target_index)
            }
            None => source.insert_clamped(task_id, target_index),
        };

        Ok(MovePlan {
            task_id,
            source,
            destination: other,
            index,
        })
    }

    /// Returns `max(sort) + 1` over the active tasks of `status_id`, or the
    /// first key for an empty column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SortKeyOverflow`] when the column already
    /// uses the largest key.
    pub fn next_sort<'a>(
        status_id: TaskStatusId,
        tasks: impl IntoIterator<Item = &'a Task>,
    ) -> Result<SortKey, TaskDomainError> {
        tasks
            .into_iter()
            .filter(|task| task.is_active() && task.status_id() == status_id)
            .map(Task::sort)
            .max()
            .map_or(Ok(SortKey::FIRST), SortKey::successor)
    }
}
