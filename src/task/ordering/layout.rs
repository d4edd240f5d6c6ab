//! Whole-board view: columns in board order, tasks in column order.

use super::{ColumnSequence, OrderingEngine, StatusRank};
use crate::task::domain::{SortKey, TaskDomainError, TaskId, TaskStatusId};
use serde::{Deserialize, Serialize};

/// Ordered columns of one project board.
///
/// Used by the server to report the authoritative order and by clients to
/// predict the result of a drag with the same positional logic the server
/// applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    columns: Vec<ColumnSequence>,
}

impl BoardLayout {
    /// Creates a layout from columns already in board order.
    #[must_use]
    pub const fn new(columns: Vec<ColumnSequence>) -> Self {
        Self { columns }
    }

    /// Returns the columns in board order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSequence] {
        &self.columns
    }

    /// Returns the column with `status_id`.
    #[must_use]
    pub fn column(&self, status_id: TaskStatusId) -> Option<&ColumnSequence> {
        self.columns
            .iter()
            .find(|column| column.status_id() == status_id)
    }

    /// Returns the status ids in board order.
    #[must_use]
    pub fn column_order(&self) -> Vec<TaskStatusId> {
        self.columns.iter().map(ColumnSequence::status_id).collect()
    }

    /// Finds the column and position of `task_id`.
    #[must_use]
    pub fn locate(&self, task_id: TaskId) -> Option<(TaskStatusId, usize)> {
        self.columns.iter().find_map(|column| {
            column
                .position(task_id)
                .map(|position| (column.status_id(), position))
        })
    }

    /// Moves `task_id` to `index` in `target_status_id`, reindexing the
    /// affected columns. Returns the clamped index used.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatus`] for an unknown target
    /// column and [`TaskDomainError::TaskNotInColumn`] when the task is not
    /// on the board.
    pub fn move_task(
        &mut self,
        task_id: TaskId,
        target_status_id: TaskStatusId,
        index: usize,
    ) -> Result<usize, TaskDomainError> {
        let target_slot = self
            .slot(target_status_id)
            .ok_or(TaskDomainError::InvalidStatus(target_status_id))?;
        let (source_status_id, _) =
            self.locate(task_id)
                .ok_or(TaskDomainError::TaskNotInColumn {
                    task_id,
                    status_id: target_status_id,
                })?;
        let source_slot = self
            .slot(source_status_id)
            .ok_or(TaskDomainError::InvalidStatus(source_status_id))?;

        let source = self.take(source_slot, source_status_id);
        let destination =
            (source_slot != target_slot).then(|| self.take(target_slot, target_status_id));

        let plan = OrderingEngine::plan_move(source, destination, task_id, index)?;
        let clamped = plan.index();
        let (source_column, destination_column) = plan.into_columns();
        self.put(source_slot, source_column);
        if let Some(column) = destination_column {
            self.put(target_slot, column);
        }
        Ok(clamped)
    }

    /// Moves the column `status_id` to `index` (clamped) in board order.
    /// Returns the clamped index used.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatus`] for an unknown column.
    pub fn move_column(
        &mut self,
        status_id: TaskStatusId,
        index: usize,
    ) -> Result<usize, TaskDomainError> {
        let slot = self
            .slot(status_id)
            .ok_or(TaskDomainError::InvalidStatus(status_id))?;
        let column = self.columns.remove(slot);
        let position = index.min(self.columns.len());
        self.columns.insert(position, column);
        Ok(position)
    }

    /// Returns the full rank list describing the current column order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SortKeyOverflow`] for oversized boards.
    pub fn status_ranks(&self) -> Result<Vec<StatusRank>, TaskDomainError> {
        self.columns
            .iter()
            .enumerate()
            .map(|(position, column)| {
                Ok(StatusRank::new(
                    column.status_id(),
                    SortKey::from_position(position)?,
                ))
            })
            .collect()
    }

    fn slot(&self, status_id: TaskStatusId) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.status_id() == status_id)
    }

    fn take(&mut self, slot: usize, status_id: TaskStatusId) -> ColumnSequence {
        self.columns.get_mut(slot).map_or_else(
            || ColumnSequence::empty(status_id),
            |column| std::mem::replace(column, ColumnSequence::empty(status_id)),
        )
    }

    fn put(&mut self, slot: usize, column: ColumnSequence) {
        if let Some(existing) = self.columns.get_mut(slot) {
            *existing = column;
        }
    }
}
