//! Repository port for task persistence and column ordering.

use crate::task::{
    domain::{
        CompletionPolicy, DependencyId, ProjectId, SortKey, Task, TaskDomainError, TaskId,
        TaskStatusId,
    },
    ordering::ColumnSequence,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task board repository operations.
pub type BoardRepositoryResult<T> = Result<T, BoardRepositoryError>;

/// Authoritative move of one task, executed atomically by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTaskCommand {
    /// Task to move.
    pub task_id: TaskId,
    /// Destination column.
    pub target_status_id: TaskStatusId,
    /// Requested zero-based position; clamped to the column length.
    pub target_index: usize,
    /// Completion rules applied when the column changes.
    pub policy: CompletionPolicy,
    /// Timestamp recorded on the moved task.
    pub moved_at: DateTime<Utc>,
}

/// Result of a committed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Moved task with its new status, sort, and completion state.
    pub task: Task,
    /// Source column after the move.
    pub source: ColumnSequence,
    /// Destination column after the move; equals `source` for in-column
    /// moves.
    pub target: ColumnSequence,
}

/// Task persistence contract.
///
/// Soft-deleted tasks are invisible to every lookup.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::DuplicateTask`] when the id exists or
    /// [`BoardRepositoryError::StatusNotFound`] when its status is missing.
    async fn store(&self, task: &Task) -> BoardRepositoryResult<()>;

    /// Persists title and completion changes of an existing task.
    ///
    /// Column membership and sort keys change only through
    /// [`Self::move_task`] and [`Self::soft_delete`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::TaskNotFound`] when the task does not
    /// exist.
    async fn update(&self, task: &Task) -> BoardRepositoryResult<()>;

    /// Finds an active task by id.
    async fn find_by_id(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>>;

    /// Finds the active tasks among `ids`, in no particular order.
    async fn find_many(&self, ids: &[TaskId]) -> BoardRepositoryResult<Vec<Task>>;

    /// Returns the active tasks of a project.
    async fn list_by_project(&self, project_id: ProjectId) -> BoardRepositoryResult<Vec<Task>>;

    /// Returns the active tasks of a column ordered by sort key.
    async fn list_by_status(&self, status_id: TaskStatusId) -> BoardRepositoryResult<Vec<Task>>;

    /// Returns the sort key a task created directly into `status_id` gets.
    async fn next_sort(&self, status_id: TaskStatusId) -> BoardRepositoryResult<SortKey>;

    /// Moves a task and rewrites the sort keys of the source and destination
    /// columns in one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::TaskNotFound`] for unknown tasks and
    /// [`BoardRepositoryError::Rejected`] with
    /// [`TaskDomainError::InvalidStatus`] when the target status is missing
    /// or belongs to another project. Nothing is written on error.
    async fn move_task(&self, command: MoveTaskCommand) -> BoardRepositoryResult<MoveOutcome>;

    /// Soft-deletes a task, compacts its column, and removes every
    /// dependency edge touching it, in one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`BoardRepositoryError::TaskNotFound`] for unknown tasks.
    async fn soft_delete(&self, id: TaskId, deleted_at: DateTime<Utc>)
    -> BoardRepositoryResult<Task>;
}

/// Errors returned by task board repository implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A status with the same identifier already exists.
    #[error("duplicate status identifier: {0}")]
    DuplicateStatus(TaskStatusId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The status was not found.
    #[error("task status not found: {0}")]
    StatusNotFound(TaskStatusId),

    /// The dependency was not found.
    #[error("dependency not found: {0}")]
    DependencyNotFound(DependencyId),

    /// The mutation violates a domain invariant and was not applied.
    #[error(transparent)]
    Rejected(#[from] TaskDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
