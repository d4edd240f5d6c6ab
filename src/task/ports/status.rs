//! Repository port for board columns.

use super::BoardRepositoryResult;
use crate::task::{
    domain::{ProjectId, TaskStatus, TaskStatusId},
    ordering::StatusRank,
};
use async_trait::async_trait;

/// Status persistence contract.
///
/// Writing a status whose default flag is set clears the flag on every other
/// status of the project in the same atomic unit, so a project has at most
/// one default after any write.
#[async_trait]
pub trait TaskStatusRepository: Send + Sync {
    /// Stores a new status.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardRepositoryError::DuplicateStatus`] when the id
    /// exists and [`super::BoardRepositoryError::Rejected`] with
    /// [`crate::task::domain::TaskDomainError::DuplicateStatusSlug`] when the
    /// slug is taken within the project.
    async fn store(&self, status: &TaskStatus) -> BoardRepositoryResult<()>;

    /// Persists changes to an existing status.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardRepositoryError::StatusNotFound`] when the status
    /// does not exist.
    async fn update(&self, status: &TaskStatus) -> BoardRepositoryResult<()>;

    /// Finds a status by id.
    async fn find_by_id(&self, id: TaskStatusId) -> BoardRepositoryResult<Option<TaskStatus>>;

    /// Returns the statuses of a project in board order.
    async fn list_by_project(&self, project_id: ProjectId)
    -> BoardRepositoryResult<Vec<TaskStatus>>;

    /// Writes the requested column ranks in one atomic unit and returns the
    /// project's statuses in their new board order.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardRepositoryError::Rejected`] when a rank names a
    /// status outside the project, repeats a status, or omits statuses while
    /// `require_complete` is set. Nothing is written on error.
    async fn reorder(
        &self,
        project_id: ProjectId,
        ranks: &[StatusRank],
        require_complete: bool,
    ) -> BoardRepositoryResult<Vec<TaskStatus>>;

    /// Deletes a status after checking, in the same atomic unit, that it is
    /// not the default and holds no active tasks.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardRepositoryError::StatusNotFound`] for unknown
    /// statuses and [`super::BoardRepositoryError::Rejected`] with
    /// [`crate::task::domain::TaskDomainError::DefaultStatusNotDeletable`] or
    /// [`crate::task::domain::TaskDomainError::StatusNotEmpty`].
    async fn delete(&self, id: TaskStatusId) -> BoardRepositoryResult<()>;
}
