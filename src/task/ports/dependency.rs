//! Repository port for dependency edges.

use super::BoardRepositoryResult;
use crate::task::domain::{DependencyId, ProjectId, TaskDependency, TaskId};
use async_trait::async_trait;

/// Dependency persistence contract.
#[async_trait]
pub trait DependencyRepository: Send + Sync {
    /// Validates `dependency` against the project's current edge set through
    /// [`crate::task::graph::DependencyGraph`] and persists it, in one atomic
    /// unit.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardRepositoryError::TaskNotFound`] when either
    /// endpoint is missing or deleted, and
    /// [`super::BoardRepositoryError::Rejected`] carrying
    /// `SelfDependency`, `DuplicateDependency`, `CircularDependency`, or
    /// `CrossProjectDependency`. Nothing is written on error.
    async fn add(&self, dependency: &TaskDependency) -> BoardRepositoryResult<()>;

    /// Removes the edge `task_id -> depends_on_task_id`. Returns whether an
    /// edge was removed.
    async fn remove(&self, task_id: TaskId, depends_on_task_id: TaskId)
    -> BoardRepositoryResult<bool>;

    /// Finds an edge by id.
    async fn find_by_id(&self, id: DependencyId) -> BoardRepositoryResult<Option<TaskDependency>>;

    /// Returns the edges leaving `task_id`: what it depends on.
    async fn dependencies_of(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<TaskDependency>>;

    /// Returns the edges entering `task_id`: what depends on it.
    async fn dependents_of(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<TaskDependency>>;

    /// Returns every edge between active tasks of a project.
    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> BoardRepositoryResult<Vec<TaskDependency>>;
}
