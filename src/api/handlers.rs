//! Transport-agnostic handlers for the task board operations.
//!
//! Each handler takes already-extracted path parameters and a decoded body,
//! calls the services, and returns a status code with a serialisable body or
//! an [`ApiError`](super::ApiError). HTTP routing is left to the embedding server.

use super::{
    Acknowledged, AddDependencyBody, ApiResponse, ApiResult, BlockedStateBody,
    DependencyCreatedBody, DependencyOverviewBody, ReorderStatusesBody, TaskBody,
    UpdateTaskStatusBody,
};
use crate::task::{
    domain::{DependencyId, ProjectId, TaskId, TaskStatusId},
    ports::{DependencyRepository, TaskRepository, TaskStatusRepository},
    services::{AddDependencyRequest, DependencyService, MoveTaskRequest, TaskBoardService},
};
use mockable::Clock;
use std::sync::Arc;

/// Entry point for the task board operations.
pub struct TaskBoardApi<T, S, D, C>
where
    T: TaskRepository,
    S: TaskStatusRepository,
    D: DependencyRepository,
    C: Clock + Send + Sync,
{
    board: Arc<TaskBoardService<T, S, C>>,
    dependencies: Arc<DependencyService<T, D, C>>,
}

impl<T, S, D, C> TaskBoardApi<T, S, D, C>
where
    T: TaskRepository,
    S: TaskStatusRepository,
    D: DependencyRepository,
    C: Clock + Send + Sync,
{
    /// Creates the handlers over the board and dependency services.
    #[must_use]
    pub const fn new(
        board: Arc<TaskBoardService<T, S, C>>,
        dependencies: Arc<DependencyService<T, D, C>>,
    ) -> Self {
        Self {
            board,
            dependencies,
        }
    }

    /// `POST /tasks/{task}/dependencies`
    ///
    /// # Errors
    ///
    /// Returns `422` for self, duplicate, circular, or cross-project edges
    /// and `404` for unknown tasks.
    pub async fn add_dependency(
        &self,
        task_id: TaskId,
        body: AddDependencyBody,
    ) -> ApiResult<ApiResponse<DependencyCreatedBody>> {
        let request = AddDependencyRequest::new(task_id, body.depends_on_task_id)
            .with_type(body.dependency_type.unwrap_or_default());
        let added = self.dependencies.add_dependency(request).await?;
        Ok(ApiResponse::created(DependencyCreatedBody {
            dependency: added.dependency,
            is_blocked: added.is_blocked,
        }))
    }

    /// `DELETE /tasks/{task}/dependencies/{dependency}`
    ///
    /// # Errors
    ///
    /// Returns `404` when the dependency does not belong to the task.
    pub async fn remove_dependency(
        &self,
        task_id: TaskId,
        dependency_id: DependencyId,
    ) -> ApiResult<ApiResponse<BlockedStateBody>> {
        let is_blocked = self
            .dependencies
            .remove_dependency(task_id, dependency_id)
            .await?;
        Ok(ApiResponse::ok(BlockedStateBody { is_blocked }))
    }

    /// `GET /tasks/{task}/dependencies`
    ///
    /// # Errors
    ///
    /// Returns `404` for unknown tasks.
    pub async fn dependencies(
        &self,
        task_id: TaskId,
    ) -> ApiResult<ApiResponse<DependencyOverviewBody>> {
        let overview = self.dependencies.overview(task_id).await?;
        Ok(ApiResponse::ok(overview.into()))
    }

    /// `PATCH /tasks/{task}/status`
    ///
    /// `sort` is the requested zero-based index in the target column.
    ///
    /// # Errors
    ///
    /// Returns `422` when `task_status_id` is not a status of the task's
    /// project and `404` for unknown tasks.
    pub async fn update_task_status(
        &self,
        task_id: TaskId,
        body: UpdateTaskStatusBody,
    ) -> ApiResult<ApiResponse<TaskBody>> {
        let outcome = self
            .board
            .move_task(MoveTaskRequest::new(task_id, body.task_status_id, body.sort))
            .await?;
        Ok(ApiResponse::ok(TaskBody { task: outcome.task }))
    }

    /// `POST /task-statuses/reorder`
    ///
    /// # Errors
    ///
    /// Returns `422` for foreign or repeated statuses, and for partial lists
    /// when complete lists are required.
    pub async fn reorder_statuses(
        &self,
        project_id: ProjectId,
        body: ReorderStatusesBody,
    ) -> ApiResult<ApiResponse<Acknowledged>> {
        self.board
            .reorder_statuses(project_id, &body.statuses)
            .await?;
        Ok(ApiResponse::ok(Acknowledged::default()))
    }

    /// `DELETE /task-statuses/{status}`
    ///
    /// # Errors
    ///
    /// Returns `422` when the status has tasks or is the default and `404`
    /// for unknown statuses.
    pub async fn delete_status(
        &self,
        status_id: TaskStatusId,
    ) -> ApiResult<ApiResponse<Acknowledged>> {
        self.board.delete_status(status_id).await?;
        Ok(ApiResponse::ok(Acknowledged::default()))
    }
}
