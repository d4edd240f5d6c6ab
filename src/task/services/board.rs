//! Service layer for columns, task placement, and task lifecycle.

use super::{BoardConfig, TaskListFilter};
use crate::task::{
    domain::{
        NewTaskStatus, ProjectId, Task, TaskDomainError, TaskId, TaskStatus, TaskStatusId,
    },
    ordering::{BoardLayout, ColumnSequence, ColumnSequencer, StatusRank},
    ports::{
        BoardRepositoryError, MoveOutcome, MoveTaskCommand, TaskRepository, TaskStatusRepository,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for creating a board column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStatusRequest {
    project_id: ProjectId,
    name: String,
    is_completed: bool,
    is_default: bool,
}

impl CreateStatusRequest {
    /// Creates a request for an open, non-default column.
    #[must_use]
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            project_id,
            name: name.into(),
            is_completed: false,
            is_default: false,
        }
    }

    /// Marks the column as completing tasks that enter it.
    #[must_use]
    pub const fn completed(mut self) -> Self {
        self.is_completed = true;
        self
    }

    /// Makes the column the project default.
    #[must_use]
    pub const fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    project_id: ProjectId,
    title: String,
    status_id: Option<TaskStatusId>,
}

impl CreateTaskRequest {
    /// Creates a request that places the task in the project's default
    /// column.
    #[must_use]
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            status_id: None,
        }
    }

    /// Places the task in `status_id` instead of the default column.
    #[must_use]
    pub const fn in_status(mut self, status_id: TaskStatusId) -> Self {
        self.status_id = Some(status_id);
        self
    }
}

/// Request payload for moving a task to a position on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTaskRequest {
    /// Task to move.
    pub task_id: TaskId,
    /// Destination column.
    pub status_id: TaskStatusId,
    /// Zero-based destination index; clamped to the column length.
    pub index: usize,
}

impl MoveTaskRequest {
    /// Creates a move request.
    #[must_use]
    pub const fn new(task_id: TaskId, status_id: TaskStatusId, index: usize) -> Self {
        Self {
            task_id,
            status_id,
            index,
        }
    }
}

/// Service-level errors for board operations.
#[derive(Debug, Error)]
pub enum TaskBoardError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] BoardRepositoryError),
}

/// Result type for board service operations.
pub type TaskBoardResult<T> = Result<T, TaskBoardError>;

/// Board orchestration service.
#[derive(Clone)]
pub struct TaskBoardService<T, S, C>
where
    T: TaskRepository,
    S: TaskStatusRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    statuses: Arc<S>,
    clock: Arc<C>,
    config: BoardConfig,
}

impl<T, S, C> TaskBoardService<T, S, C>
where
    T: TaskRepository,
    S: TaskStatusRepository,
    C: Clock + Send + Sync,
{
    /// Creates a board service with the default configuration.
    #[must_use]
    pub fn new(tasks: Arc<T>, statuses: Arc<S>, clock: Arc<C>) -> Self {
        Self::with_config(tasks, statuses, clock, BoardConfig::default())
    }

    /// Creates a board service with an explicit configuration.
    #[must_use]
    pub const fn with_config(
        tasks: Arc<T>,
        statuses: Arc<S>,
        clock: Arc<C>,
        config: BoardConfig,
    ) -> Self {
        Self {
            tasks,
            statuses,
            clock,
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Appends a column to the end of the project's board.
    ///
    /// The first column of a project always becomes its default.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError`] when the name is invalid, the slug is taken,
    /// or persistence fails.
    pub async fn create_status(&self, request: CreateStatusRequest) -> TaskBoardResult<TaskStatus> {
        let existing = self.statuses.list_by_project(request.project_id).await?;
        let status = TaskStatus::new(NewTaskStatus {
            project_id: request.project_id,
            name: request.name,
            sort: ColumnSequencer::next_sort(&existing)?,
            is_default: request.is_default || existing.is_empty(),
            is_completed: request.is_completed,
        })?;
        self.statuses.store(&status).await?;
        info!(
            status_id = %status.id(),
            project_id = %status.project_id(),
            slug = status.slug(),
            "created task status"
        );
        Ok(status)
    }

    /// Makes `status_id` the project default, clearing the flag elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Repository`] when the status does not exist
    /// or persistence fails.
    pub async fn set_default_status(&self, status_id: TaskStatusId) -> TaskBoardResult<TaskStatus> {
        let mut status = self.require_status(status_id).await?;
        if !status.is_default() {
            status.set_default(true);
            self.statuses.update(&status).await?;
            info!(%status_id, project_id = %status.project_id(), "changed default task status");
        }
        Ok(status)
    }

    /// Returns the project's columns in board order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Repository`] when persistence fails.
    pub async fn list_statuses(&self, project_id: ProjectId) -> TaskBoardResult<Vec<TaskStatus>> {
        Ok(self.statuses.list_by_project(project_id).await?)
    }

    /// Applies client-proposed column ranks and returns the new board order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError`] when a rank names a foreign or repeated
    /// status, or omits statuses while complete lists are required.
    pub async fn reorder_statuses(
        &self,
        project_id: ProjectId,
        ranks: &[StatusRank],
    ) -> TaskBoardResult<Vec<TaskStatus>> {
        let result = self
            .statuses
            .reorder(
                project_id,
                ranks,
                self.config.require_complete_status_reorder,
            )
            .await;
        match result {
            Ok(statuses) => {
                info!(%project_id, ranks = ranks.len(), "reordered task statuses");
                Ok(statuses)
            }
            Err(err) => {
                warn!(%project_id, error = %err, "rejected task status reorder");
                Err(err.into())
            }
        }
    }

    /// Deletes an empty, non-default column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Repository`] carrying
    /// [`TaskDomainError::StatusNotEmpty`] or
    /// [`TaskDomainError::DefaultStatusNotDeletable`] when the column is
    /// protected.
    pub async fn delete_status(&self, status_id: TaskStatusId) -> TaskBoardResult<()> {
        if let Err(err) = self.statuses.delete(status_id).await {
            warn!(%status_id, error = %err, "rejected task status deletion");
            return Err(err.into());
        }
        info!(%status_id, "deleted task status");
        Ok(())
    }

    /// Creates a task at the end of its column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError`] when the title is blank, the status belongs
    /// to another project, the project has no default status, or
    /// persistence fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskBoardResult<Task> {
        let status = match request.status_id {
            Some(status_id) => self
                .statuses
                .find_by_id(status_id)
                .await?
                .filter(|status| status.project_id() == request.project_id)
                .ok_or(TaskDomainError::InvalidStatus(status_id))?,
            None => self.default_status(request.project_id).await?,
        };
        let sort = self.tasks.next_sort(status.id()).await?;
        let task = Task::new(&status, request.title, sort, &*self.clock)?;
        self.tasks.store(&task).await?;
        info!(
            task_id = %task.id(),
            status_id = %status.id(),
            sort = task.sort().value(),
            "created task"
        );
        Ok(task)
    }

    /// Moves a task to `index` within the target column and re-sequences
    /// both affected columns atomically.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Repository`] when the task is missing, the
    /// target status is invalid for the task's project, or persistence
    /// fails. No partial state is written.
    pub async fn move_task(&self, request: MoveTaskRequest) -> TaskBoardResult<MoveOutcome> {
        let command = MoveTaskCommand {
            task_id: request.task_id,
            target_status_id: request.status_id,
            target_index: request.index,
            policy: self.config.completion_policy(),
            moved_at: self.clock.utc(),
        };
        match self.tasks.move_task(command).await {
            Ok(outcome) => {
                info!(
                    task_id = %request.task_id,
                    status_id = %request.status_id,
                    index = request.index,
                    sort = outcome.task.sort().value(),
                    "moved task"
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(task_id = %request.task_id, error = %err, "rejected task move");
                Err(err.into())
            }
        }
    }

    /// Marks a task completed without moving it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Repository`] when the task does not exist or
    /// persistence fails.
    pub async fn complete_task(&self, task_id: TaskId) -> TaskBoardResult<Task> {
        let mut task = self.require_task(task_id).await?;
        if task.complete(&*self.clock) {
            self.tasks.update(&task).await?;
            info!(%task_id, "completed task");
        }
        Ok(task)
    }

    /// Clears the completion timestamp of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Repository`] when the task does not exist or
    /// persistence fails.
    pub async fn reopen_task(&self, task_id: TaskId) -> TaskBoardResult<Task> {
        let mut task = self.require_task(task_id).await?;
        if task.reopen(&*self.clock) {
            self.tasks.update(&task).await?;
            info!(%task_id, "reopened task");
        }
        Ok(task)
    }

    /// Soft-deletes a task, closing the gap in its column and dropping its
    /// dependency edges.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Repository`] when the task does not exist or
    /// persistence fails.
    pub async fn delete_task(&self, task_id: TaskId) -> TaskBoardResult<Task> {
        let task = self.tasks.soft_delete(task_id, self.clock.utc()).await?;
        info!(%task_id, status_id = %task.status_id(), "deleted task");
        Ok(task)
    }

    /// Finds an active task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Repository`] when persistence fails.
    pub async fn find_task(&self, task_id: TaskId) -> TaskBoardResult<Option<Task>> {
        Ok(self.tasks.find_by_id(task_id).await?)
    }

    /// Lists the active tasks of a project.
    ///
    /// A status filter reads only that column; a status of another project
    /// lists nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Repository`] when persistence fails.
    pub async fn list_tasks(
        &self,
        project_id: ProjectId,
        filter: &TaskListFilter,
    ) -> TaskBoardResult<Vec<Task>> {
        let statuses = self.statuses.list_by_project(project_id).await?;
        let tasks = match filter.status_id {
            Some(status_id) if statuses.iter().any(|status| status.id() == status_id) => {
                self.tasks.list_by_status(status_id).await?
            }
            Some(_) => Vec::new(),
            None => self.tasks.list_by_project(project_id).await?,
        };
        let listed = filter.apply(tasks, &statuses);
        debug!(%project_id, count = listed.len(), "listed tasks");
        Ok(listed)
    }

    /// Returns the authoritative board: ordered columns of ordered task ids.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Repository`] when persistence fails.
    pub async fn board(&self, project_id: ProjectId) -> TaskBoardResult<BoardLayout> {
        let statuses = self.statuses.list_by_project(project_id).await?;
        let tasks = self.tasks.list_by_project(project_id).await?;
        let columns = statuses
            .iter()
            .map(|status| ColumnSequence::from_tasks(status.id(), &tasks))
            .collect();
        Ok(BoardLayout::new(columns))
    }

    async fn require_task(&self, task_id: TaskId) -> TaskBoardResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| BoardRepositoryError::TaskNotFound(task_id).into())
    }

    async fn require_status(&self, status_id: TaskStatusId) -> TaskBoardResult<TaskStatus> {
        self.statuses
            .find_by_id(status_id)
            .await?
            .ok_or_else(|| BoardRepositoryError::StatusNotFound(status_id).into())
    }

    async fn default_status(&self, project_id: ProjectId) -> TaskBoardResult<TaskStatus> {
        self.statuses
            .list_by_project(project_id)
            .await?
            .into_iter()
            .find(TaskStatus::is_default)
            .ok_or_else(|| TaskDomainError::MissingDefaultStatus(project_id).into())
    }
}
