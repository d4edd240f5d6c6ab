//! Error types for task board validation and parsing.

use super::{ProjectId, TaskId, TaskStatusId};
use thiserror::Error;

/// Errors returned while validating task board values and mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The status name is empty or produces an empty slug.
    #[error("invalid status name '{0}'")]
    InvalidStatusName(String),

    /// A task was asked to depend on itself.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// The dependency edge already exists.
    #[error("task {task_id} already depends on task {depends_on_task_id}")]
    DuplicateDependency {
        /// Dependent task.
        task_id: TaskId,
        /// Prerequisite task.
        depends_on_task_id: TaskId,
    },

    /// The dependency edge would close a cycle.
    #[error(
        "task {task_id} cannot depend on task {depends_on_task_id}: \
         {depends_on_task_id} already depends on {task_id}"
    )]
    CircularDependency {
        /// Dependent task.
        task_id: TaskId,
        /// Prerequisite task.
        depends_on_task_id: TaskId,
    },

    /// The dependency endpoints belong to different projects.
    #[error("tasks {task_id} and {depends_on_task_id} belong to different projects")]
    CrossProjectDependency {
        /// Dependent task.
        task_id: TaskId,
        /// Prerequisite task.
        depends_on_task_id: TaskId,
    },

    /// The target status does not exist or belongs to another project.
    #[error("invalid task status {0}")]
    InvalidStatus(TaskStatusId),

    /// The task is not part of the column it was expected in.
    #[error("task {task_id} is not in column {status_id}")]
    TaskNotInColumn {
        /// Task being moved.
        task_id: TaskId,
        /// Column searched.
        status_id: TaskStatusId,
    },

    /// The status still holds tasks.
    #[error("status {status_id} still contains {task_count} task(s)")]
    StatusNotEmpty {
        /// Status targeted for deletion.
        status_id: TaskStatusId,
        /// Number of active tasks in the status.
        task_count: usize,
    },

    /// The default status of a project cannot be deleted.
    #[error("status {0} is the project default and cannot be deleted")]
    DefaultStatusNotDeletable(TaskStatusId),

    /// A status with the same slug already exists in the project.
    #[error("project {project_id} already has a status with slug '{slug}'")]
    DuplicateStatusSlug {
        /// Owning project.
        project_id: ProjectId,
        /// Conflicting slug.
        slug: String,
    },

    /// A status appears more than once in a reorder request.
    #[error("status {0} appears more than once in the requested order")]
    DuplicateStatusRank(TaskStatusId),

    /// A reorder request omitted statuses while completeness is enforced.
    #[error("status order omits {} status(es) of the project", missing.len())]
    IncompleteStatusOrder {
        /// Statuses absent from the request.
        missing: Vec<TaskStatusId>,
    },

    /// The project has no default status to place new tasks into.
    #[error("project {0} has no default status")]
    MissingDefaultStatus(ProjectId),

    /// A position cannot be represented as a persisted sort key.
    #[error("position {0} exceeds the maximum sort key")]
    SortKeyOverflow(usize),
}

/// Error returned while parsing dependency types from persistence or input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown dependency type: {0}")]
pub struct ParseDependencyTypeError(pub String);
