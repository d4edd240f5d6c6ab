//! Request and response bodies for the task board operations.

use crate::task::{
    domain::{DependencyType, Task, TaskDependency, TaskId, TaskStatusId},
    ordering::StatusRank,
    services::DependencyOverview,
};
use serde::{Deserialize, Serialize};

/// Status code and body of a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: T,
}

impl<T> ApiResponse<T> {
    /// Wraps `body` in a `200` response.
    pub const fn ok(body: T) -> Self {
        Self { status: 200, body }
    }

    /// Wraps `body` in a `201` response.
    pub const fn created(body: T) -> Self {
        Self { status: 201, body }
    }
}

/// Body of `POST /tasks/{task}/dependencies`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDependencyBody {
    /// Prerequisite task.
    pub depends_on_task_id: TaskId,
    /// Scheduling relationship; finish-to-start when omitted.
    #[serde(default)]
    pub dependency_type: Option<DependencyType>,
}

/// Response of `POST /tasks/{task}/dependencies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyCreatedBody {
    /// Stored edge.
    pub dependency: TaskDependency,
    /// Blocked state of the dependent task.
    pub is_blocked: bool,
}

/// Response of `DELETE /tasks/{task}/dependencies/{dependency}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedStateBody {
    /// Blocked state of the task after the removal.
    pub is_blocked: bool,
}

/// Response of `GET /tasks/{task}/dependencies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyOverviewBody {
    /// Edges leaving the task.
    pub dependencies: Vec<TaskDependency>,
    /// Tasks that depend on the task.
    pub dependent_tasks: Vec<Task>,
    /// Whether any direct prerequisite is incomplete.
    pub is_blocked: bool,
    /// Incomplete direct prerequisites.
    pub blocking_tasks: Vec<Task>,
}

impl From<DependencyOverview> for DependencyOverviewBody {
    fn from(overview: DependencyOverview) -> Self {
        Self {
            dependencies: overview.dependencies,
            dependent_tasks: overview.dependent_tasks,
            is_blocked: overview.is_blocked,
            blocking_tasks: overview.blocking_tasks,
        }
    }
}

/// Body of `PATCH /tasks/{task}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskStatusBody {
    /// Destination column.
    pub task_status_id: TaskStatusId,
    /// Zero-based destination index.
    pub sort: usize,
}

/// Response carrying a single task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBody {
    /// Task after the operation.
    pub task: Task,
}

/// Body of `POST /task-statuses/reorder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderStatusesBody {
    /// Proposed rank of each column.
    pub statuses: Vec<StatusRank>,
}

/// Empty acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledged {
    /// Always `true`.
    pub success: bool,
}

impl Default for Acknowledged {
    fn default() -> Self {
        Self { success: true }
    }
}
