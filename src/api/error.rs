//! API error types and status-code mapping.

use crate::task::{
    domain::TaskDomainError,
    ports::BoardRepositoryError,
    services::{DependencyServiceError, TaskBoardError},
};
use serde::Serialize;
use thiserror::Error;

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// JSON error body returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    /// Stable machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Request field the message refers to, for form validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Transport-agnostic API error with a stable code and HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    status: u16,
    code: &'static str,
    field: Option<&'static str>,
    message: String,
}

impl ApiError {
    fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            field: None,
            message: message.into(),
        }
    }

    /// Returns an error response for missing resources.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, "NOT_FOUND", message)
    }

    /// Returns an error response for identifiers that already exist.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(409, "CONFLICT", message)
    }

    /// Returns a validation error tied to a request field.
    #[must_use]
    pub fn unprocessable(
        code: &'static str,
        field: Option<&'static str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field,
            ..Self::new(422, code, message)
        }
    }

    /// Returns an internal error response. The message is safe for clients;
    /// details are logged, not returned.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(500, "INTERNAL", "internal error")
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Returns the request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// Returns the client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the serialisable body.
    #[must_use]
    pub fn body(&self) -> ApiErrorBody {
        ApiErrorBody {
            code: self.code.to_owned(),
            message: self.message.clone(),
            field: self.field.map(str::to_owned),
        }
    }
}

impl From<TaskDomainError> for ApiError {
    fn from(err: TaskDomainError) -> Self {
        let (code, field) = match &err {
            TaskDomainError::EmptyTaskTitle => ("EMPTY_TASK_TITLE", Some("title")),
            TaskDomainError::InvalidStatusName(_) => ("INVALID_STATUS_NAME", Some("name")),
            TaskDomainError::SelfDependency(_) => ("SELF_DEPENDENCY", Some("depends_on_task_id")),
            TaskDomainError::DuplicateDependency { .. } => {
                ("DUPLICATE_DEPENDENCY", Some("depends_on_task_id"))
            }
            TaskDomainError::CircularDependency { .. } => {
                ("CIRCULAR_DEPENDENCY", Some("depends_on_task_id"))
            }
            TaskDomainError::CrossProjectDependency { .. } => {
                ("CROSS_PROJECT_DEPENDENCY", Some("depends_on_task_id"))
            }
            TaskDomainError::InvalidStatus(_) => ("INVALID_STATUS", Some("task_status_id")),
            TaskDomainError::TaskNotInColumn { .. } => ("TASK_NOT_IN_COLUMN", None),
            TaskDomainError::StatusNotEmpty { .. } => ("STATUS_NOT_EMPTY", Some("status")),
            TaskDomainError::DefaultStatusNotDeletable(_) => {
                ("DEFAULT_STATUS_NOT_DELETABLE", Some("status"))
            }
            TaskDomainError::DuplicateStatusSlug { .. } => ("DUPLICATE_STATUS_SLUG", Some("name")),
            TaskDomainError::DuplicateStatusRank(_) => ("DUPLICATE_STATUS_RANK", Some("statuses")),
            TaskDomainError::IncompleteStatusOrder { .. } => {
                ("INCOMPLETE_STATUS_ORDER", Some("statuses"))
            }
            TaskDomainError::MissingDefaultStatus(_) => {
                ("MISSING_DEFAULT_STATUS", Some("task_status_id"))
            }
            TaskDomainError::SortKeyOverflow(_) => ("SORT_KEY_OVERFLOW", Some("sort")),
        };
        Self::unprocessable(code, field, err.to_string())
    }
}

impl From<BoardRepositoryError> for ApiError {
    fn from(err: BoardRepositoryError) -> Self {
        match err {
            BoardRepositoryError::Rejected(domain) => domain.into(),
            BoardRepositoryError::TaskNotFound(_)
            | BoardRepositoryError::StatusNotFound(_)
            | BoardRepositoryError::DependencyNotFound(_) => Self::not_found(err.to_string()),
            BoardRepositoryError::DuplicateTask(_) | BoardRepositoryError::DuplicateStatus(_) => {
                Self::conflict(err.to_string())
            }
            BoardRepositoryError::Persistence(source) => {
                tracing::error!(error = %source, "task board persistence failure");
                Self::internal()
            }
        }
    }
}

impl From<TaskBoardError> for ApiError {
    fn from(err: TaskBoardError) -> Self {
        match err {
            TaskBoardError::Domain(domain) => domain.into(),
            TaskBoardError::Repository(repository) => repository.into(),
        }
    }
}

impl From<DependencyServiceError> for ApiError {
    fn from(err: DependencyServiceError) -> Self {
        match err {
            DependencyServiceError::Domain(domain) => domain.into(),
            DependencyServiceError::Repository(repository) => repository.into(),
            DependencyServiceError::DependencyNotFound { .. } => Self::not_found(err.to_string()),
        }
    }
}
