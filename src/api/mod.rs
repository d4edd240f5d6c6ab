//! Transport-agnostic surface for the task board operations.
//!
//! Bodies serialise with `serde`; [`ApiError`] carries the HTTP status and a
//! field-level message for validation failures.

mod dto;
mod error;
mod handlers;

pub use dto::{
    Acknowledged, AddDependencyBody, ApiResponse, BlockedStateBody, DependencyCreatedBody,
    DependencyOverviewBody, ReorderStatusesBody, TaskBody, UpdateTaskStatusBody,
};
pub use error::{ApiError, ApiErrorBody, ApiResult};
pub use handlers::TaskBoardApi;
