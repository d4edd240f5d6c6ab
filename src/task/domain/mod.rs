//! Domain model for task ordering and dependencies.
//!
//! Tasks sit in ordered columns ([`TaskStatus`]) and may depend on other
//! tasks in the same project. All infrastructure concerns stay outside of
//! the domain boundary.

mod dependency;
mod error;
mod ids;
mod status;
mod task;

pub use dependency::{DependencyType, PersistedDependencyData, TaskDependency};
pub use error::{ParseDependencyTypeError, TaskDomainError};
pub use ids::{DependencyId, ProjectId, SortKey, TaskId, TaskStatusId};
pub use status::{NewTaskStatus, PersistedTaskStatusData, TaskStatus, slugify};
pub use task::{CompletionPolicy, PersistedTaskData, Task};
