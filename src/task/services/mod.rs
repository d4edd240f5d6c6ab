//! Application services for board ordering and dependency orchestration.

mod board;
mod config;
mod dependency;

pub use board::{
    CreateStatusRequest, CreateTaskRequest, MoveTaskRequest, TaskBoardError, TaskBoardResult,
    TaskBoardService,
};
pub use config::{BoardConfig, TaskListFilter, TaskListOrder};
pub use dependency::{
    AddDependencyRequest, DependencyAdded, DependencyOverview, DependencyService,
    DependencyServiceError, DependencyServiceResult,
};
