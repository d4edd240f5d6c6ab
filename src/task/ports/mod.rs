//! Port contracts for task ordering and dependencies.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.
//! Every mutating operation is one atomic unit in the adapter: a database
//! transaction, or a single write lock for the in-memory store.

mod dependency;
pub mod repository;
mod status;

pub use dependency::DependencyRepository;
pub use repository::{
    BoardRepositoryError, BoardRepositoryResult, MoveOutcome, MoveTaskCommand, TaskRepository,
};
pub use status::TaskStatusRepository;
