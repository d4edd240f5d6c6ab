//! Authoritative mutation port used by the reconciler.

use crate::task::{
    domain::{ProjectId, TaskId, TaskStatusId},
    ordering::{BoardLayout, StatusRank},
    ports::{BoardRepositoryError, TaskRepository, TaskStatusRepository},
    services::{MoveTaskRequest, TaskBoardError, TaskBoardService},
};
use async_trait::async_trait;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// The single mutation a drop commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardMutation {
    /// Move a task to `index` in `status_id`.
    MoveTask {
        /// Task to move.
        task_id: TaskId,
        /// Destination column.
        status_id: TaskStatusId,
        /// Drop-time destination index.
        index: usize,
    },
    /// Apply a complete column order.
    ReorderColumns {
        /// Board owner.
        project_id: ProjectId,
        /// New rank of every column.
        ranks: Vec<StatusRank>,
    },
}

/// Server acknowledgement of a committed mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Board order after the commit, when the server reports it.
    pub authoritative: Option<BoardLayout>,
}

/// Failures reported by a [`BoardGateway`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The server refused the mutation; retrying unchanged will fail again.
    #[error("mutation rejected: {0}")]
    Rejected(String),
    /// The server could not be reached or failed while writing.
    #[error("board service unavailable: {0}")]
    Unavailable(String),
}

/// Sends authoritative board mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardGateway: Send + Sync {
    /// Commits `mutation` and returns the server's receipt.
    async fn commit(&self, mutation: &BoardMutation) -> Result<CommitReceipt, GatewayError>;
}

/// In-process gateway that commits through a [`TaskBoardService`] and
/// reports the resulting board.
pub struct ServiceGateway<T, S, C>
where
    T: TaskRepository,
    S: TaskStatusRepository,
    C: Clock + Send + Sync,
{
    service: Arc<TaskBoardService<T, S, C>>,
}

impl<T, S, C> ServiceGateway<T, S, C>
where
    T: TaskRepository,
    S: TaskStatusRepository,
    C: Clock + Send + Sync,
{
    /// Creates a gateway over `service`.
    #[must_use]
    pub const fn new(service: Arc<TaskBoardService<T, S, C>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<T, S, C> BoardGateway for ServiceGateway<T, S, C>
where
    T: TaskRepository,
    S: TaskStatusRepository,
    C: Clock + Send + Sync,
{
    async fn commit(&self, mutation: &BoardMutation) -> Result<CommitReceipt, GatewayError> {
        let project_id = match mutation {
            BoardMutation::MoveTask {
                task_id,
                status_id,
                index,
            } => {
                let outcome = self
                    .service
                    .move_task(MoveTaskRequest::new(*task_id, *status_id, *index))
                    .await
                    .map_err(gateway_error)?;
                outcome.task.project_id()
            }
            BoardMutation::ReorderColumns { project_id, ranks } => {
                self.service
                    .reorder_statuses(*project_id, ranks)
                    .await
                    .map_err(gateway_error)?;
                *project_id
            }
        };
        let layout = self
            .service
            .board(project_id)
            .await
            .map_err(gateway_error)?;
        Ok(CommitReceipt {
            authoritative: Some(layout),
        })
    }
}

fn gateway_error(err: TaskBoardError) -> GatewayError {
    match err {
        TaskBoardError::Repository(BoardRepositoryError::Persistence(source)) => {
            GatewayError::Unavailable(source.to_string())
        }
        other => GatewayError::Rejected(other.to_string()),
    }
}
