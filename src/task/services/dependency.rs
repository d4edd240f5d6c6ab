//! Service layer for dependency edges and blocked-state queries.

use crate::task::{
    domain::{DependencyId, DependencyType, Task, TaskDependency, TaskDomainError, TaskId},
    graph::{BlockingEvaluator, DependencyGraph},
    ports::{BoardRepositoryError, DependencyRepository, TaskRepository},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Request payload for adding a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddDependencyRequest {
    task_id: TaskId,
    depends_on_task_id: TaskId,
    dependency_type: DependencyType,
}

impl AddDependencyRequest {
    /// Creates a finish-to-start dependency request.
    #[must_use]
    pub fn new(task_id: TaskId, depends_on_task_id: TaskId) -> Self {
        Self {
            task_id,
            depends_on_task_id,
            dependency_type: DependencyType::default(),
        }
    }

    /// Sets the scheduling relationship.
    #[must_use]
    pub const fn with_type(mut self, dependency_type: DependencyType) -> Self {
        self.dependency_type = dependency_type;
        self
    }
}

/// Result of adding a dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyAdded {
    /// Stored edge.
    pub dependency: TaskDependency,
    /// Blocked state of the dependent task after the edge was added.
    pub is_blocked: bool,
}

/// Dependency view of a single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyOverview {
    /// Edges leaving the task.
    pub dependencies: Vec<TaskDependency>,
    /// Active tasks that depend on the task.
    pub dependent_tasks: Vec<Task>,
    /// Whether any direct prerequisite is incomplete.
    pub is_blocked: bool,
    /// Incomplete direct prerequisites, in edge order.
    pub blocking_tasks: Vec<Task>,
}

/// Service-level errors for dependency operations.
#[derive(Debug, Error)]
pub enum DependencyServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] BoardRepositoryError),
    /// The dependency does not exist or does not leave the given task.
    #[error("dependency {dependency_id} does not belong to task {task_id}")]
    DependencyNotFound {
        /// Task named by the caller.
        task_id: TaskId,
        /// Dependency named by the caller.
        dependency_id: DependencyId,
    },
}

/// Result type for dependency service operations.
pub type DependencyServiceResult<T> = Result<T, DependencyServiceError>;

/// Dependency orchestration service.
#[derive(Clone)]
pub struct DependencyService<T, D, C>
where
    T: TaskRepository,
    D: DependencyRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    dependencies: Arc<D>,
    clock: Arc<C>,
}

impl<T, D, C> DependencyService<T, D, C>
where
    T: TaskRepository,
    D: DependencyRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new dependency service.
    #[must_use]
    pub const fn new(tasks: Arc<T>, dependencies: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            dependencies,
            clock,
        }
    }

    /// Adds `task_id -> depends_on_task_id` after self, duplicate, and cycle
    /// checks, and reports the dependent's new blocked state.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyServiceError::Repository`] carrying the rejected
    /// [`TaskDomainError`] or a missing endpoint. The edge set is unchanged on
    /// error.
    pub async fn add_dependency(
        &self,
        request: AddDependencyRequest,
    ) -> DependencyServiceResult<DependencyAdded> {
        let dependency = TaskDependency::new(
            request.task_id,
            request.depends_on_task_id,
            request.dependency_type,
            &*self.clock,
        );
        if let Err(err) = self.dependencies.add(&dependency).await {
            warn!(
                task_id = %request.task_id,
                depends_on_task_id = %request.depends_on_task_id,
                error = %err,
                "rejected dependency"
            );
            return Err(err.into());
        }
        info!(
            dependency_id = %dependency.id(),
            task_id = %request.task_id,
            depends_on_task_id = %request.depends_on_task_id,
            dependency_type = dependency.dependency_type().as_str(),
            "added dependency"
        );
        let is_blocked = self.is_blocked(request.task_id).await?;
        Ok(DependencyAdded {
            dependency,
            is_blocked,
        })
    }

    /// Removes a dependency owned by `task_id` and reports the task's new
    /// blocked state.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyServiceError::DependencyNotFound`] when the edge is
    /// missing or leaves a different task.
    pub async fn remove_dependency(
        &self,
        task_id: TaskId,
        dependency_id: DependencyId,
    ) -> DependencyServiceResult<bool> {
        let not_found = DependencyServiceError::DependencyNotFound {
            task_id,
            dependency_id,
        };
        let Some(dependency) = self.dependencies.find_by_id(dependency_id).await? else {
            return Err(not_found);
        };
        if dependency.task_id() != task_id {
            return Err(not_found);
        }
        let removed = self
            .dependencies
            .remove(task_id, dependency.depends_on_task_id())
            .await?;
        if removed {
            info!(%dependency_id, %task_id, "removed dependency");
        }
        self.is_blocked(task_id).await
    }

    /// Returns whether any direct prerequisite of `task_id` is incomplete.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyServiceError::Repository`] when persistence fails.
    pub async fn is_blocked(&self, task_id: TaskId) -> DependencyServiceResult<bool> {
        let (graph, prerequisites) = self.direct_prerequisites(task_id).await?;
        let is_blocked =
            BlockingEvaluator::new(&graph).is_blocked(task_id, prerequisites.as_slice());
        debug!(%task_id, is_blocked, "evaluated blocked state");
        Ok(is_blocked)
    }

    /// Returns the incomplete direct prerequisites of `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyServiceError::Repository`] when persistence fails.
    pub async fn blocking_tasks(&self, task_id: TaskId) -> DependencyServiceResult<Vec<Task>> {
        let (graph, prerequisites) = self.direct_prerequisites(task_id).await?;
        let blocking = BlockingEvaluator::new(&graph)
            .blocking_tasks_of(task_id, prerequisites.as_slice())
            .into_iter()
            .filter_map(|id| prerequisites.iter().find(|task| task.id() == id).cloned())
            .collect();
        Ok(blocking)
    }

    /// Returns the dependency view of an active task.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyServiceError::Repository`] when the task does not
    /// exist or persistence fails.
    pub async fn overview(&self, task_id: TaskId) -> DependencyServiceResult<DependencyOverview> {
        self.require_task(task_id).await?;
        let dependencies = self.dependencies.dependencies_of(task_id).await?;
        let dependent_ids: Vec<TaskId> = self
            .dependencies
            .dependents_of(task_id)
            .await?
            .iter()
            .map(TaskDependency::task_id)
            .collect();
        let dependent_tasks = ordered(&self.tasks.find_many(&dependent_ids).await?, &dependent_ids);
        let blocking_tasks = self.blocking_tasks(task_id).await?;

        Ok(DependencyOverview {
            dependencies,
            dependent_tasks,
            is_blocked: !blocking_tasks.is_empty(),
            blocking_tasks,
        })
    }

    /// Returns every edge transitively reachable from `task_id`, nearest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyServiceError::Repository`] when the task does not
    /// exist or persistence fails.
    pub async fn chain(&self, task_id: TaskId) -> DependencyServiceResult<Vec<TaskDependency>> {
        let task = self.require_task(task_id).await?;
        let graph =
            DependencyGraph::from_edges(self.dependencies.list_by_project(task.project_id()).await?);
        Ok(graph.chain_from(task_id).into_iter().cloned().collect())
    }

    async fn require_task(&self, task_id: TaskId) -> DependencyServiceResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| BoardRepositoryError::TaskNotFound(task_id).into())
    }

    async fn direct_prerequisites(
        &self,
        task_id: TaskId,
    ) -> DependencyServiceResult<(DependencyGraph, Vec<Task>)> {
        let edges = self.dependencies.dependencies_of(task_id).await?;
        let prerequisite_ids: Vec<TaskId> =
            edges.iter().map(TaskDependency::depends_on_task_id).collect();
        let prerequisites = self.tasks.find_many(&prerequisite_ids).await?;
        Ok((DependencyGraph::from_edges(edges), prerequisites))
    }
}

/// Orders `tasks` to follow `ids`, dropping ids without a task.
fn ordered(tasks: &[Task], ids: &[TaskId]) -> Vec<Task> {
    ids.iter()
        .filter_map(|id| tasks.iter().find(|task| task.id() == *id).cloned())
        .collect()
}
