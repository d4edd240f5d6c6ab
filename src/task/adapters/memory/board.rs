//! In-memory task board store for tests and single-process use.
//!
//! One value implements every task board port. Each mutation runs under a
//! single write lock and computes its full result before writing, so callers
//! never observe partial state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        DependencyId, PersistedTaskData, ProjectId, SortKey, Task, TaskDependency,
        TaskDomainError, TaskId, TaskStatus, TaskStatusId,
    },
    graph::DependencyGraph,
    ordering::{ColumnSequence, ColumnSequencer, OrderingEngine, StatusRank},
    ports::{
        BoardRepositoryError, BoardRepositoryResult, DependencyRepository, MoveOutcome,
        MoveTaskCommand, TaskRepository, TaskStatusRepository,
    },
};

/// Thread-safe in-memory task board repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskBoard {
    state: Arc<RwLock<InMemoryBoardState>>,
}

#[derive(Debug, Default)]
struct InMemoryBoardState {
    tasks: HashMap<TaskId, Task>,
    statuses: HashMap<TaskStatusId, TaskStatus>,
    dependencies: Vec<TaskDependency>,
}

impl InMemoryTaskBoard {
    /// Creates an empty in-memory board store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> BoardRepositoryResult<RwLockReadGuard<'_, InMemoryBoardState>> {
        self.state.read().map_err(|err| {
            BoardRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> BoardRepositoryResult<RwLockWriteGuard<'_, InMemoryBoardState>> {
        self.state.write().map_err(|err| {
            BoardRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryBoardState {
    fn active_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id).filter(|task| task.is_active())
    }

    fn column(&self, status_id: TaskStatusId) -> ColumnSequence {
        ColumnSequence::from_tasks(status_id, self.tasks.values())
    }

    fn project_statuses(&self, project_id: ProjectId) -> Vec<TaskStatus> {
        let mut statuses: Vec<TaskStatus> = self
            .statuses
            .values()
            .filter(|status| status.project_id() == project_id)
            .cloned()
            .collect();
        ColumnSequencer::sort_columns(&mut statuses);
        statuses
    }

    fn in_project(&self, task_id: TaskId, project_id: ProjectId) -> bool {
        self.active_task(task_id)
            .is_some_and(|task| task.project_id() == project_id)
    }

    fn project_graph(&self, project_id: ProjectId) -> DependencyGraph {
        DependencyGraph::from_edges(
            self.dependencies
                .iter()
                .filter(|edge| {
                    self.in_project(edge.task_id(), project_id)
                        && self.in_project(edge.depends_on_task_id(), project_id)
                })
                .cloned(),
        )
    }

    fn apply_sorts(&mut self, column: &ColumnSequence) -> Result<(), TaskDomainError> {
        for assignment in column.assignments()? {
            if let Some(task) = self.tasks.get_mut(&assignment.task_id) {
                task.set_sort(assignment.sort);
            }
        }
        Ok(())
    }

    fn ensure_unique_slug(&self, status: &TaskStatus) -> Result<(), TaskDomainError> {
        let taken = self.statuses.values().any(|existing| {
            existing.id() != status.id()
                && existing.project_id() == status.project_id()
                && existing.slug() == status.slug()
        });
        if taken {
            return Err(TaskDomainError::DuplicateStatusSlug {
                project_id: status.project_id(),
                slug: status.slug().to_owned(),
            });
        }
        Ok(())
    }

    fn write_status(&mut self, status: &TaskStatus) {
        if status.is_default() {
            for other in self.statuses.values_mut() {
                if other.project_id() == status.project_id() && other.id() != status.id() {
                    other.set_default(false);
                }
            }
        }
        self.statuses.insert(status.id(), status.clone());
    }
}

/// Applies content changes from `task` onto the stored row, keeping column
/// membership and deletion state owned by the store.
fn merge_content(stored: &Task, task: &Task) -> Task {
    Task::from_persisted(PersistedTaskData {
        id: stored.id(),
        project_id: stored.project_id(),
        status_id: stored.status_id(),
        title: task.title().to_owned(),
        sort: stored.sort(),
        completed_at: task.completed_at(),
        deleted_at: stored.deleted_at(),
        created_at: stored.created_at(),
        updated_at: task.updated_at(),
    })
}

#[async_trait]
impl TaskRepository for InMemoryTaskBoard {
    async fn store(&self, task: &Task) -> BoardRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(BoardRepositoryError::DuplicateTask(task.id()));
        }
        if !state.statuses.contains_key(&task.status_id()) {
            return Err(BoardRepositoryError::StatusNotFound(task.status_id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> BoardRepositoryResult<()> {
        let mut state = self.write()?;
        let stored = state
            .active_task(task.id())
            .ok_or(BoardRepositoryError::TaskNotFound(task.id()))?;
        let merged = merge_content(stored, task);
        state.tasks.insert(merged.id(), merged);
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        let state = self.read()?;
        Ok(state.active_task(id).cloned())
    }

    async fn find_many(&self, ids: &[TaskId]) -> BoardRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.active_task(*id).cloned())
            .collect())
    }

    async fn list_by_project(&self, project_id: ProjectId) -> BoardRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.is_active() && task.project_id() == project_id)
            .cloned()
            .collect())
    }

    async fn list_by_status(&self, status_id: TaskStatusId) -> BoardRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let column = state.column(status_id);
        Ok(column
            .task_ids()
            .iter()
            .filter_map(|id| state.active_task(*id).cloned())
            .collect())
    }

    async fn next_sort(&self, status_id: TaskStatusId) -> BoardRepositoryResult<SortKey> {
        let state = self.read()?;
        Ok(OrderingEngine::next_sort(status_id, state.tasks.values())?)
    }

    async fn move_task(&self, command: MoveTaskCommand) -> BoardRepositoryResult<MoveOutcome> {
        let mut state = self.write()?;
        let task = state
            .active_task(command.task_id)
            .cloned()
            .ok_or(BoardRepositoryError::TaskNotFound(command.task_id))?;
        let target = state
            .statuses
            .get(&command.target_status_id)
            .filter(|status| status.project_id() == task.project_id())
            .cloned()
            .ok_or(TaskDomainError::InvalidStatus(command.target_status_id))?;
        let source = state
            .statuses
            .get(&task.status_id())
            .cloned()
            .ok_or(BoardRepositoryError::StatusNotFound(task.status_id()))?;

        let destination =
            (target.id() != source.id()).then(|| state.column(target.id()));
        let plan = OrderingEngine::plan_move(
            state.column(source.id()),
            destination,
            task.id(),
            command.target_index,
        )?;
        let mut moved = task;
        moved.place(
            &source,
            &target,
            plan.target_sort()?,
            command.policy,
            command.moved_at,
        )?;
        // Validate every key before the first write.
        plan.assignments()?;

        let (source_column, destination_column) = plan.into_columns();
        state.apply_sorts(&source_column)?;
        if let Some(column) = &destination_column {
            state.apply_sorts(column)?;
        }
        state.tasks.insert(moved.id(), moved.clone());

        let target_column = destination_column.unwrap_or_else(|| source_column.clone());
        Ok(MoveOutcome {
            task: moved,
            source: source_column,
            target: target_column,
        })
    }

    async fn soft_delete(
        &self,
        id: TaskId,
        deleted_at: DateTime<Utc>,
    ) -> BoardRepositoryResult<Task> {
        let mut state = self.write()?;
        let mut task = state
            .active_task(id)
            .cloned()
            .ok_or(BoardRepositoryError::TaskNotFound(id))?;
        task.soft_delete(deleted_at);
        state.tasks.insert(id, task.clone());

        let column = state.column(task.status_id());
        state.apply_sorts(&column)?;
        state.dependencies.retain(|edge| !edge.touches(id));
        Ok(task)
    }
}

#[async_trait]
impl TaskStatusRepository for InMemoryTaskBoard {
    async fn store(&self, status: &TaskStatus) -> BoardRepositoryResult<()> {
        let mut state = self.write()?;
        if state.statuses.contains_key(&status.id()) {
            return Err(BoardRepositoryError::DuplicateStatus(status.id()));
        }
        state.ensure_unique_slug(status)?;
        state.write_status(status);
        Ok(())
    }

    async fn update(&self, status: &TaskStatus) -> BoardRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.statuses.contains_key(&status.id()) {
            return Err(BoardRepositoryError::StatusNotFound(status.id()));
        }
        state.ensure_unique_slug(status)?;
        state.write_status(status);
        Ok(())
    }

    async fn find_by_id(&self, id: TaskStatusId) -> BoardRepositoryResult<Option<TaskStatus>> {
        let state = self.read()?;
        Ok(state.statuses.get(&id).cloned())
    }

    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> BoardRepositoryResult<Vec<TaskStatus>> {
        let state = self.read()?;
        Ok(state.project_statuses(project_id))
    }

    async fn reorder(
        &self,
        project_id: ProjectId,
        ranks: &[StatusRank],
        require_complete: bool,
    ) -> BoardRepositoryResult<Vec<TaskStatus>> {
        let mut state = self.write()?;
        let mut statuses = state.project_statuses(project_id);
        ColumnSequencer::new(require_complete).apply(&mut statuses, ranks)?;
        for status in &statuses {
            state.statuses.insert(status.id(), status.clone());
        }
        ColumnSequencer::sort_columns(&mut statuses);
        Ok(statuses)
    }

    async fn delete(&self, id: TaskStatusId) -> BoardRepositoryResult<()> {
        let mut state = self.write()?;
        let status = state
            .statuses
            .get(&id)
            .ok_or(BoardRepositoryError::StatusNotFound(id))?;
        let task_count = state.column(id).len();
        status.ensure_deletable(task_count)?;
        state.statuses.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl DependencyRepository for InMemoryTaskBoard {
    async fn add(&self, dependency: &TaskDependency) -> BoardRepositoryResult<()> {
        let mut state = self.write()?;
        let task_id = dependency.task_id();
        let depends_on_task_id = dependency.depends_on_task_id();
        let project_id = state
            .active_task(task_id)
            .map(Task::project_id)
            .ok_or(BoardRepositoryError::TaskNotFound(task_id))?;
        let prerequisite_project = state
            .active_task(depends_on_task_id)
            .map(Task::project_id)
            .ok_or(BoardRepositoryError::TaskNotFound(depends_on_task_id))?;
        if project_id != prerequisite_project {
            return Err(TaskDomainError::CrossProjectDependency {
                task_id,
                depends_on_task_id,
            }
            .into());
        }

        let mut graph = state.project_graph(project_id);
        graph.add_edge(dependency.clone())?;
        state.dependencies.push(dependency.clone());
        Ok(())
    }

    async fn remove(
        &self,
        task_id: TaskId,
        depends_on_task_id: TaskId,
    ) -> BoardRepositoryResult<bool> {
        let mut state = self.write()?;
        let before = state.dependencies.len();
        state.dependencies.retain(|edge| {
            edge.task_id() != task_id || edge.depends_on_task_id() != depends_on_task_id
        });
        Ok(state.dependencies.len() != before)
    }

    async fn find_by_id(&self, id: DependencyId) -> BoardRepositoryResult<Option<TaskDependency>> {
        let state = self.read()?;
        Ok(state
            .dependencies
            .iter()
            .find(|edge| edge.id() == id)
            .cloned())
    }

    async fn dependencies_of(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<TaskDependency>> {
        let state = self.read()?;
        Ok(state
            .dependencies
            .iter()
            .filter(|edge| edge.task_id() == task_id)
            .cloned()
            .collect())
    }

    async fn dependents_of(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<TaskDependency>> {
        let state = self.read()?;
        Ok(state
            .dependencies
            .iter()
            .filter(|edge| edge.depends_on_task_id() == task_id)
            .cloned()
            .collect())
    }

    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> BoardRepositoryResult<Vec<TaskDependency>> {
        let state = self.read()?;
        Ok(state
            .dependencies
            .iter()
            .filter(|edge| {
                state.in_project(edge.task_id(), project_id)
                    && state.in_project(edge.depends_on_task_id(), project_id)
            })
            .cloned()
            .collect())
    }
}
