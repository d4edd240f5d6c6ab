//! Shared test helpers for in-memory task board integration tests.

use std::sync::Arc;

use eyre::WrapErr;
use mockable::DefaultClock;
use rstest::fixture;
use trellis::{
    api::TaskBoardApi,
    task::{
        adapters::memory::InMemoryTaskBoard,
        domain::{ProjectId, SortKey, Task, TaskId, TaskStatus, TaskStatusId},
        services::{
            CreateStatusRequest, CreateTaskRequest, DependencyService, TaskBoardService,
            TaskListFilter,
        },
    },
};

/// Board service over the shared in-memory store.
pub type TestBoardService = TaskBoardService<InMemoryTaskBoard, InMemoryTaskBoard, DefaultClock>;

/// Dependency service over the shared in-memory store.
pub type TestDependencyService =
    DependencyService<InMemoryTaskBoard, InMemoryTaskBoard, DefaultClock>;

/// Handlers over both services.
pub type TestApi =
    TaskBoardApi<InMemoryTaskBoard, InMemoryTaskBoard, InMemoryTaskBoard, DefaultClock>;

/// One project board with services and handlers sharing a single store.
pub struct BoardHarness {
    pub project_id: ProjectId,
    pub board: Arc<TestBoardService>,
    pub dependencies: Arc<TestDependencyService>,
    pub api: TestApi,
}

impl BoardHarness {
    /// Creates an empty board for a fresh project.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTaskBoard::new());
        let clock = Arc::new(DefaultClock);
        let board = Arc::new(TaskBoardService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&clock),
        ));
        let dependencies = Arc::new(DependencyService::new(
            Arc::clone(&store),
            store,
            clock,
        ));
        let api = TaskBoardApi::new(Arc::clone(&board), Arc::clone(&dependencies));
        Self {
            project_id: ProjectId::new(),
            board,
            dependencies,
            api,
        }
    }

    /// Appends an open column.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be created.
    pub async fn column(&self, name: &str) -> eyre::Result<TaskStatus> {
        self.board
            .create_status(CreateStatusRequest::new(self.project_id, name))
            .await
            .wrap_err_with(|| format!("create column {name}"))
    }

    /// Appends a completed column.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be created.
    pub async fn completed_column(&self, name: &str) -> eyre::Result<TaskStatus> {
        self.board
            .create_status(CreateStatusRequest::new(self.project_id, name).completed())
            .await
            .wrap_err_with(|| format!("create completed column {name}"))
    }

    /// Appends tasks to `status` in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if any task cannot be created.
    pub async fn fill(&self, status: &TaskStatus, titles: &[&str]) -> eyre::Result<Vec<Task>> {
        let mut created = Vec::with_capacity(titles.len());
        for title in titles {
            let task = self
                .board
                .create_task(CreateTaskRequest::new(self.project_id, *title).in_status(status.id()))
                .await
                .wrap_err_with(|| format!("create task {title}"))?;
            created.push(task);
        }
        Ok(created)
    }

    /// Returns `(title, sort)` pairs of a column in board order.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    pub async fn column_contents(&self, status_id: TaskStatusId) -> eyre::Result<Vec<(String, u32)>> {
        let tasks = self
            .board
            .list_tasks(self.project_id, &TaskListFilter::default().in_status(status_id))
            .await
            .wrap_err("list column tasks")?;
        Ok(tasks
            .iter()
            .map(|task| (task.title().to_owned(), task.sort().value()))
            .collect())
    }

    /// Reloads a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task is missing or the lookup fails.
    pub async fn reload(&self, task_id: TaskId) -> eyre::Result<Task> {
        self.board
            .find_task(task_id)
            .await
            .wrap_err("find task")?
            .ok_or_else(|| eyre::eyre!("task {task_id} not found"))
    }
}

impl Default for BoardHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Provides a fresh board for each test.
#[fixture]
pub fn harness() -> BoardHarness {
    BoardHarness::new()
}

/// Builds `(title, sort)` pairs for comparisons.
#[must_use]
pub fn entries(expected: &[(&str, u32)]) -> Vec<(String, u32)> {
    expected
        .iter()
        .map(|(title, sort)| ((*title).to_owned(), *sort))
        .collect()
}

/// Returns the sort keys `0..count`.
#[must_use]
pub fn dense_keys(count: u32) -> Vec<SortKey> {
    (0..count).map(SortKey::new).collect()
}
