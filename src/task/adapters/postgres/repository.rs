//! `PostgreSQL` repository implementation for task board storage.
//!
//! Mutations run inside one Diesel transaction each. The pure ordering and
//! graph algorithms are evaluated against rows read in that transaction, so
//! a rejected mutation leaves the database untouched.

use super::{
    conversion_helpers::{
        dependency_to_row, row_to_dependency, row_to_task, sort_to_db, status_to_row,
        task_to_row,
    },
    models::{TaskDependencyRow, TaskRow},
    schema::{task_dependencies, task_statuses, tasks},
    sql_helpers::{
        clear_other_defaults, count_active_tasks, ensure_unique_slug, load_active_task,
        load_column, load_column_tasks, load_project_edges, load_project_graph,
        load_project_statuses, load_status, unique_violation, write_column_sorts,
    },
};
use crate::task::{
    domain::{
        DependencyId, ProjectId, SortKey, Task, TaskDependency, TaskDomainError, TaskId,
        TaskStatus, TaskStatusId,
    },
    ordering::{ColumnSequencer, OrderingEngine, StatusRank},
    ports::{
        BoardRepositoryError, BoardRepositoryResult, DependencyRepository, MoveOutcome,
        MoveTaskCommand, TaskRepository, TaskStatusRepository,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task board adapters.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task board repository.
///
/// One value implements every task board port against the same pool.
#[derive(Debug, Clone)]
pub struct PostgresTaskBoard {
    pool: BoardPgPool,
}

impl PostgresTaskBoard {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BoardPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> BoardRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BoardRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BoardRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(BoardRepositoryError::persistence)?
    }

    async fn in_transaction<F, T>(&self, f: F) -> BoardRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BoardRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |connection| {
            connection.transaction::<_, BoardRepositoryError, _>(f)
        })
        .await
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskBoard {
    async fn store(&self, task: &Task) -> BoardRepositoryResult<()> {
        let task_id = task.id();
        let status_id = task.status_id();
        let row = task_to_row(task)?;

        self.in_transaction(move |connection| {
            if load_status(connection, status_id)?.is_none() {
                return Err(BoardRepositoryError::StatusNotFound(status_id));
            }
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        BoardRepositoryError::DuplicateTask(task_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        BoardRepositoryError::StatusNotFound(status_id)
                    }
                    _ => BoardRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> BoardRepositoryResult<()> {
        let task_id = task.id();
        let title = task.title().to_owned();
        let completed_at = task.completed_at();
        let updated_at = task.updated_at();

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::deleted_at.is_null()),
            )
            .set((
                tasks::title.eq(title),
                tasks::completed_at.eq(completed_at),
                tasks::updated_at.eq(updated_at),
            ))
            .execute(connection)?;
            if updated == 0 {
                return Err(BoardRepositoryError::TaskNotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> BoardRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| load_active_task(connection, id))
            .await
    }

    async fn find_many(&self, ids: &[TaskId]) -> BoardRepositoryResult<Vec<Task>> {
        let uuids: Vec<uuid::Uuid> = ids.iter().copied().map(TaskId::into_inner).collect();
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::id.eq_any(&uuids))
                .filter(tasks::deleted_at.is_null())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_by_project(&self, project_id: ProjectId) -> BoardRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::project_id.eq(project_id.into_inner()))
                .filter(tasks::deleted_at.is_null())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list_by_status(&self, status_id: TaskStatusId) -> BoardRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| load_column_tasks(connection, status_id))
            .await
    }

    async fn next_sort(&self, status_id: TaskStatusId) -> BoardRepositoryResult<SortKey> {
        self.run_blocking(move |connection| {
            let column_tasks = load_column_tasks(connection, status_id)?;
            Ok(OrderingEngine::next_sort(status_id, &column_tasks)?)
        })
        .await
    }

    async fn move_task(&self, command: MoveTaskCommand) -> BoardRepositoryResult<MoveOutcome> {
        self.in_transaction(move |connection| {
            let mut task = load_active_task(connection, command.task_id)?
                .ok_or(BoardRepositoryError::TaskNotFound(command.task_id))?;
            let target = load_status(connection, command.target_status_id)?
                .filter(|status| status.project_id() == task.project_id())
                .ok_or(TaskDomainError::InvalidStatus(command.target_status_id))?;
            let source = load_status(connection, task.status_id())?
                .ok_or(BoardRepositoryError::StatusNotFound(task.status_id()))?;

            let destination = if target.id() == source.id() {
                None
            } else {
                Some(load_column(connection, target.id())?)
            };
            let plan = OrderingEngine::plan_move(
                load_column(connection, source.id())?,
                destination,
                task.id(),
                command.target_index,
            )?;
            task.place(
                &source,
                &target,
                plan.target_sort()?,
                command.policy,
                command.moved_at,
            )?;
            // Validate every key before the first write.
            plan.assignments()?;

            diesel::update(tasks::table.filter(tasks::id.eq(task.id().into_inner())))
                .set((
                    tasks::status_id.eq(task.status_id().into_inner()),
                    tasks::sort.eq(sort_to_db(task.sort())?),
                    tasks::completed_at.eq(task.completed_at()),
                    tasks::updated_at.eq(task.updated_at()),
                ))
                .execute(connection)?;

            let (source_column, destination_column) = plan.into_columns();
            write_column_sorts(connection, &source_column)?;
            if let Some(column) = &destination_column {
                write_column_sorts(connection, column)?;
            }

            let target_column = destination_column.unwrap_or_else(|| source_column.clone());
            Ok(MoveOutcome {
                task,
                source: source_column,
                target: target_column,
            })
        })
        .await
    }

    async fn soft_delete(
        &self,
        id: TaskId,
        deleted_at: DateTime<Utc>,
    ) -> BoardRepositoryResult<Task> {
        self.in_transaction(move |connection| {
            let mut task = load_active_task(connection, id)?
                .ok_or(BoardRepositoryError::TaskNotFound(id))?;
            task.soft_delete(deleted_at);

            diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .set((
                    tasks::deleted_at.eq(task.deleted_at()),
                    tasks::updated_at.eq(task.updated_at()),
                ))
                .execute(connection)?;

            let column = load_column(connection, task.status_id())?;
            write_column_sorts(connection, &column)?;

            diesel::delete(
                task_dependencies::table.filter(
                    task_dependencies::task_id
                        .eq(id.into_inner())
                        .or(task_dependencies::depends_on_task_id.eq(id.into_inner())),
                ),
            )
            .execute(connection)?;
            Ok(task)
        })
        .await
    }
}

#[async_trait]
impl TaskStatusRepository for PostgresTaskBoard {
    async fn store(&self, status: &TaskStatus) -> BoardRepositoryResult<()> {
        let candidate = status.clone();
        let row = status_to_row(status)?;

        self.in_transaction(move |connection| {
            if load_status(connection, candidate.id())?.is_some() {
                return Err(BoardRepositoryError::DuplicateStatus(candidate.id()));
            }
            ensure_unique_slug(connection, &candidate)?;
            clear_other_defaults(connection, &candidate)?;
            diesel::insert_into(task_statuses::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_status_write_error(err, &candidate))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, status: &TaskStatus) -> BoardRepositoryResult<()> {
        let updated = status.clone();
        let row = status_to_row(status)?;

        self.in_transaction(move |connection| {
            if load_status(connection, updated.id())?.is_none() {
                return Err(BoardRepositoryError::StatusNotFound(updated.id()));
            }
            ensure_unique_slug(connection, &updated)?;
            clear_other_defaults(connection, &updated)?;
            diesel::update(task_statuses::table.find(updated.id().into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(|err| map_status_write_error(err, &updated))?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskStatusId) -> BoardRepositoryResult<Option<TaskStatus>> {
        self.run_blocking(move |connection| load_status(connection, id))
            .await
    }

    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> BoardRepositoryResult<Vec<TaskStatus>> {
        self.run_blocking(move |connection| load_project_statuses(connection, project_id))
            .await
    }

    async fn reorder(
        &self,
        project_id: ProjectId,
        ranks: &[StatusRank],
        require_complete: bool,
    ) -> BoardRepositoryResult<Vec<TaskStatus>> {
        let requested = ranks.to_vec();
        self.in_transaction(move |connection| {
            let mut statuses = load_project_statuses(connection, project_id)?;
            let changed =
                ColumnSequencer::new(require_complete).apply(&mut statuses, &requested)?;
            for status in statuses.iter().filter(|status| changed.contains(&status.id())) {
                diesel::update(task_statuses::table.find(status.id().into_inner()))
                    .set(task_statuses::sort.eq(sort_to_db(status.sort())?))
                    .execute(connection)?;
            }
            ColumnSequencer::sort_columns(&mut statuses);
            Ok(statuses)
        })
        .await
    }

    async fn delete(&self, id: TaskStatusId) -> BoardRepositoryResult<()> {
        self.in_transaction(move |connection| {
            let status =
                load_status(connection, id)?.ok_or(BoardRepositoryError::StatusNotFound(id))?;
            let task_count = count_active_tasks(connection, id)?;
            status.ensure_deletable(task_count)?;
            // Soft-deleted rows of the column cascade with it.
            diesel::delete(task_statuses::table.find(id.into_inner())).execute(connection)?;
            Ok(())
        })
        .await
    }
}

fn map_status_write_error(err: DieselError, status: &TaskStatus) -> BoardRepositoryError {
    match unique_violation(&err) {
        Some("task_statuses_pkey") => BoardRepositoryError::DuplicateStatus(status.id()),
        Some("task_statuses_project_slug_key") => TaskDomainError::DuplicateStatusSlug {
            project_id: status.project_id(),
            slug: status.slug().to_owned(),
        }
        .into(),
        _ => BoardRepositoryError::persistence(err),
    }
}

#[async_trait]
impl DependencyRepository for PostgresTaskBoard {
    async fn add(&self, dependency: &TaskDependency) -> BoardRepositoryResult<()> {
        let edge = dependency.clone();
        let row = dependency_to_row(dependency);

        self.in_transaction(move |connection| {
            let task_id = edge.task_id();
            let depends_on_task_id = edge.depends_on_task_id();
            let project_id = load_active_task(connection, task_id)?
                .map(|task| task.project_id())
                .ok_or(BoardRepositoryError::TaskNotFound(task_id))?;
            let prerequisite_project = load_active_task(connection, depends_on_task_id)?
                .map(|task| task.project_id())
                .ok_or(BoardRepositoryError::TaskNotFound(depends_on_task_id))?;
            if project_id != prerequisite_project {
                return Err(TaskDomainError::CrossProjectDependency {
                    task_id,
                    depends_on_task_id,
                }
                .into());
            }

            let mut graph = load_project_graph(connection, project_id)?;
            graph.add_edge(edge)?;

            diesel::insert_into(task_dependencies::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match unique_violation(&err) {
                    Some("task_dependencies_edge_key") => {
                        TaskDomainError::DuplicateDependency {
                            task_id,
                            depends_on_task_id,
                        }
                        .into()
                    }
                    _ => BoardRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn remove(
        &self,
        task_id: TaskId,
        depends_on_task_id: TaskId,
    ) -> BoardRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(
                task_dependencies::table
                    .filter(task_dependencies::task_id.eq(task_id.into_inner()))
                    .filter(
                        task_dependencies::depends_on_task_id.eq(depends_on_task_id.into_inner()),
                    ),
            )
            .execute(connection)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn find_by_id(&self, id: DependencyId) -> BoardRepositoryResult<Option<TaskDependency>> {
        self.run_blocking(move |connection| {
            let row = task_dependencies::table
                .find(id.into_inner())
                .select(TaskDependencyRow::as_select())
                .first::<TaskDependencyRow>(connection)
                .optional()?;
            row.map(row_to_dependency).transpose()
        })
        .await
    }

    async fn dependencies_of(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<TaskDependency>> {
        self.run_blocking(move |connection| {
            let rows = task_dependencies::table
                .filter(task_dependencies::task_id.eq(task_id.into_inner()))
                .order((task_dependencies::created_at.asc(), task_dependencies::id.asc()))
                .select(TaskDependencyRow::as_select())
                .load::<TaskDependencyRow>(connection)?;
            rows.into_iter().map(row_to_dependency).collect()
        })
        .await
    }

    async fn dependents_of(&self, task_id: TaskId) -> BoardRepositoryResult<Vec<TaskDependency>> {
        self.run_blocking(move |connection| {
            let rows = task_dependencies::table
                .filter(task_dependencies::depends_on_task_id.eq(task_id.into_inner()))
                .order((task_dependencies::created_at.asc(), task_dependencies::id.asc()))
                .select(TaskDependencyRow::as_select())
                .load::<TaskDependencyRow>(connection)?;
            rows.into_iter().map(row_to_dependency).collect()
        })
        .await
    }

    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> BoardRepositoryResult<Vec<TaskDependency>> {
        self.run_blocking(move |connection| load_project_edges(connection, project_id))
            .await
    }
}
