//! SQL helpers shared by the `PostgreSQL` board repository.
//!
//! Every helper takes a borrowed connection so callers compose them inside
//! one transaction.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use super::conversion_helpers::{row_to_dependency, row_to_status, row_to_task, sort_to_db};
use super::models::{TaskDependencyRow, TaskRow, TaskStatusRow};
use super::schema::{task_dependencies, task_statuses, tasks};
use crate::task::{
    domain::{ProjectId, Task, TaskDependency, TaskDomainError, TaskId, TaskStatus, TaskStatusId},
    graph::DependencyGraph,
    ordering::{ColumnSequence, ColumnSequencer},
    ports::{BoardRepositoryError, BoardRepositoryResult},
};

impl From<DieselError> for BoardRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// Returns the constraint named by a unique violation, if any.
pub(super) fn unique_violation(err: &DieselError) -> Option<&str> {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(info.constraint_name().unwrap_or_default())
        }
        _ => None,
    }
}

pub(super) fn load_active_task(
    conn: &mut PgConnection,
    id: TaskId,
) -> BoardRepositoryResult<Option<Task>> {
    let row = tasks::table
        .filter(tasks::id.eq(id.into_inner()))
        .filter(tasks::deleted_at.is_null())
        .select(TaskRow::as_select())
        .first::<TaskRow>(conn)
        .optional()?;
    row.map(row_to_task).transpose()
}

pub(super) fn load_status(
    conn: &mut PgConnection,
    id: TaskStatusId,
) -> BoardRepositoryResult<Option<TaskStatus>> {
    let row = task_statuses::table
        .filter(task_statuses::id.eq(id.into_inner()))
        .select(TaskStatusRow::as_select())
        .first::<TaskStatusRow>(conn)
        .optional()?;
    row.map(row_to_status).transpose()
}

/// Loads the statuses of a project in board order.
pub(super) fn load_project_statuses(
    conn: &mut PgConnection,
    project_id: ProjectId,
) -> BoardRepositoryResult<Vec<TaskStatus>> {
    let rows = task_statuses::table
        .filter(task_statuses::project_id.eq(project_id.into_inner()))
        .select(TaskStatusRow::as_select())
        .load::<TaskStatusRow>(conn)?;
    let mut statuses = rows
        .into_iter()
        .map(row_to_status)
        .collect::<BoardRepositoryResult<Vec<_>>>()?;
    ColumnSequencer::sort_columns(&mut statuses);
    Ok(statuses)
}

/// Loads the active tasks of a column ordered by sort key.
pub(super) fn load_column_tasks(
    conn: &mut PgConnection,
    status_id: TaskStatusId,
) -> BoardRepositoryResult<Vec<Task>> {
    let rows = tasks::table
        .filter(tasks::status_id.eq(status_id.into_inner()))
        .filter(tasks::deleted_at.is_null())
        .order((tasks::sort.asc(), tasks::created_at.asc(), tasks::id.asc()))
        .select(TaskRow::as_select())
        .load::<TaskRow>(conn)?;
    rows.into_iter().map(row_to_task).collect()
}

pub(super) fn load_column(
    conn: &mut PgConnection,
    status_id: TaskStatusId,
) -> BoardRepositoryResult<ColumnSequence> {
    let column_tasks = load_column_tasks(conn, status_id)?;
    Ok(ColumnSequence::from_tasks(status_id, &column_tasks))
}

/// Writes the dense sort keys of `column`, touching only rows whose key
/// changed.
pub(super) fn write_column_sorts(
    conn: &mut PgConnection,
    column: &ColumnSequence,
) -> BoardRepositoryResult<()> {
    for assignment in column.assignments()? {
        diesel::update(
            tasks::table
                .filter(tasks::id.eq(assignment.task_id.into_inner()))
                .filter(tasks::sort.ne(sort_to_db(assignment.sort)?)),
        )
        .set(tasks::sort.eq(sort_to_db(assignment.sort)?))
        .execute(conn)?;
    }
    Ok(())
}

/// Fails with `DuplicateStatusSlug` when another status of the project uses
/// the slug of `status`.
pub(super) fn ensure_unique_slug(
    conn: &mut PgConnection,
    status: &TaskStatus,
) -> BoardRepositoryResult<()> {
    let taken = task_statuses::table
        .filter(task_statuses::project_id.eq(status.project_id().into_inner()))
        .filter(task_statuses::slug.eq(status.slug()))
        .filter(task_statuses::id.ne(status.id().into_inner()))
        .count()
        .get_result::<i64>(conn)?;
    if taken > 0 {
        return Err(TaskDomainError::DuplicateStatusSlug {
            project_id: status.project_id(),
            slug: status.slug().to_owned(),
        }
        .into());
    }
    Ok(())
}

/// Clears the default flag on every other status of the project when
/// `status` is the default.
pub(super) fn clear_other_defaults(
    conn: &mut PgConnection,
    status: &TaskStatus,
) -> BoardRepositoryResult<()> {
    if status.is_default() {
        diesel::update(
            task_statuses::table
                .filter(task_statuses::project_id.eq(status.project_id().into_inner()))
                .filter(task_statuses::id.ne(status.id().into_inner()))
                .filter(task_statuses::is_default.eq(true)),
        )
        .set(task_statuses::is_default.eq(false))
        .execute(conn)?;
    }
    Ok(())
}

/// Counts the active tasks in a column.
pub(super) fn count_active_tasks(
    conn: &mut PgConnection,
    status_id: TaskStatusId,
) -> BoardRepositoryResult<usize> {
    let count = tasks::table
        .filter(tasks::status_id.eq(status_id.into_inner()))
        .filter(tasks::deleted_at.is_null())
        .count()
        .get_result::<i64>(conn)?;
    usize::try_from(count).map_err(BoardRepositoryError::persistence)
}

/// Loads every edge between active tasks of a project.
pub(super) fn load_project_edges(
    conn: &mut PgConnection,
    project_id: ProjectId,
) -> BoardRepositoryResult<Vec<TaskDependency>> {
    let active_ids = tasks::table
        .filter(tasks::project_id.eq(project_id.into_inner()))
        .filter(tasks::deleted_at.is_null())
        .select(tasks::id)
        .load::<uuid::Uuid>(conn)?;
    let rows = task_dependencies::table
        .filter(task_dependencies::task_id.eq_any(&active_ids))
        .filter(task_dependencies::depends_on_task_id.eq_any(&active_ids))
        .order((task_dependencies::created_at.asc(), task_dependencies::id.asc()))
        .select(TaskDependencyRow::as_select())
        .load::<TaskDependencyRow>(conn)?;
    rows.into_iter().map(row_to_dependency).collect()
}

pub(super) fn load_project_graph(
    conn: &mut PgConnection,
    project_id: ProjectId,
) -> BoardRepositoryResult<DependencyGraph> {
    Ok(DependencyGraph::from_edges(load_project_edges(conn, project_id)?))
}
