//! Conversions between domain values and Diesel rows.

use super::models::{TaskDependencyRow, TaskRow, TaskStatusRow};
use crate::task::{
    domain::{
        DependencyId, DependencyType, PersistedDependencyData, PersistedTaskData,
        PersistedTaskStatusData, ProjectId, SortKey, Task, TaskDependency, TaskId, TaskStatus,
        TaskStatusId,
    },
    ports::{BoardRepositoryError, BoardRepositoryResult},
};

pub(super) fn sort_to_db(sort: SortKey) -> BoardRepositoryResult<i32> {
    i32::try_from(sort.value()).map_err(BoardRepositoryError::persistence)
}

pub(super) fn sort_from_db(value: i32) -> BoardRepositoryResult<SortKey> {
    u32::try_from(value)
        .map(SortKey::new)
        .map_err(BoardRepositoryError::persistence)
}

pub(super) fn task_to_row(task: &Task) -> BoardRepositoryResult<TaskRow> {
    Ok(TaskRow {
        id: task.id().into_inner(),
        project_id: task.project_id().into_inner(),
        status_id: task.status_id().into_inner(),
        title: task.title().to_owned(),
        sort: sort_to_db(task.sort())?,
        completed_at: task.completed_at(),
        deleted_at: task.deleted_at(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

pub(super) fn row_to_task(row: TaskRow) -> BoardRepositoryResult<Task> {
    let TaskRow {
        id,
        project_id,
        status_id,
        title,
        sort,
        completed_at,
        deleted_at,
        created_at,
        updated_at,
    } = row;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        project_id: ProjectId::from_uuid(project_id),
        status_id: TaskStatusId::from_uuid(status_id),
        title,
        sort: sort_from_db(sort)?,
        completed_at,
        deleted_at,
        created_at,
        updated_at,
    }))
}

pub(super) fn status_to_row(status: &TaskStatus) -> BoardRepositoryResult<TaskStatusRow> {
    Ok(TaskStatusRow {
        id: status.id().into_inner(),
        project_id: status.project_id().into_inner(),
        name: status.name().to_owned(),
        slug: status.slug().to_owned(),
        sort: sort_to_db(status.sort())?,
        is_default: status.is_default(),
        is_completed: status.is_completed(),
    })
}

pub(super) fn row_to_status(row: TaskStatusRow) -> BoardRepositoryResult<TaskStatus> {
    Ok(TaskStatus::from_persisted(PersistedTaskStatusData {
        id: TaskStatusId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        name: row.name,
        slug: row.slug,
        sort: sort_from_db(row.sort)?,
        is_default: row.is_default,
        is_completed: row.is_completed,
    }))
}

pub(super) fn dependency_to_row(dependency: &TaskDependency) -> TaskDependencyRow {
    TaskDependencyRow {
        id: dependency.id().into_inner(),
        task_id: dependency.task_id().into_inner(),
        depends_on_task_id: dependency.depends_on_task_id().into_inner(),
        dependency_type: dependency.dependency_type().as_str().to_owned(),
        created_at: dependency.created_at(),
    }
}

pub(super) fn row_to_dependency(row: TaskDependencyRow) -> BoardRepositoryResult<TaskDependency> {
    let dependency_type = DependencyType::try_from(row.dependency_type.as_str())
        .map_err(BoardRepositoryError::persistence)?;
    Ok(TaskDependency::from_persisted(PersistedDependencyData {
        id: DependencyId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        depends_on_task_id: TaskId::from_uuid(row.depends_on_task_id),
        dependency_type,
        created_at: row.created_at,
    }))
}
