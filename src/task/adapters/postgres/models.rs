//! Diesel row models for task board persistence.

use super::schema::{task_dependencies, task_statuses, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row for task records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Current column.
    pub status_id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Position within the column.
    pub sort: i32,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Soft-deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row for board columns.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = task_statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskStatusRow {
    /// Status identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Project-unique slug.
    pub slug: String,
    /// Column position.
    pub sort: i32,
    /// Project default flag.
    pub is_default: bool,
    /// Completed flag.
    pub is_completed: bool,
}

/// Row for dependency edges.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_dependencies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskDependencyRow {
    /// Edge identifier.
    pub id: uuid::Uuid,
    /// Dependent task.
    pub task_id: uuid::Uuid,
    /// Prerequisite task.
    pub depends_on_task_id: uuid::Uuid,
    /// Scheduling relationship metadata.
    pub dependency_type: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
