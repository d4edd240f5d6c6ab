//! Task aggregate root and completion policy.

use super::{ProjectId, SortKey, TaskDomainError, TaskId, TaskStatus, TaskStatusId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Rules applied to `completed_at` when a task changes column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionPolicy {
    /// Entering a completed status stamps `completed_at` when it is unset.
    pub complete_on_completed_status: bool,
    /// Leaving a completed status for an open one clears `completed_at`.
    pub reopen_on_leave_completed: bool,
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        Self {
            complete_on_completed_status: true,
            reopen_on_leave_completed: false,
        }
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    status_id: TaskStatusId,
    title: String,
    sort: SortKey,
    completed_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Column the task currently sits in.
    pub status_id: TaskStatusId,
    /// Task title.
    pub title: String,
    /// Position within the column.
    pub sort: SortKey,
    /// Completion timestamp, if done.
    pub completed_at: Option<DateTime<Utc>>,
    /// Soft-deletion timestamp, if removed.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task at `sort` within `status`.
    ///
    /// Creating directly into a completed status stamps `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskTitle`] when the title is blank.
    pub fn new(
        status: &TaskStatus,
        title: impl Into<String>,
        sort: SortKey,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let raw_title = title.into();
        let trimmed = raw_title.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTaskTitle);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            project_id: status.project_id(),
            status_id: status.id(),
            title: trimmed.to_owned(),
            sort,
            completed_at: status.is_completed().then_some(timestamp),
            deleted_at: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            status_id: data.status_id,
            title: data.title,
            sort: data.sort,
            completed_at: data.completed_at,
            deleted_at: data.deleted_at,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the column the task belongs to.
    #[must_use]
    pub const fn status_id(&self) -> TaskStatusId {
        self.status_id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the position within the column.
    #[must_use]
    pub const fn sort(&self) -> SortKey {
        self.sort
    }

    /// Returns the completion timestamp.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the soft-deletion timestamp.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` once the task has been completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Returns `true` while the task has not been soft-deleted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Places the task into `target` at `sort`, applying `policy` to the
    /// completion timestamp. `source` is the column the task is leaving.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatus`] when `target` belongs to a
    /// different project.
    pub fn place(
        &mut self,
        source: &TaskStatus,
        target: &TaskStatus,
        sort: SortKey,
        policy: CompletionPolicy,
        at: DateTime<Utc>,
    ) -> Result<(), TaskDomainError> {
        if target.project_id() != self.project_id {
            return Err(TaskDomainError::InvalidStatus(target.id()));
        }

        if target.is_completed() {
            if policy.complete_on_completed_status && self.completed_at.is_none() {
                self.completed_at = Some(at);
            }
        } else if policy.reopen_on_leave_completed && source.is_completed() {
            self.completed_at = None;
        }

        self.status_id = target.id();
        self.sort = sort;
        self.updated_at = at;
        Ok(())
    }

    /// Rewrites the position without touching lifecycle timestamps.
    pub const fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    /// Marks the task completed. Returns `false` when it already was.
    pub fn complete(&mut self, clock: &impl Clock) -> bool {
        if self.completed_at.is_some() {
            return false;
        }
        let timestamp = clock.utc();
        self.completed_at = Some(timestamp);
        self.updated_at = timestamp;
        true
    }

    /// Clears the completion timestamp. Returns `false` when the task was
    /// not completed.
    pub fn reopen(&mut self, clock: &impl Clock) -> bool {
        if self.completed_at.is_none() {
            return false;
        }
        self.completed_at = None;
        self.updated_at = clock.utc();
        true
    }

    /// Soft-deletes the task.
    pub fn soft_delete(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.updated_at = at;
    }
}
