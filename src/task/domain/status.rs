//! Task status (board column) entity.

use super::{ProjectId, SortKey, TaskDomainError, TaskStatusId};
use serde::{Deserialize, Serialize};

/// A named, ordered column on a project board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    id: TaskStatusId,
    project_id: ProjectId,
    name: String,
    slug: String,
    sort: SortKey,
    is_default: bool,
    is_completed: bool,
}

/// Parameters for creating a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskStatus {
    /// Owning project.
    pub project_id: ProjectId,
    /// Display name; the slug is derived from it.
    pub name: String,
    /// Column position on the board.
    pub sort: SortKey,
    /// Whether new tasks land here by default.
    pub is_default: bool,
    /// Whether entering this column completes a task.
    pub is_completed: bool,
}

/// Parameter object for reconstructing a persisted status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskStatusData {
    /// Persisted status identifier.
    pub id: TaskStatusId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Display name.
    pub name: String,
    /// Project-unique slug.
    pub slug: String,
    /// Column position.
    pub sort: SortKey,
    /// Default flag.
    pub is_default: bool,
    /// Completed flag.
    pub is_completed: bool,
}

impl TaskStatus {
    /// Creates a validated status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatusName`] when the name is blank
    /// or contains no characters usable in a slug.
    pub fn new(params: NewTaskStatus) -> Result<Self, TaskDomainError> {
        let name = params.name.trim();
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(TaskDomainError::InvalidStatusName(params.name));
        }

        Ok(Self {
            id: TaskStatusId::new(),
            project_id: params.project_id,
            name: name.to_owned(),
            slug,
            sort: params.sort,
            is_default: params.is_default,
            is_completed: params.is_completed,
        })
    }

    /// Reconstructs a status from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskStatusData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            name: data.name,
            slug: data.slug,
            sort: data.sort,
            is_default: data.is_default,
            is_completed: data.is_completed,
        }
    }

    /// Returns the status identifier.
    #[must_use]
    pub const fn id(&self) -> TaskStatusId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the project-unique slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Returns the column position.
    #[must_use]
    pub const fn sort(&self) -> SortKey {
        self.sort
    }

    /// Returns `true` for the project's default status.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.is_default
    }

    /// Returns `true` when entering this status completes a task.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Rewrites the column position.
    pub const fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
    }

    /// Sets or clears the default flag.
    pub const fn set_default(&mut self, is_default: bool) {
        self.is_default = is_default;
    }

    /// Checks that the status may be deleted while holding `task_count`
    /// active tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DefaultStatusNotDeletable`] for the default
    /// status and [`TaskDomainError::StatusNotEmpty`] when tasks remain.
    pub fn ensure_deletable(&self, task_count: usize) -> Result<(), TaskDomainError> {
        if self.is_default {
            return Err(TaskDomainError::DefaultStatusNotDeletable(self.id));
        }
        if task_count > 0 {
            return Err(TaskDomainError::StatusNotEmpty {
                status_id: self.id,
                task_count,
            });
        }
        Ok(())
    }
}

/// Derives a lowercase, hyphen-separated slug from a display name.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}
