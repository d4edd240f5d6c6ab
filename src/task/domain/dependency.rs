//! Dependency edges between tasks.

use super::{DependencyId, ParseDependencyTypeError, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Scheduling relationship carried by a dependency edge.
///
/// The type is metadata only; graph algorithms treat every edge alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// The prerequisite must finish before the dependent starts.
    #[default]
    FinishToStart,
    /// The prerequisite must start before the dependent starts.
    StartToStart,
    /// The prerequisite must finish before the dependent finishes.
    FinishToFinish,
    /// The prerequisite must start before the dependent finishes.
    StartToFinish,
}

impl DependencyType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FinishToStart => "finish_to_start",
            Self::StartToStart => "start_to_start",
            Self::FinishToFinish => "finish_to_finish",
            Self::StartToFinish => "start_to_finish",
        }
    }
}

impl TryFrom<&str> for DependencyType {
    type Error = ParseDependencyTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "finish_to_start" => Ok(Self::FinishToStart),
            "start_to_start" => Ok(Self::StartToStart),
            "finish_to_finish" => Ok(Self::FinishToFinish),
            "start_to_finish" => Ok(Self::StartToFinish),
            _ => Err(ParseDependencyTypeError(value.to_owned())),
        }
    }
}

/// Directed edge: `task_id` depends on `depends_on_task_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    id: DependencyId,
    task_id: TaskId,
    depends_on_task_id: TaskId,
    dependency_type: DependencyType,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedDependencyData {
    /// Persisted edge identifier.
    pub id: DependencyId,
    /// Dependent task.
    pub task_id: TaskId,
    /// Prerequisite task.
    pub depends_on_task_id: TaskId,
    /// Edge metadata.
    pub dependency_type: DependencyType,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TaskDependency {
    /// Creates an unvalidated edge. Validation happens when the edge is
    /// added to a [`crate::task::graph::DependencyGraph`].
    #[must_use]
    pub fn new(
        task_id: TaskId,
        depends_on_task_id: TaskId,
        dependency_type: DependencyType,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: DependencyId::new(),
            task_id,
            depends_on_task_id,
            dependency_type,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an edge from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedDependencyData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            depends_on_task_id: data.depends_on_task_id,
            dependency_type: data.dependency_type,
            created_at: data.created_at,
        }
    }

    /// Returns the edge identifier.
    #[must_use]
    pub const fn id(&self) -> DependencyId {
        self.id
    }

    /// Returns the dependent task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the prerequisite task.
    #[must_use]
    pub const fn depends_on_task_id(&self) -> TaskId {
        self.depends_on_task_id
    }

    /// Returns the edge metadata.
    #[must_use]
    pub const fn dependency_type(&self) -> DependencyType {
        self.dependency_type
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` when either endpoint is `task_id`.
    #[must_use]
    pub fn touches(&self, task_id: TaskId) -> bool {
        self.task_id == task_id || self.depends_on_task_id == task_id
    }
}
