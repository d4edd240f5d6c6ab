//! Identifier and validated scalar types for the task board domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of the project that owns tasks and statuses.
///
/// Projects are managed outside this crate; the identifier is only used to
/// scope boards and dependency graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Creates a new random project identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a project identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for TaskId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a task status (a board column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStatusId(Uuid);

impl TaskStatusId {
    /// Creates a new random status identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a status identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskStatusId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskStatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyId(Uuid);

impl DependencyId {
    /// Creates a new random dependency identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a dependency identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for DependencyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-based ordering key for tasks within a column and columns within a
/// board.
///
/// Deserialised keys are range-checked like [`SortKey::from_position`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct SortKey(u32);

impl SortKey {
    /// Largest key representable in the current `PostgreSQL` schema.
    const MAX_PERSISTED_VALUE: u32 = i32::MAX as u32;

    /// The first position in a sequence.
    pub const FIRST: Self = Self(0);

    /// Creates a sort key from a raw value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Creates a sort key for a zero-based position.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SortKeyOverflow`] when the position exceeds
    /// the schema-backed maximum (`i32::MAX`).
    pub fn from_position(position: usize) -> Result<Self, TaskDomainError> {
        u32::try_from(position)
            .ok()
            .filter(|value| *value <= Self::MAX_PERSISTED_VALUE)
            .map(Self)
            .ok_or(TaskDomainError::SortKeyOverflow(position))
    }

    /// Returns the key that follows this one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SortKeyOverflow`] when the successor would
    /// exceed the schema-backed maximum.
    pub fn successor(self) -> Result<Self, TaskDomainError> {
        let position = usize::try_from(self.0)
            .map_err(|_| TaskDomainError::SortKeyOverflow(usize::MAX))?
            .saturating_add(1);
        Self::from_position(position)
    }

    /// Returns the key unchanged when it fits the persisted range.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SortKeyOverflow`] for keys above
    /// `i32::MAX`.
    pub fn checked(self) -> Result<Self, TaskDomainError> {
        usize::try_from(self.0)
            .map_err(|_| TaskDomainError::SortKeyOverflow(usize::MAX))
            .and_then(Self::from_position)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for SortKey {
    type Error = TaskDomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).checked()
    }
}

impl From<SortKey> for u32 {
    fn from(key: SortKey) -> Self {
        key.0
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
