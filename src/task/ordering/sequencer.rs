//! Column (status) ordering on a board.

use crate::task::domain::{SortKey, TaskDomainError, TaskStatus, TaskStatusId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Requested rank of one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRank {
    /// Status to rank.
    #[serde(rename = "id")]
    pub status_id: TaskStatusId,
    /// New column position.
    pub sort: SortKey,
}

impl StatusRank {
    /// Creates a rank entry.
    #[must_use]
    pub const fn new(status_id: TaskStatusId, sort: SortKey) -> Self {
        Self { status_id, sort }
    }
}

/// Applies client-proposed column ranks to a project's statuses.
///
/// The client sends the complete post-drag order, so applying it is a plain
/// rank assignment with no positional arithmetic. Statuses omitted from the
/// request keep their previous `sort` unless `require_complete` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnSequencer {
    require_complete: bool,
}

impl ColumnSequencer {
    /// Creates a sequencer.
    #[must_use]
    pub const fn new(require_complete: bool) -> Self {
        Self { require_complete }
    }

    /// Validates `ranks` against the project's `statuses`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStatus`] for ids outside the
    /// project, [`TaskDomainError::DuplicateStatusRank`] for repeated ids,
    /// [`TaskDomainError::SortKeyOverflow`] for ranks beyond the persisted
    /// range, and [`TaskDomainError::IncompleteStatusOrder`] when
    /// completeness is required and statuses are missing.
    pub fn validate(
        &self,
        statuses: &[TaskStatus],
        ranks: &[StatusRank],
    ) -> Result<(), TaskDomainError> {
        let known: HashSet<TaskStatusId> = statuses.iter().map(TaskStatus::id).collect();
        let mut seen = HashSet::with_capacity(ranks.len());
        for rank in ranks {
            if !known.contains(&rank.status_id) {
                return Err(TaskDomainError::InvalidStatus(rank.status_id));
            }
            if !seen.insert(rank.status_id) {
                return Err(TaskDomainError::DuplicateStatusRank(rank.status_id));
            }
            rank.sort.checked()?;
        }

        if self.require_complete {
            let missing: Vec<TaskStatusId> = statuses
                .iter()
                .map(TaskStatus::id)
                .filter(|id| !seen.contains(id))
                .collect();
            if !missing.is_empty() {
                return Err(TaskDomainError::IncompleteStatusOrder { missing });
            }
        }
        Ok(())
    }

    /// Validates and writes the requested ranks into `statuses`, returning
    /// the ids whose `sort` actually changed.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`Self::validate`]; `statuses` is
    /// left untouched on error.
    pub fn apply(
        &self,
        statuses: &mut [TaskStatus],
        ranks: &[StatusRank],
    ) -> Result<Vec<TaskStatusId>, TaskDomainError> {
        self.validate(statuses, ranks)?;

        let mut changed = Vec::new();
        for rank in ranks {
            if let Some(status) = statuses
                .iter_mut()
                .find(|status| status.id() == rank.status_id)
                && status.sort() != rank.sort
            {
                status.set_sort(rank.sort);
                changed.push(rank.status_id);
            }
        }
        Ok(changed)
    }

    /// Returns the next free column position.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::SortKeyOverflow`] when the board already
    /// uses the largest key.
    pub fn next_sort(statuses: &[TaskStatus]) -> Result<SortKey, TaskDomainError> {
        statuses
            .iter()
            .map(TaskStatus::sort)
            .max()
            .map_or(Ok(SortKey::FIRST), SortKey::successor)
    }

    /// Sorts statuses into board order. Ties on `sort` fall back to name,
    /// then id.
    pub fn sort_columns(statuses: &mut [TaskStatus]) {
        statuses.sort_by(|left, right| {
            left.sort()
                .cmp(&right.sort())
                .then_with(|| left.name().cmp(right.name()))
                .then_with(|| left.id().cmp(&right.id()))
        });
    }
}
