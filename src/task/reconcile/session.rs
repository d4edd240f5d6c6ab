//! Drag gesture state machine with optimistic prediction and rollback.

use super::{BoardMutation, CommitReceipt, GatewayError};
use crate::task::{
    domain::{ProjectId, TaskDomainError, TaskId, TaskStatusId},
    ordering::BoardLayout,
};
use thiserror::Error;

/// Observable phase of a [`DragSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No gesture in progress.
    Idle,
    /// A card or column is being dragged; previews are local only.
    Dragging,
    /// The drop was rendered optimistically and one mutation is in flight.
    Committing,
    /// The mutation failed and the pre-drag snapshot was restored.
    RollingBack,
}

/// Item picked up by a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragItem {
    /// A task card.
    Task(TaskId),
    /// A whole column.
    Column(TaskStatusId),
}

/// Position the dragged item is hovering over or dropped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Slot `index` in column `status_id`, for task drags.
    Task {
        /// Destination column.
        status_id: TaskStatusId,
        /// Destination position.
        index: usize,
    },
    /// Slot `index` in board order, for column drags.
    Column {
        /// Destination position.
        index: usize,
    },
}

/// Result of releasing a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Dropped outside any target; the snapshot was restored and nothing is
    /// sent.
    Cancelled,
    /// The optimistic layout is rendered; send exactly this mutation.
    Commit(BoardMutation),
}

/// Errors raised by misuse of a [`DragSession`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// A gesture is already in progress or awaiting its commit.
    #[error("a drag gesture is already in progress ({0:?})")]
    GestureInFlight(DragPhase),
    /// The call is not valid in the current phase.
    #[error("expected drag phase {expected:?}, found {actual:?}")]
    UnexpectedPhase {
        /// Phase the call requires.
        expected: DragPhase,
        /// Phase the session is in.
        actual: DragPhase,
    },
    /// The dragged item is not on the board.
    #[error("drag item is not on the board: {0:?}")]
    UnknownItem(DragItem),
    /// A task was hovered over a column slot or a column over a task slot.
    #[error("drop target {target:?} does not accept {item:?}")]
    TargetMismatch {
        /// Dragged item.
        item: DragItem,
        /// Offered target.
        target: DropTarget,
    },
    /// The session lock was poisoned by a panicking holder.
    #[error("drag session state is poisoned")]
    SessionPoisoned,
    /// Applying the move to the local layout failed.
    #[error(transparent)]
    Layout(#[from] TaskDomainError),
}

#[derive(Debug, Clone)]
enum SessionState {
    Idle,
    Dragging {
        item: DragItem,
        snapshot: BoardLayout,
    },
    Committing {
        snapshot: BoardLayout,
        mutation: BoardMutation,
    },
    RollingBack {
        error: GatewayError,
    },
}

impl SessionState {
    const fn phase(&self) -> DragPhase {
        match self {
            Self::Idle => DragPhase::Idle,
            Self::Dragging { .. } => DragPhase::Dragging,
            Self::Committing { .. } => DragPhase::Committing,
            Self::RollingBack { .. } => DragPhase::RollingBack,
        }
    }
}

/// Client-side view of one board and the gesture currently applied to it.
///
/// Only one gesture is in flight per session: a new drag is refused until
/// the previous commit is confirmed or its rollback acknowledged.
#[derive(Debug, Clone)]
pub struct DragSession {
    project_id: ProjectId,
    layout: BoardLayout,
    state: SessionState,
}

impl DragSession {
    /// Creates an idle session rendering `layout`.
    #[must_use]
    pub const fn new(project_id: ProjectId, layout: BoardLayout) -> Self {
        Self {
            project_id,
            layout,
            state: SessionState::Idle,
        }
    }

    /// Returns the project this board belongs to.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the layout currently rendered.
    #[must_use]
    pub const fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        self.state.phase()
    }

    /// Returns the mutation awaiting a server response, if any.
    #[must_use]
    pub const fn pending(&self) -> Option<&BoardMutation> {
        match &self.state {
            SessionState::Committing { mutation, .. } => Some(mutation),
            _ => None,
        }
    }

    /// Replaces the rendered layout while idle, e.g. after a refresh.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::GestureInFlight`] outside the idle phase.
    pub fn refresh(&mut self, layout: BoardLayout) -> Result<(), ReconcileError> {
        self.expect_idle()?;
        self.layout = layout;
        Ok(())
    }

    /// Starts a drag and snapshots the board.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::GestureInFlight`] while another gesture is
    /// unresolved and [`ReconcileError::UnknownItem`] for items not on the
    /// board.
    pub fn begin(&mut self, item: DragItem) -> Result<(), ReconcileError> {
        self.expect_idle()?;
        let known = match item {
            DragItem::Task(task_id) => self.layout.locate(task_id).is_some(),
            DragItem::Column(status_id) => self.layout.column(status_id).is_some(),
        };
        if !known {
            return Err(ReconcileError::UnknownItem(item));
        }
        self.state = SessionState::Dragging {
            item,
            snapshot: self.layout.clone(),
        };
        Ok(())
    }

    /// Renders a predicted layout for hovering over `target`. The
    /// prediction is always computed from the snapshot and never sent.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnexpectedPhase`] outside a drag and
    /// [`ReconcileError::TargetMismatch`] or [`ReconcileError::Layout`] for
    /// targets the item cannot occupy; the rendered layout is unchanged.
    pub fn drag_over(&mut self, target: DropTarget) -> Result<&BoardLayout, ReconcileError> {
        let SessionState::Dragging { item, snapshot } = &self.state else {
            return Err(self.unexpected(DragPhase::Dragging));
        };
        let (preview, _) = predict(snapshot, *item, target)?;
        self.layout = preview;
        Ok(&self.layout)
    }

    /// Releases the drag.
    ///
    /// Without a target the snapshot is restored and the session returns to
    /// idle. With a target the final prediction is computed from the
    /// snapshot at drop time, rendered, and returned as the single mutation
    /// to commit.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnexpectedPhase`] outside a drag. An invalid
    /// target restores the snapshot, ends the gesture, and returns the
    /// layout error.
    pub fn drop_on(
        &mut self,
        target: Option<DropTarget>,
    ) -> Result<DropOutcome, ReconcileError> {
        let state = std::mem::replace(&mut self.state, SessionState::Idle);
        let SessionState::Dragging { item, snapshot } = state else {
            let actual = state.phase();
            self.state = state;
            return Err(ReconcileError::UnexpectedPhase {
                expected: DragPhase::Dragging,
                actual,
            });
        };

        let Some(drop_target) = target else {
            self.layout = snapshot;
            return Ok(DropOutcome::Cancelled);
        };

        let prediction = predict(&snapshot, item, drop_target).and_then(|(layout, index)| {
            let mutation = self.mutation_for(&layout, item, drop_target, index)?;
            Ok((layout, mutation))
        });
        let (predicted, mutation) = match prediction {
            Ok(prediction) => prediction,
            Err(err) => {
                self.layout = snapshot;
                return Err(err);
            }
        };

        self.layout = predicted;
        self.state = SessionState::Committing {
            snapshot,
            mutation: mutation.clone(),
        };
        Ok(DropOutcome::Commit(mutation))
    }

    /// Confirms the in-flight mutation. An authoritative layout from the
    /// server replaces the optimistic one; otherwise the optimistic layout
    /// stays.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnexpectedPhase`] when nothing is in
    /// flight.
    pub fn confirm(&mut self, receipt: CommitReceipt) -> Result<&BoardLayout, ReconcileError> {
        if !matches!(self.state, SessionState::Committing { .. }) {
            return Err(self.unexpected(DragPhase::Committing));
        }
        if let Some(authoritative) = receipt.authoritative {
            self.layout = authoritative;
        }
        self.state = SessionState::Idle;
        Ok(&self.layout)
    }

    /// Records a failed commit and restores the pre-drag snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnexpectedPhase`] when nothing is in
    /// flight.
    pub fn fail(&mut self, error: GatewayError) -> Result<&BoardLayout, ReconcileError> {
        let state = std::mem::replace(&mut self.state, SessionState::Idle);
        let SessionState::Committing { snapshot, .. } = state else {
            let actual = state.phase();
            self.state = state;
            return Err(ReconcileError::UnexpectedPhase {
                expected: DragPhase::Committing,
                actual,
            });
        };
        self.layout = snapshot;
        self.state = SessionState::RollingBack { error };
        Ok(&self.layout)
    }

    /// Ends a rollback and returns the error to surface to the user.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::UnexpectedPhase`] outside a rollback.
    pub fn acknowledge_rollback(&mut self) -> Result<GatewayError, ReconcileError> {
        let state = std::mem::replace(&mut self.state, SessionState::Idle);
        let SessionState::RollingBack { error } = state else {
            let actual = state.phase();
            self.state = state;
            return Err(ReconcileError::UnexpectedPhase {
                expected: DragPhase::RollingBack,
                actual,
            });
        };
        Ok(error)
    }

    fn expect_idle(&self) -> Result<(), ReconcileError> {
        match self.state.phase() {
            DragPhase::Idle => Ok(()),
            phase => Err(ReconcileError::GestureInFlight(phase)),
        }
    }

    fn unexpected(&self, expected: DragPhase) -> ReconcileError {
        ReconcileError::UnexpectedPhase {
            expected,
            actual: self.state.phase(),
        }
    }

    fn mutation_for(
        &self,
        predicted: &BoardLayout,
        item: DragItem,
        target: DropTarget,
        index: usize,
    ) -> Result<BoardMutation, ReconcileError> {
        match (item, target) {
            (DragItem::Task(task_id), DropTarget::Task { status_id, .. }) => {
                Ok(BoardMutation::MoveTask {
                    task_id,
                    status_id,
                    index,
                })
            }
            (DragItem::Column(_), DropTarget::Column { .. }) => Ok(BoardMutation::ReorderColumns {
                project_id: self.project_id,
                ranks: predicted.status_ranks()?,
            }),
            _ => Err(ReconcileError::TargetMismatch { item, target }),
        }
    }
}

/// Applies `item` at `target` to a copy of `snapshot` with the positional
/// logic used by the server. Returns the layout and the clamped index.
fn predict(
    snapshot: &BoardLayout,
    item: DragItem,
    target: DropTarget,
) -> Result<(BoardLayout, usize), ReconcileError> {
    let mut layout = snapshot.clone();
    let index = match (item, target) {
        (DragItem::Task(task_id), DropTarget::Task { status_id, index }) => {
            layout.move_task(task_id, status_id, index)?
        }
        (DragItem::Column(status_id), DropTarget::Column { index }) => {
            layout.move_column(status_id, index)?
        }
        _ => return Err(ReconcileError::TargetMismatch { item, target }),
    };
    Ok((layout, index))
}
