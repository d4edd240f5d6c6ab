//! Async driver that commits drops and reconciles the rendered board.

use super::{
    BoardGateway, DragItem, DragPhase, DragSession, DropOutcome, DropTarget, GatewayError,
    ReconcileError,
};
use crate::task::{domain::ProjectId, ordering::BoardLayout};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Final state of a released gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Dropped outside any target; nothing was sent.
    Cancelled,
    /// The server accepted the mutation; carries the layout now rendered.
    Committed(BoardLayout),
    /// The server refused or failed; the pre-drag layout was restored.
    RolledBack {
        /// Layout now rendered.
        layout: BoardLayout,
        /// Error to surface to the user.
        error: GatewayError,
    },
}

/// Drives a [`DragSession`] against a [`BoardGateway`].
///
/// The session lock is never held across the network call, so a second
/// gesture started while a commit is in flight is refused by the session
/// rather than queued.
pub struct BoardReconciler<G>
where
    G: BoardGateway,
{
    session: Mutex<DragSession>,
    gateway: Arc<G>,
}

impl<G> BoardReconciler<G>
where
    G: BoardGateway,
{
    /// Creates a reconciler rendering `layout` for `project_id`.
    #[must_use]
    pub fn new(project_id: ProjectId, layout: BoardLayout, gateway: Arc<G>) -> Self {
        Self {
            session: Mutex::new(DragSession::new(project_id, layout)),
            gateway,
        }
    }

    /// Returns the layout currently rendered.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::SessionPoisoned`] when the session lock is
    /// poisoned.
    pub fn layout(&self) -> Result<BoardLayout, ReconcileError> {
        Ok(self.lock()?.layout().clone())
    }

    /// Returns the current gesture phase.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::SessionPoisoned`] when the session lock is
    /// poisoned.
    pub fn phase(&self) -> Result<DragPhase, ReconcileError> {
        Ok(self.lock()?.phase())
    }

    /// Starts dragging `item`.
    ///
    /// # Errors
    ///
    /// See [`DragSession::begin`].
    pub fn begin(&self, item: DragItem) -> Result<(), ReconcileError> {
        self.lock()?.begin(item)?;
        debug!(?item, "drag started");
        Ok(())
    }

    /// Renders the preview for hovering over `target`.
    ///
    /// # Errors
    ///
    /// See [`DragSession::drag_over`].
    pub fn drag_over(&self, target: DropTarget) -> Result<BoardLayout, ReconcileError> {
        Ok(self.lock()?.drag_over(target)?.clone())
    }

    /// Releases the drag, commits the drop-time mutation, and confirms or
    /// rolls back the optimistic layout.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] for calls outside a drag or invalid
    /// targets. Gateway failures are not errors here; they produce
    /// [`Reconciliation::RolledBack`].
    pub async fn drop_on(
        &self,
        target: Option<DropTarget>,
    ) -> Result<Reconciliation, ReconcileError> {
        let outcome = self.lock()?.drop_on(target)?;
        let DropOutcome::Commit(mutation) = outcome else {
            debug!("drag cancelled");
            return Ok(Reconciliation::Cancelled);
        };

        match self.gateway.commit(&mutation).await {
            Ok(receipt) => {
                let adopted = receipt.authoritative.is_some();
                let layout = self.lock()?.confirm(receipt)?.clone();
                info!(?mutation, adopted, "board mutation committed");
                Ok(Reconciliation::Committed(layout))
            }
            Err(err) => {
                warn!(?mutation, error = %err, "board mutation failed; rolling back");
                let mut session = self.lock()?;
                let layout = session.fail(err)?.clone();
                let error = session.acknowledge_rollback()?;
                Ok(Reconciliation::RolledBack { layout, error })
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, DragSession>, ReconcileError> {
        self.session
            .lock()
            .map_err(|_| ReconcileError::SessionPoisoned)
    }
}
