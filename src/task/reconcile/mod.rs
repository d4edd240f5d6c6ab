//! Client-side reconciliation of drag gestures against the authoritative
//! board.
//!
//! A gesture moves through `Idle -> Dragging -> Committing -> Idle`, or
//! through `RollingBack` when the commit fails. Previews reuse the ordering
//! engine's positional logic and are never persisted; exactly one mutation is
//! sent per drop.

mod gateway;
mod reconciler;
mod session;

#[cfg(test)]
pub use gateway::MockBoardGateway;
pub use gateway::{BoardGateway, BoardMutation, CommitReceipt, GatewayError, ServiceGateway};
pub use reconciler::{BoardReconciler, Reconciliation};
pub use session::{DragItem, DragPhase, DragSession, DropOutcome, DropTarget, ReconcileError};
