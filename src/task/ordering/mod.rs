//! Ordering of tasks within columns and of columns within a board.
//!
//! All functions here are pure: adapters load the current state, apply a
//! plan, and persist the rewritten keys in one atomic unit.

mod column;
mod engine;
mod layout;
mod sequencer;

pub use column::{ColumnSequence, SortAssignment};
pub use engine::{MovePlan, OrderingEngine};
pub use layout::BoardLayout;
pub use sequencer::{ColumnSequencer, StatusRank};
