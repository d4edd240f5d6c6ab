//! In-memory adapters for task board persistence.

mod board;

pub use board::InMemoryTaskBoard;
