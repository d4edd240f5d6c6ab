//! `PostgreSQL` adapters for task board persistence.
//!
//! The schema lives in `migrations/`; constraint names referenced by the
//! error mapping are declared there.

mod conversion_helpers;
mod models;
mod repository;
mod schema;
mod sql_helpers;

pub use repository::{BoardPgPool, PostgresTaskBoard};
