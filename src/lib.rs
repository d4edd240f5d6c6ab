//! Trellis: task ordering and dependency engine for project boards.
//!
//! Tasks live in ordered columns (statuses) and may depend on other tasks in
//! the same project. The crate keeps the dependency graph acyclic, derives
//! blocked state from direct prerequisites, maintains dense sort keys within
//! and across columns, and reconciles optimistic client drags against the
//! server-authoritative order.
//!
//! # Architecture
//!
//! Trellis follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`task`]: Board domain, algorithms, persistence, and services
//! - [`api`]: Request/response bodies and error mapping for the board
//!   operations

pub mod api;
pub mod task;
