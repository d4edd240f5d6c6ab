//! Task ordering and dependency management.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Pure dependency-graph algorithms in [`graph`]
//! - Pure column and board ordering in [`ordering`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Client-side drag reconciliation in [`reconcile`]

pub mod adapters;
pub mod domain;
pub mod graph;
pub mod ordering;
pub mod ports;
pub mod reconcile;
pub mod services;

#[cfg(test)]
mod tests;
