//! Dependency graph algorithms.
//!
//! Pure, synchronous building blocks shared by every repository adapter:
//! reachability ([`has_path`]), edge maintenance with cycle rejection
//! ([`DependencyGraph`]), and blocked-state evaluation
//! ([`BlockingEvaluator`]).

mod blocking;
mod cycle;
mod dependency_graph;

pub use blocking::{BlockingEvaluator, CompletionLookup};
pub use cycle::has_path;
pub use dependency_graph::DependencyGraph;
