//! Reachability checks over `depends_on` edges.

use crate::task::domain::TaskId;
use std::collections::HashSet;

/// Returns `true` when `target` is reachable from `source` by following
/// `depends_on` edges, as reported by `successors`.
///
/// A task always reaches itself. The search is an iterative depth-first
/// traversal with an explicit stack, so stack depth does not grow with the
/// length of dependency chains, and the visited set guarantees termination
/// even if the edge set already contains a cycle.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use trellis::task::domain::TaskId;
/// use trellis::task::graph::has_path;
///
/// let (a, b, c) = (TaskId::new(), TaskId::new(), TaskId::new());
/// let edges = HashMap::from([(a, vec![b]), (b, vec![c])]);
/// let successors = |id: TaskId| edges.get(&id).cloned().unwrap_or_default();
///
/// assert!(has_path(a, c, successors));
/// assert!(!has_path(c, a, successors));
/// ```
pub fn has_path<F, I>(source: TaskId, target: TaskId, mut successors: F) -> bool
where
    F: FnMut(TaskId) -> I,
    I: IntoIterator<Item = TaskId>,
{
    let mut visited = HashSet::from([source]);
    let mut stack = vec![source];

    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        for next in successors(current) {
            if visited.insert(next) {
                stack.push(next);
            }
        }
    }

    false
}
