//! Topological ordering with cycle recovery.
//!
//! [`sort`] runs Kahn's algorithm over any [`GraphView`], so the same code
//! orders a plain [`DependencyGraph`](crate::graph::DependencyGraph) or an
//! overlay union. Readiness is structural: a node's in-degree is its count
//! of *distinct predecessor nodes*, not edge records -- two edges of
//! different kinds between one pair justify the same single dependency.
//!
//! Cyclic input is never an error. Whatever Kahn's algorithm cannot order
//! is scanned with a depth-first search per unattributed node, and each
//! closed path found (first element repeated last) is reported in
//! [`TopoResult::cycles`]. The driver decides whether cycles are fatal.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::graph::GraphView;
use crate::id::NodeId;

/// Outcome of a topological sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopoResult {
    /// Every orderable node, in a valid dependency order.
    pub order: Vec<NodeId>,
    /// Representative closed paths through the unorderable remainder.
    /// Each path's first and last element are the same node.
    pub cycles: Vec<Vec<NodeId>>,
    /// `true` iff at least one cycle was found.
    pub has_cycles: bool,
}

impl TopoResult {
    /// Returns `true` if every node was ordered.
    pub fn is_total(&self) -> bool {
        !self.has_cycles
    }

    /// Number of reported cycle paths.
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }
}

/// Kahn's algorithm with cycle recovery over any [`GraphView`].
pub fn sort<V: GraphView>(view: &V) -> TopoResult {
    let nodes = view.nodes();

    // In-degree by distinct predecessor, seeded in registration order for
    // reproducible output.
    let mut in_degree: Vec<usize> = nodes
        .iter()
        .map(|&id| view.dependencies_of(id).len())
        .collect();

    let mut queue: VecDeque<NodeId> = nodes
        .iter()
        .enumerate()
        .filter(|&(i, _)| in_degree[i] == 0)
        .map(|(_, &id)| id)
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(id) = queue.pop_front() {
        order.push(id);
        for dep in view.dependents_of(id) {
            let i = nodes.get_index_of(&dep).expect("dependent is registered");
            in_degree[i] -= 1;
            if in_degree[i] == 0 {
                queue.push_back(dep);
            }
        }
    }

    if order.len() == nodes.len() {
        trace!(nodes = order.len(), "dependency sort complete");
        return TopoResult {
            order,
            cycles: Vec::new(),
            has_cycles: false,
        };
    }

    let ordered: HashSet<NodeId> = order.iter().copied().collect();
    let unordered: IndexSet<NodeId> = nodes
        .iter()
        .copied()
        .filter(|id| !ordered.contains(id))
        .collect();
    let cycles = find_cycles(view, &unordered);

    debug!(
        ordered = order.len(),
        unordered = unordered.len(),
        cycles = cycles.len(),
        "dependency sort found cycles"
    );

    TopoResult {
        order,
        cycles,
        has_cycles: true,
    }
}

/// Scans the unordered remainder for representative cycle paths.
///
/// Each unordered node not yet attributed to a found cycle gets one DFS.
/// Nodes whose search finds no closed path (they only sit downstream of a
/// cycle) are marked as scanned so the scan stays a single pass.
fn find_cycles<V: GraphView>(view: &V, unordered: &IndexSet<NodeId>) -> Vec<Vec<NodeId>> {
    let mut cycles = Vec::new();
    let mut attributed: HashSet<NodeId> = HashSet::new();

    for &start in unordered {
        if attributed.contains(&start) {
            continue;
        }
        match find_cycle_from(view, start, unordered) {
            Some(path) => {
                attributed.extend(path.iter().copied());
                cycles.push(path);
            }
            None => {
                attributed.insert(start);
            }
        }
    }

    cycles
}

/// Depth-first search restricted to the unordered subgraph, returning the
/// first closed path found via a recursion-stack membership check.
fn find_cycle_from<V: GraphView>(
    view: &V,
    start: NodeId,
    unordered: &IndexSet<NodeId>,
) -> Option<Vec<NodeId>> {
    let mut stack = Vec::new();
    let mut visited = HashSet::new();
    walk(view, start, unordered, &mut stack, &mut visited)
}

fn walk<V: GraphView>(
    view: &V,
    node: NodeId,
    unordered: &IndexSet<NodeId>,
    stack: &mut Vec<NodeId>,
    visited: &mut HashSet<NodeId>,
) -> Option<Vec<NodeId>> {
    visited.insert(node);
    stack.push(node);

    for next in view.dependents_of(node) {
        if !unordered.contains(&next) {
            continue;
        }
        if let Some(pos) = stack.iter().position(|&n| n == next) {
            // Back edge: close the path at the first stack occurrence.
            let mut path = stack[pos..].to_vec();
            path.push(next);
            return Some(path);
        }
        if !visited.contains(&next) {
            if let Some(path) = walk(view, next, unordered, stack, visited) {
                return Some(path);
            }
        }
    }

    stack.pop();
    None
}
