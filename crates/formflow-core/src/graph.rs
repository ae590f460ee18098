//! The typed dependency graph.
//!
//! [`DependencyGraph`] is a pure relationship index: it stores builder-
//! assigned [`NodeId`]s and directed, typed [`DependencyEdge`]s between
//! them, and answers adjacency queries. It owns no element payloads.
//!
//! Storage is a petgraph `StableGraph` whose node weights are the external
//! ids, plus a `HashMap` bridging external id to internal index. All
//! mutation goes through [`add_node`](DependencyGraph::add_node) /
//! [`add_edge`](DependencyGraph::add_edge); queries hand out owned copies,
//! so callers can never reach internal state through a getter.
//!
//! There is no "invalid graph": an edge naming an unregistered node simply
//! registers it, and cyclic input is reported by the sort rather than
//! rejected. [`GraphView`] is the narrow read contract shared with
//! [`OverlayGraph`](crate::overlay::OverlayGraph), and carries the
//! topological sort as a default method so the same algorithm runs over a
//! plain graph or a committed+pending union.

use std::collections::HashMap;

use indexmap::IndexSet;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};

use crate::edge::{DependencyEdge, EdgeKind};
use crate::id::NodeId;
use crate::topo::{self, TopoResult};

/// Narrow read contract over a dependency graph.
///
/// Implemented by [`DependencyGraph`] directly and by
/// [`OverlayGraph`](crate::overlay::OverlayGraph) as the union of its
/// committed and pending layers. [`topological_sort`](GraphView::topological_sort)
/// is defined once, here, in terms of the other queries.
pub trait GraphView {
    /// Returns `true` if the node is registered.
    fn has_node(&self, id: NodeId) -> bool;

    /// Number of registered nodes.
    fn node_count(&self) -> usize;

    /// All registered nodes, in registration order. Owned copy.
    fn nodes(&self) -> IndexSet<NodeId>;

    /// Distinct nodes that must be evaluated after `id` (targets of its
    /// outgoing edges, kind-agnostic). Empty for unknown nodes.
    fn dependents_of(&self, id: NodeId) -> IndexSet<NodeId>;

    /// Distinct nodes that must be evaluated before `id` (sources of its
    /// incoming edges, kind-agnostic). Empty for unknown nodes.
    fn dependencies_of(&self, id: NodeId) -> IndexSet<NodeId>;

    /// Every edge record between the ordered pair, in insertion order.
    fn edges_between(&self, from: NodeId, to: NodeId) -> Vec<DependencyEdge>;

    /// Orders the graph for evaluation; cycles are reported, never raised.
    fn topological_sort(&self) -> TopoResult
    where
        Self: Sized,
    {
        topo::sort(self)
    }
}

/// Directed, typed dependency graph over builder-assigned node ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    /// Edge storage. Node weights are the external ids so adjacency
    /// queries can translate back without a reverse map.
    graph: StableGraph<NodeId, DependencyEdge, Directed, u32>,
    /// External id -> internal index bridge.
    indices: HashMap<NodeId, NodeIndex<u32>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        DependencyGraph {
            graph: StableGraph::new(),
            indices: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Registers a node. Idempotent; re-adding an existing id is a no-op.
    pub fn add_node(&mut self, id: NodeId) {
        self.ensure_node(id);
    }

    /// Appends a new edge record from `from` to `to`.
    ///
    /// Both endpoints are registered if not already present. Existing edges
    /// between the pair are never overwritten or merged -- each call stores
    /// one more record. Self-edges are permitted and sort as a one-node
    /// cycle.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: EdgeKind,
        metadata: Option<String>,
    ) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);
        self.graph
            .add_edge(from_idx, to_idx, DependencyEdge { kind, metadata });
    }

    fn ensure_node(&mut self, id: NodeId) -> NodeIndex<u32> {
        match self.indices.get(&id) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(id);
                self.indices.insert(id, idx);
                idx
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Returns `true` if the node is registered.
    pub fn has_node(&self, id: NodeId) -> bool {
        self.indices.contains_key(&id)
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Total number of edge records.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All registered nodes, in registration order. Owned copy.
    pub fn nodes(&self) -> IndexSet<NodeId> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx])
            .collect()
    }

    /// Distinct successors of `id`. Empty for unknown nodes.
    pub fn dependents_of(&self, id: NodeId) -> IndexSet<NodeId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Distinct predecessors of `id`. Empty for unknown nodes.
    pub fn dependencies_of(&self, id: NodeId) -> IndexSet<NodeId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: NodeId, dir: Direction) -> IndexSet<NodeId> {
        match self.indices.get(&id) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, dir)
                .map(|n| self.graph[n])
                .collect(),
            None => IndexSet::new(),
        }
    }

    /// Every edge record between the ordered pair, in insertion order.
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> Vec<DependencyEdge> {
        let (Some(&from_idx), Some(&to_idx)) =
            (self.indices.get(&from), self.indices.get(&to))
        else {
            return Vec::new();
        };
        // edges_connecting iterates newest-first; sort by edge index to
        // recover insertion order (indices are monotonic, nothing is ever
        // removed).
        let mut records: Vec<_> = self
            .graph
            .edges_connecting(from_idx, to_idx)
            .map(|e| (e.id(), e.weight().clone()))
            .collect();
        records.sort_by_key(|(id, _)| *id);
        records.into_iter().map(|(_, edge)| edge).collect()
    }

    /// Iterates every edge record as `(from, to, edge)`, in insertion order.
    pub fn all_edges(&self) -> impl Iterator<Item = (NodeId, NodeId, &DependencyEdge)> + '_ {
        self.graph.edge_indices().map(move |idx| {
            let (a, b) = self
                .graph
                .edge_endpoints(idx)
                .expect("edge index from live iterator");
            (self.graph[a], self.graph[b], &self.graph[idx])
        })
    }

    /// Orders the graph for evaluation; cycles are reported, never raised.
    pub fn topological_sort(&self) -> TopoResult {
        topo::sort(self)
    }
}

impl GraphView for DependencyGraph {
    fn has_node(&self, id: NodeId) -> bool {
        DependencyGraph::has_node(self, id)
    }

    fn node_count(&self) -> usize {
        DependencyGraph::node_count(self)
    }

    fn nodes(&self) -> IndexSet<NodeId> {
        DependencyGraph::nodes(self)
    }

    fn dependents_of(&self, id: NodeId) -> IndexSet<NodeId> {
        DependencyGraph::dependents_of(self, id)
    }

    fn dependencies_of(&self, id: NodeId) -> IndexSet<NodeId> {
        DependencyGraph::dependencies_of(self, id)
    }

    fn edges_between(&self, from: NodeId, to: NodeId) -> Vec<DependencyEdge> {
        DependencyGraph::edges_between(self, from, to)
    }
}
