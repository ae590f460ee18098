//! Staged additions over a committed graph.
//!
//! Incremental re-compilation of a changed subtree should not have to
//! rebuild the whole dependency graph, and must be able to throw staged
//! work away if the changed subtree turns out to be cyclic.
//! [`OverlayGraph`] wraps a committed [`DependencyGraph`] and an initially
//! empty pending one: writes land in pending, reads answer over the union
//! of both layers, and the staged work is either flushed into the committed
//! graph in one step or discarded.
//!
//! The two layers are separate owned instances behind the shared
//! [`GraphView`] trait -- nothing is inherited or overridden, so the union
//! semantics are explicit in every query. An overlay's identity is tied to
//! its specific committed+pending pairing; it deliberately does not
//! implement `Clone` (clone the committed graph instead).

use indexmap::IndexSet;
use tracing::debug;

use crate::edge::{DependencyEdge, EdgeKind};
use crate::graph::{DependencyGraph, GraphView};
use crate::id::NodeId;
use crate::topo::TopoResult;

/// A committed graph plus a pending write buffer, queried as one.
#[derive(Debug, Default)]
pub struct OverlayGraph {
    committed: DependencyGraph,
    pending: DependencyGraph,
}

impl OverlayGraph {
    /// Wraps a committed graph. The pending layer starts empty.
    pub fn new(committed: DependencyGraph) -> Self {
        OverlayGraph {
            committed,
            pending: DependencyGraph::new(),
        }
    }

    /// Read access to the committed layer.
    pub fn committed(&self) -> &DependencyGraph {
        &self.committed
    }

    /// Read access to the pending layer.
    pub fn pending(&self) -> &DependencyGraph {
        &self.pending
    }

    /// Consumes the overlay, returning the committed graph. Pending work
    /// that was not flushed is dropped.
    pub fn into_committed(self) -> DependencyGraph {
        self.committed
    }

    // -----------------------------------------------------------------------
    // Staging writes
    // -----------------------------------------------------------------------

    /// Registers a node in the pending layer. The committed graph is never
    /// mutated by staging.
    pub fn add_node(&mut self, id: NodeId) {
        self.pending.add_node(id);
    }

    /// Appends an edge record to the pending layer, registering both
    /// endpoints there (even if the committed layer already knows them --
    /// the union deduplicates).
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: EdgeKind,
        metadata: Option<String>,
    ) {
        self.pending.add_edge(from, to, kind, metadata);
    }

    // -----------------------------------------------------------------------
    // Commit / discard
    // -----------------------------------------------------------------------

    /// Replays every pending node and edge into the committed graph, then
    /// clears the pending layer.
    pub fn flush_into_main(&mut self) {
        debug!(
            nodes = self.pending.node_count(),
            edges = self.pending.edge_count(),
            "flushing pending layer into committed graph"
        );
        for id in self.pending.nodes() {
            self.committed.add_node(id);
        }
        for (from, to, edge) in self.pending.all_edges() {
            self.committed
                .add_edge(from, to, edge.kind, edge.metadata.clone());
        }
        self.pending = DependencyGraph::new();
    }

    /// Discards staged work without committing it.
    pub fn clear_pending(&mut self) {
        self.pending = DependencyGraph::new();
    }

    // -----------------------------------------------------------------------
    // Sorts
    // -----------------------------------------------------------------------

    /// Sorts the committed+pending union, fresh each call.
    pub fn topological_sort(&self) -> TopoResult {
        crate::topo::sort(self)
    }

    /// Sorts only the pending layer -- relative order among newly staged
    /// nodes at lower cost than a full union sort.
    pub fn topological_sort_pending(&self) -> TopoResult {
        self.pending.topological_sort()
    }
}

impl GraphView for OverlayGraph {
    fn has_node(&self, id: NodeId) -> bool {
        self.committed.has_node(id) || self.pending.has_node(id)
    }

    fn node_count(&self) -> usize {
        self.nodes().len()
    }

    fn nodes(&self) -> IndexSet<NodeId> {
        let mut union = self.committed.nodes();
        union.extend(self.pending.nodes());
        union
    }

    fn dependents_of(&self, id: NodeId) -> IndexSet<NodeId> {
        let mut union = self.committed.dependents_of(id);
        union.extend(self.pending.dependents_of(id));
        union
    }

    fn dependencies_of(&self, id: NodeId) -> IndexSet<NodeId> {
        let mut union = self.committed.dependencies_of(id);
        union.extend(self.pending.dependencies_of(id));
        union
    }

    fn edges_between(&self, from: NodeId, to: NodeId) -> Vec<DependencyEdge> {
        let mut records = self.committed.edges_between(from, to);
        records.extend(self.pending.edges_between(from, to));
        records
    }
}
