//! Scope-chain and on-load-chain resolution.
//!
//! Starting at a target node, the resolver follows the single parent link
//! up to the root, collecting every enclosing container outermost-first.
//! Containers that declare on-load effects (journeys and steps) contribute
//! their declared effect ids in the same outermost-first order, so the
//! resulting chain lists each effect in the order it would have run by the
//! time the target node is evaluated.
//!
//! Nodes the tree does not know -- pseudo nodes standing in for implicit
//! dependencies -- have no ancestry and resolve to an absent scope. Scope
//! resolution is independent of the dependency graph and its sort result.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use formflow_core::{ElementKind, FormTree, NodeId};

/// Read access to the element tree, as much of it as resolution needs:
/// one parent link per node, a kind per node, and per-container on-load
/// declarations.
pub trait ElementLookup {
    /// Parent of `id`. `None` for roots and unknown ids.
    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Kind of `id`, or `None` if the tree does not know the node.
    fn kind(&self, id: NodeId) -> Option<ElementKind>;

    /// Declared on-load effect ids of `id`, in declaration order.
    /// Absent or malformed declarations read as empty.
    fn on_load(&self, id: NodeId) -> Vec<NodeId>;
}

impl ElementLookup for FormTree {
    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent_of(id)
    }

    fn kind(&self, id: NodeId) -> Option<ElementKind> {
        self.kind_of(id)
    }

    fn on_load(&self, id: NodeId) -> Vec<NodeId> {
        self.on_load_of(id).to_vec()
    }
}

/// One enclosing container in a scope chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeEntry {
    /// The container's id.
    pub node: NodeId,
    /// The container's kind.
    pub kind: ElementKind,
}

/// Everything lexically visible at one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeInfo {
    /// Enclosing containers, outermost first.
    pub scope_chain: Vec<ScopeEntry>,
    /// Ancestor-declared on-load effect ids, outermost first.
    pub on_load_chain: Vec<NodeId>,
}

/// Resolves scope and effect visibility against an element tree.
#[derive(Debug)]
pub struct ScopeResolver<'a, T> {
    tree: &'a T,
}

impl<'a, T: ElementLookup> ScopeResolver<'a, T> {
    /// Borrows the tree for the duration of resolution.
    pub fn new(tree: &'a T) -> Self {
        ScopeResolver { tree }
    }

    /// Computes the scope visible at `id`.
    ///
    /// Returns `None` for nodes the tree does not know (pseudo/implicit
    /// nodes carry no ancestry). The walk starts at the target node itself,
    /// so a container queried directly is its own innermost scope entry.
    pub fn scope_of(&self, id: NodeId) -> Option<ScopeInfo> {
        self.tree.kind(id)?;

        // Ancestry, target first. Parent links are builder-supplied ids;
        // a malformed link could loop, so refuse to revisit a node.
        let mut ancestry = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if !seen.insert(node) {
                break;
            }
            ancestry.push(node);
            cursor = self.tree.parent(node);
        }

        let mut scope_chain = Vec::new();
        let mut on_load_chain = Vec::new();
        for &node in ancestry.iter().rev() {
            let Some(kind) = self.tree.kind(node) else {
                continue;
            };
            if kind.is_scope() {
                scope_chain.push(ScopeEntry { node, kind });
            }
            if kind.declares_on_load() {
                on_load_chain.extend(self.tree.on_load(node));
            }
        }

        Some(ScopeInfo {
            scope_chain,
            on_load_chain,
        })
    }

    /// The effect-chain portion of [`scope_of`](Self::scope_of), empty when
    /// no scope exists.
    pub fn on_load_chain(&self, id: NodeId) -> Vec<NodeId> {
        self.scope_of(id)
            .map(|info| info.on_load_chain)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(raw: u32) -> NodeId {
        NodeId(raw)
    }

    /// Journey(1) -> Step(2) -> Block(3) -> Field(4), with on-load effects
    /// e1 = 20 on the journey and e2 = 21 on the step.
    fn claim_tree() -> FormTree {
        let mut tree = FormTree::new();
        tree.add_element(n(1), ElementKind::Journey, None).unwrap();
        tree.add_element(n(2), ElementKind::Step, Some(n(1))).unwrap();
        tree.add_element(n(3), ElementKind::Block, Some(n(2))).unwrap();
        tree.add_element(n(4), ElementKind::Field, Some(n(3))).unwrap();
        tree.declare_on_load(n(1), [n(20)]).unwrap();
        tree.declare_on_load(n(2), [n(21)]).unwrap();
        tree
    }

    #[test]
    fn field_sees_outermost_first_chain() {
        let tree = claim_tree();
        let resolver = ScopeResolver::new(&tree);

        let info = resolver.scope_of(n(4)).unwrap();
        let chain: Vec<NodeId> = info.scope_chain.iter().map(|e| e.node).collect();
        assert_eq!(chain, vec![n(1), n(2), n(3)]);
        assert_eq!(info.scope_chain[0].kind, ElementKind::Journey);
        assert_eq!(info.scope_chain[2].kind, ElementKind::Block);
        assert_eq!(info.on_load_chain, vec![n(20), n(21)]);
    }

    #[test]
    fn pseudo_node_has_no_scope() {
        let tree = claim_tree();
        let resolver = ScopeResolver::new(&tree);
        assert!(resolver.scope_of(n(99)).is_none());
        assert!(resolver.on_load_chain(n(99)).is_empty());
    }

    #[test]
    fn container_is_its_own_innermost_scope() {
        let tree = claim_tree();
        let resolver = ScopeResolver::new(&tree);

        let info = resolver.scope_of(n(3)).unwrap();
        let chain: Vec<NodeId> = info.scope_chain.iter().map(|e| e.node).collect();
        assert_eq!(chain, vec![n(1), n(2), n(3)]);
    }

    #[test]
    fn root_journey_scopes_to_itself() {
        let tree = claim_tree();
        let resolver = ScopeResolver::new(&tree);

        let info = resolver.scope_of(n(1)).unwrap();
        let chain: Vec<NodeId> = info.scope_chain.iter().map(|e| e.node).collect();
        assert_eq!(chain, vec![n(1)]);
        assert_eq!(info.on_load_chain, vec![n(20)]);
    }

    #[test]
    fn block_on_load_declarations_are_not_visible() {
        // Blocks contribute scope entries but their on-load lists are not
        // part of the visible chain.
        let mut tree = claim_tree();
        tree.declare_on_load(n(3), [n(30)]).unwrap();

        let resolver = ScopeResolver::new(&tree);
        let info = resolver.scope_of(n(4)).unwrap();
        assert_eq!(info.on_load_chain, vec![n(20), n(21)]);
    }

    #[test]
    fn step_effects_come_after_journey_effects() {
        let mut tree = claim_tree();
        tree.declare_on_load(n(1), [n(22)]).unwrap();

        let resolver = ScopeResolver::new(&tree);
        // Journey declares [20, 22], step declares [21]; closer ancestors
        // appear later.
        assert_eq!(resolver.on_load_chain(n(4)), vec![n(20), n(22), n(21)]);
    }

    #[test]
    fn non_container_ancestors_contribute_nothing() {
        // Field(4) -> Expression(5): the expression's chain is the same as
        // the field's, the field adds no scope entry.
        let mut tree = claim_tree();
        tree.add_element(n(5), ElementKind::Expression, Some(n(4)))
            .unwrap();

        let resolver = ScopeResolver::new(&tree);
        let info = resolver.scope_of(n(5)).unwrap();
        let chain: Vec<NodeId> = info.scope_chain.iter().map(|e| e.node).collect();
        assert_eq!(chain, vec![n(1), n(2), n(3)]);
    }

    /// Lookup with deliberately cyclic parent links, for the termination
    /// guard. A well-formed [`FormTree`] cannot be built into this shape.
    struct CyclicLookup;

    impl ElementLookup for CyclicLookup {
        fn parent(&self, id: NodeId) -> Option<NodeId> {
            Some(NodeId(1 - id.0))
        }

        fn kind(&self, _id: NodeId) -> Option<ElementKind> {
            Some(ElementKind::Block)
        }

        fn on_load(&self, _id: NodeId) -> Vec<NodeId> {
            Vec::new()
        }
    }

    #[test]
    fn malformed_parent_cycle_terminates() {
        let resolver = ScopeResolver::new(&CyclicLookup);
        let info = resolver.scope_of(NodeId(0)).unwrap();
        assert_eq!(info.scope_chain.len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let tree = claim_tree();
        let resolver = ScopeResolver::new(&tree);
        let info = resolver.scope_of(n(4)).unwrap();

        let json = serde_json::to_string(&info).unwrap();
        let back: ScopeInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}
