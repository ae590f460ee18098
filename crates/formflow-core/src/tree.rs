//! The form-element tree arena.
//!
//! [`FormTree`] holds one [`ElementNode`] per compiled form element, keyed
//! by its builder-assigned [`NodeId`]. Each element stores its parent's
//! *id*, not a reference, so ancestry walks are index-chasing over the
//! arena and the tree can never form a reference cycle. Pseudo nodes
//! (implicit dependencies) are never registered here -- that absence is
//! what scope resolution uses to tell them apart.
//!
//! Containers may declare "on-load" effects: the ids of side-effecting
//! operations (data loads) that run when the container is entered. Scope
//! resolution concatenates these down the ancestor chain.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::TreeError;
use crate::id::NodeId;

/// What kind of form element a tree node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Top-level journey container.
    Journey,
    /// One step (page) of a journey.
    Step,
    /// A grouping block inside a step.
    Block,
    /// A value-carrying field.
    Field,
    /// A computed expression.
    Expression,
    /// A side-effecting operation (e.g. a data load).
    Effect,
}

impl ElementKind {
    /// Returns `true` for container kinds that contribute a scope entry.
    pub fn is_scope(&self) -> bool {
        matches!(self, ElementKind::Journey | ElementKind::Step | ElementKind::Block)
    }

    /// Returns `true` for container kinds whose on-load declarations are
    /// visible to descendants.
    pub fn declares_on_load(&self) -> bool {
        matches!(self, ElementKind::Journey | ElementKind::Step)
    }
}

/// One element of the compiled form tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementNode {
    /// Builder-assigned identity.
    pub id: NodeId,
    /// Element kind.
    pub kind: ElementKind,
    /// Parent element. `None` for a root container.
    pub parent: Option<NodeId>,
    /// Declared on-load effect ids, in declaration order. Empty for
    /// elements that declare none.
    pub on_load: SmallVec<[NodeId; 4]>,
}

/// Arena of form elements indexed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormTree {
    elements: HashMap<NodeId, ElementNode>,
}

impl FormTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        FormTree {
            elements: HashMap::new(),
        }
    }

    /// Inserts an element under `parent` (`None` for a root).
    ///
    /// Returns [`TreeError::DuplicateElement`] if the id is already
    /// present, [`TreeError::ParentNotFound`] if the parent id is unknown.
    pub fn add_element(
        &mut self,
        id: NodeId,
        kind: ElementKind,
        parent: Option<NodeId>,
    ) -> Result<(), TreeError> {
        if self.elements.contains_key(&id) {
            return Err(TreeError::DuplicateElement { id });
        }
        if let Some(parent_id) = parent {
            if !self.elements.contains_key(&parent_id) {
                return Err(TreeError::ParentNotFound { id: parent_id });
            }
        }
        self.elements.insert(
            id,
            ElementNode {
                id,
                kind,
                parent,
                on_load: SmallVec::new(),
            },
        );
        Ok(())
    }

    /// Appends on-load effect ids to an element's declaration list.
    ///
    /// Returns [`TreeError::ElementNotFound`] if the element is unknown.
    pub fn declare_on_load(
        &mut self,
        id: NodeId,
        effects: impl IntoIterator<Item = NodeId>,
    ) -> Result<(), TreeError> {
        let element = self
            .elements
            .get_mut(&id)
            .ok_or(TreeError::ElementNotFound { id })?;
        element.on_load.extend(effects);
        Ok(())
    }

    /// Looks up an element by id.
    pub fn get(&self, id: NodeId) -> Option<&ElementNode> {
        self.elements.get(&id)
    }

    /// Returns `true` if the element is in the tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Parent id of an element. `None` for roots and unknown ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.elements.get(&id).and_then(|e| e.parent)
    }

    /// Kind of an element, if it is in the tree.
    pub fn kind_of(&self, id: NodeId) -> Option<ElementKind> {
        self.elements.get(&id).map(|e| e.kind)
    }

    /// Declared on-load effect ids of an element.
    ///
    /// Returns an empty slice for elements that declare none or ids the
    /// tree does not know.
    pub fn on_load_of(&self, id: NodeId) -> &[NodeId] {
        self.elements
            .get(&id)
            .map(|e| e.on_load.as_slice())
            .unwrap_or(&[])
    }

    /// Number of elements in the tree.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the tree has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates all elements in the arena.
    pub fn iter(&self) -> impl Iterator<Item = &ElementNode> {
        self.elements.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(raw: u32) -> NodeId {
        NodeId(raw)
    }

    fn journey_step_block() -> FormTree {
        let mut tree = FormTree::new();
        tree.add_element(n(1), ElementKind::Journey, None).unwrap();
        tree.add_element(n(2), ElementKind::Step, Some(n(1))).unwrap();
        tree.add_element(n(3), ElementKind::Block, Some(n(2))).unwrap();
        tree
    }

    #[test]
    fn parent_links_are_walkable_ids() {
        let tree = journey_step_block();
        assert_eq!(tree.parent_of(n(3)), Some(n(2)));
        assert_eq!(tree.parent_of(n(2)), Some(n(1)));
        assert_eq!(tree.parent_of(n(1)), None);
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut tree = FormTree::new();
        let result = tree.add_element(n(2), ElementKind::Step, Some(n(1)));
        assert!(matches!(
            result,
            Err(TreeError::ParentNotFound { id }) if id == n(1)
        ));
        assert!(tree.is_empty());
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut tree = FormTree::new();
        tree.add_element(n(1), ElementKind::Journey, None).unwrap();
        let result = tree.add_element(n(1), ElementKind::Step, None);
        assert!(matches!(
            result,
            Err(TreeError::DuplicateElement { id }) if id == n(1)
        ));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn on_load_declarations_accumulate_in_order() {
        let mut tree = journey_step_block();
        tree.declare_on_load(n(2), [n(10)]).unwrap();
        tree.declare_on_load(n(2), [n(11), n(12)]).unwrap();
        assert_eq!(tree.on_load_of(n(2)), &[n(10), n(11), n(12)]);
    }

    #[test]
    fn on_load_on_unknown_element_errors() {
        let mut tree = FormTree::new();
        let result = tree.declare_on_load(n(5), [n(10)]);
        assert!(matches!(
            result,
            Err(TreeError::ElementNotFound { id }) if id == n(5)
        ));
    }

    #[test]
    fn absent_on_load_reads_as_empty() {
        let tree = journey_step_block();
        assert!(tree.on_load_of(n(3)).is_empty());
        assert!(tree.on_load_of(n(99)).is_empty());
    }

    #[test]
    fn kind_predicates() {
        assert!(ElementKind::Journey.is_scope());
        assert!(ElementKind::Step.is_scope());
        assert!(ElementKind::Block.is_scope());
        assert!(!ElementKind::Field.is_scope());

        assert!(ElementKind::Journey.declares_on_load());
        assert!(ElementKind::Step.declares_on_load());
        assert!(!ElementKind::Block.declares_on_load());
        assert!(!ElementKind::Effect.declares_on_load());
    }

    #[test]
    fn serde_roundtrip() {
        let mut tree = journey_step_block();
        tree.declare_on_load(n(1), [n(20)]).unwrap();

        let json = serde_json::to_string(&tree).unwrap();
        let back: FormTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), tree.len());
        assert_eq!(back.parent_of(n(3)), Some(n(2)));
        assert_eq!(back.on_load_of(n(1)), &[n(20)]);
        assert_eq!(back.kind_of(n(2)), Some(ElementKind::Step));
    }
}
