//! Core error types for formflow-core.
//!
//! The dependency graph itself has no failure states -- unknown endpoints
//! are auto-registered and cycles are a reportable result. The only typed
//! errors belong to the element tree arena, whose inserts can genuinely
//! fail.

use crate::id::NodeId;
use thiserror::Error;

/// Errors produced by [`FormTree`](crate::tree::FormTree) mutations.
#[derive(Debug, Error)]
pub enum TreeError {
    /// An element referenced a parent id that is not in the tree.
    #[error("parent element not found: NodeId({id})", id = id.0)]
    ParentNotFound { id: NodeId },

    /// An element id was inserted twice.
    #[error("duplicate element: NodeId({id})", id = id.0)]
    DuplicateElement { id: NodeId },

    /// A declaration targeted an element that is not in the tree.
    #[error("element not found: NodeId({id})", id = id.0)]
    ElementNotFound { id: NodeId },
}
