//! Typed dependency edges.
//!
//! Every edge means "the source must be resolved before the target"; the
//! [`EdgeKind`] records *why*. The four kinds are first-class and
//! independently queryable -- a consumer asking "what does this field read"
//! cares about data flow, while the renderer cares about containment.
//! Multiple edges of different kinds (or with different metadata) may exist
//! between the same ordered pair of nodes; they are stored as independent
//! records and never merged.

use serde::{Deserialize, Serialize};

/// The relationship kind carried by a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Parent-to-child containment (container before contained element).
    Structural,
    /// A consumer depends on a value producer.
    DataFlow,
    /// A dependent construct depends on its guarding condition.
    ControlFlow,
    /// A consumer depends on the side-effecting operation that populates
    /// the value it reads.
    EffectFlow,
}

impl EdgeKind {
    /// Returns `true` for containment edges.
    pub fn is_structural(&self) -> bool {
        matches!(self, EdgeKind::Structural)
    }

    /// Returns `true` for value-dependency edges.
    pub fn is_data_flow(&self) -> bool {
        matches!(self, EdgeKind::DataFlow)
    }

    /// Returns `true` for guard-dependency edges.
    pub fn is_control_flow(&self) -> bool {
        matches!(self, EdgeKind::ControlFlow)
    }

    /// Returns `true` for side-effect dependency edges.
    pub fn is_effect_flow(&self) -> bool {
        matches!(self, EdgeKind::EffectFlow)
    }
}

/// One directed dependency record between an ordered pair of nodes.
///
/// `metadata` is free-form diagnostic text (typically the property name
/// that created the dependency). It is carried verbatim and never
/// interpreted by the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The relationship kind.
    pub kind: EdgeKind,
    /// Diagnostic annotation from the builder, if any.
    pub metadata: Option<String>,
}

impl DependencyEdge {
    /// Creates an edge record with no metadata.
    pub fn new(kind: EdgeKind) -> Self {
        DependencyEdge {
            kind,
            metadata: None,
        }
    }

    /// Creates an edge record annotated with diagnostic metadata.
    pub fn with_metadata(kind: EdgeKind, metadata: impl Into<String>) -> Self {
        DependencyEdge {
            kind,
            metadata: Some(metadata.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_predicates() {
        assert!(EdgeKind::Structural.is_structural());
        assert!(EdgeKind::DataFlow.is_data_flow());
        assert!(EdgeKind::ControlFlow.is_control_flow());
        assert!(EdgeKind::EffectFlow.is_effect_flow());
        assert!(!EdgeKind::DataFlow.is_control_flow());
    }

    #[test]
    fn with_metadata_carries_annotation() {
        let edge = DependencyEdge::with_metadata(EdgeKind::DataFlow, "visibleWhen");
        assert_eq!(edge.kind, EdgeKind::DataFlow);
        assert_eq!(edge.metadata.as_deref(), Some("visibleWhen"));
    }

    #[test]
    fn plain_edge_has_no_metadata() {
        let edge = DependencyEdge::new(EdgeKind::Structural);
        assert!(edge.metadata.is_none());
    }

    #[test]
    fn serde_roundtrip() {
        let edge = DependencyEdge::with_metadata(EdgeKind::EffectFlow, "loadsInto");
        let json = serde_json::to_string(&edge).unwrap();
        let back: DependencyEdge = serde_json::from_str(&json).unwrap();
        assert_eq!(edge, back);
    }
}
