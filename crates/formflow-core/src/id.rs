//! Stable node identity.
//!
//! [`NodeId`] is a newtype over `u32` identifying one element of the
//! compiled form tree (or a pseudo node standing in for an implicit
//! dependency). Ids are assigned by the external builder and treated as
//! opaque keys here -- the graph never generates one, and uniqueness within
//! a compilation unit is the builder's responsibility.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, builder-assigned identity for one node of the form tree.
///
/// Distinct from the petgraph `NodeIndex` used internally for storage:
/// indices are dense and allocation-ordered, ids are whatever the builder
/// handed us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(raw: u32) -> Self {
        NodeId(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display() {
        assert_eq!(format!("{}", NodeId(7)), "7");
    }

    #[test]
    fn node_id_ordering() {
        assert!(NodeId(1) < NodeId(2));
        assert_eq!(NodeId(3), NodeId(3));
    }

    #[test]
    fn serde_roundtrip() {
        let id = NodeId(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
