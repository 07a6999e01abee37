//! Edge type for the layout graph.
//!
//! Edges always point from parent to child. The layout graph keeps no
//! payload on them; the pair of endpoints is the whole identity.

use crate::vertex::VertexId;
use serde::{Deserialize, Serialize};

/// A directed parent -> child relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub parent: VertexId,
    pub child: VertexId,
}

impl Edge {
    /// Creates a new edge.
    pub fn new(parent: VertexId, child: VertexId) -> Self {
        Self { parent, child }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.parent, self.child)
    }
}

/// An edge with endpoint names, for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub parent: String,
    pub child: String,
    /// Number of ranks the edge spans. 1 for a proper edge.
    pub span: usize,
}
