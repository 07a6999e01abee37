//! Vertex types for the layout graph.
//!
//! A vertex is either a real diagram shape or a dummy filler that stands
//! in for one rank of a long edge. Both kinds carry the same attributes
//! and take part in ranking and primary-parent selection identically;
//! the kind only matters as a tie-break signal.

use serde::{Deserialize, Serialize};

/// Priority every vertex starts with unless its owner overrides it.
pub const DEFAULT_PRIORITY: i32 = 1;

/// Name prefix for dummy vertices.
pub const DEFAULT_DUMMY_PREFIX: &str = "*";

/// Stable identifier of a vertex. Never reused within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub u64);

impl VertexId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out monotonically increasing vertex ids.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id, or `None` once `u64::MAX` has been handed out
    /// or reserved.
    pub fn next_id(&mut self) -> Option<VertexId> {
        self.next = self.next.checked_add(1)?;
        Some(VertexId(self.next))
    }

    /// Makes sure ids handed out later are greater than `id`.
    pub fn reserve(&mut self, id: VertexId) {
        if id.0 > self.next {
            self.next = id.0;
        }
    }
}

/// What a vertex stands for in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexKind {
    /// An actual diagram shape.
    Real,

    /// A synthetic filler occupying one rank of an edge that spans several.
    Dummy,
}

impl std::fmt::Display for VertexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Real => "real",
            Self::Dummy => "dummy",
        };
        write!(f, "{}", s)
    }
}

/// A vertex in the layout graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,

    /// Used only for deterministic tie-breaking.
    pub name: String,

    /// Higher wins during primary-parent selection. Has no effect on rank.
    pub priority: i32,

    pub kind: VertexKind,
}

impl Vertex {
    /// Creates a real vertex with the default priority.
    pub fn real(id: VertexId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            priority: DEFAULT_PRIORITY,
            kind: VertexKind::Real,
        }
    }

    /// Creates a dummy vertex named after its id, e.g. `*7`.
    pub fn dummy(id: VertexId) -> Self {
        Self::dummy_with_prefix(id, DEFAULT_DUMMY_PREFIX)
    }

    pub fn dummy_with_prefix(id: VertexId, prefix: &str) -> Self {
        Self {
            id,
            name: format!("{}{}", prefix, id.0),
            priority: DEFAULT_PRIORITY,
            kind: VertexKind::Dummy,
        }
    }

    /// Sets the priority (builder style).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_dummy(&self) -> bool {
        self.kind == VertexKind::Dummy
    }
}

impl std::fmt::Display for Vertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
