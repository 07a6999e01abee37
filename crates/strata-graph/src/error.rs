use crate::vertex::VertexId;
use thiserror::Error;

/// Errors raised by graph mutations and queries.
///
/// None of these leave the graph partially modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unknown vertex {0}")]
    UnknownVertex(VertexId),
    #[error("vertex {0} already exists")]
    DuplicateVertex(VertexId),
    #[error("no edge {parent}->{child}")]
    UnknownEdge { parent: VertexId, child: VertexId },
    #[error("edge {parent}->{child} already exists")]
    DuplicateEdge { parent: VertexId, child: VertexId },
    #[error("edge from {0} to itself")]
    SelfLoop(VertexId),
    #[error("edge {parent}->{child} would close a cycle")]
    CycleDetected { parent: VertexId, child: VertexId },
    #[error("priority of dummy vertex {0} cannot be changed")]
    DummyPriority(VertexId),
    #[error("no vertex ids left to allocate")]
    IdsExhausted,
}

pub type Result<T> = std::result::Result<T, LayoutError>;
