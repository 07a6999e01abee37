//! Strata Graph - incremental relative layout
//!
//! This crate maintains the layout graph of a diagram: a DAG whose
//! vertices are diagram shapes (plus dummy fillers) and whose edges point
//! from parent to child. On top of the DAG it keeps the data needed to
//! place new shapes next to existing ones without a full re-layout:
//!
//! - the rank (layer) of every vertex, by the longest-path rule
//! - a deterministic primary parent for every non-root vertex, and the
//!   derived primary children and siblings
//! - whether the graph is proper, i.e. every edge spans exactly one rank
//!
//! All of it is updated inside each mutation, touching only the part of
//! the graph the mutation can affect.
//!
//! # Example
//!
//! ```
//! use strata_graph::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new();
//! builder.set_up(&["P2<-C", "P1<-C"]).unwrap();
//!
//! let c = builder.id("C").unwrap();
//! let graph = builder.graph();
//! assert_eq!(graph.get_rank(c).unwrap(), 1);
//! assert_eq!(graph.get_primary_parent(c).unwrap().unwrap().name, "P1");
//! ```

mod builder;
mod config;
mod edge;
mod error;
mod graph;
mod primary;
mod proper;
mod rank;
mod snapshot;
mod vertex;

pub use builder::{BuildError, GraphBuilder, PATH_SEPARATOR};
pub use config::{ConfigError, LayoutConfig};
pub use edge::{Edge, EdgeSnapshot};
pub use error::{LayoutError, Result};
pub use graph::{GraphStats, RelativeLayoutGraph};
pub use primary::{choose_primary_parent, compare_candidates};
pub use snapshot::{LayoutSnapshot, VertexSnapshot};
pub use vertex::{
    IdAllocator, Vertex, VertexId, VertexKind, DEFAULT_DUMMY_PREFIX, DEFAULT_PRIORITY,
};
