//! Graph builder for constructing layout graphs from path notation.
//!
//! A path such as `P1<-C1<-C2` reads "P1 is the parent of C1, which is the
//! parent of C2". Vertices are created on first mention; names starting
//! with the dummy prefix (`*` by default) become dummy vertices.
//!
//! The text format accepted by [`GraphBuilder::parse`] has one path per
//! line, plus `priority NAME N` directives. Blank lines and lines starting
//! with `#` are ignored:
//!
//! ```text
//! # Orders and their lines
//! priority Order 2
//! Customer<-Order<-OrderLine
//! Product<-OrderLine
//! ```

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::graph::RelativeLayoutGraph;
use crate::vertex::{Vertex, VertexId, VertexKind};
use std::collections::HashMap;
use thiserror::Error;

/// Separator between a parent (left) and its child (right).
pub const PATH_SEPARATOR: &str = "<-";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Builds a `RelativeLayoutGraph` from vertex names and paths.
pub struct GraphBuilder {
    graph: RelativeLayoutGraph,
    /// Maps names to vertex ids for path resolution.
    name_to_id: HashMap<String, VertexId>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            graph: RelativeLayoutGraph::with_config(config),
            name_to_id: HashMap::new(),
        }
    }

    /// Returns the id of the vertex called `name`, creating it if needed.
    ///
    /// A name whose vertex was removed through [`graph_mut`](Self::graph_mut)
    /// gets a new vertex with a fresh id.
    pub fn add_vertex(&mut self, name: &str) -> Result<VertexId, LayoutError> {
        if let Some(&id) = self.name_to_id.get(name) {
            if self.graph.contains_vertex(id) {
                return Ok(id);
            }
            self.name_to_id.remove(name);
        }

        let config = self.graph.config();
        let prefix = config.dummy_prefix.as_str();
        let kind = if !prefix.is_empty() && name.starts_with(prefix) {
            VertexKind::Dummy
        } else {
            VertexKind::Real
        };
        let priority = config.default_priority;

        let id = self.graph.allocate_id()?;
        let vertex = Vertex {
            id,
            name: name.to_string(),
            priority,
            kind,
        };
        self.graph.add_vertex(vertex)?;
        self.name_to_id.insert(name.to_string(), id);
        Ok(id)
    }

    /// Sets the priority of `name`, creating the vertex if needed.
    pub fn set_priority(&mut self, name: &str, priority: i32) -> Result<(), LayoutError> {
        let id = self.add_vertex(name)?;
        self.graph.set_priority(id, priority)
    }

    /// Adds every vertex and edge of a path. Edges already present are kept.
    pub fn add_path(&mut self, path: &str) -> Result<(), BuildError> {
        self.add_path_at(path, 0)
    }

    /// Adds several paths in order.
    pub fn set_up(&mut self, paths: &[&str]) -> Result<(), BuildError> {
        for path in paths {
            self.add_path(path)?;
        }
        Ok(())
    }

    /// Parses the line format described in the module docs.
    pub fn parse(&mut self, text: &str) -> Result<(), BuildError> {
        for (number, raw) in text.lines().enumerate() {
            let line = number + 1;
            let content = raw.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }

            let mut words = content.split_whitespace();
            if words.next() == Some("priority") {
                let (name, value) = match (words.next(), words.next(), words.next()) {
                    (Some(name), Some(value), None) => (name, value),
                    _ => {
                        return Err(BuildError::Syntax {
                            line,
                            message: "expected `priority NAME N`".to_string(),
                        })
                    }
                };
                let priority: i32 = value.parse().map_err(|_| BuildError::Syntax {
                    line,
                    message: format!("invalid priority `{}`", value),
                })?;
                self.set_priority(name, priority)?;
            } else {
                self.add_path_at(content, line)?;
            }
        }
        Ok(())
    }

    fn add_path_at(&mut self, path: &str, line: usize) -> Result<(), BuildError> {
        let names: Vec<&str> = path.split(PATH_SEPARATOR).map(str::trim).collect();
        if names.iter().any(|name| name.is_empty() || name.contains(char::is_whitespace)) {
            return Err(BuildError::Syntax {
                line,
                message: format!("malformed path `{}`", path),
            });
        }

        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            ids.push(self.add_vertex(name)?);
        }
        for pair in ids.windows(2) {
            let (parent, child) = (pair[0], pair[1]);
            if !self.graph.contains_edge(parent, child) {
                self.graph.add_edge(parent, child)?;
            }
        }
        Ok(())
    }

    /// Looks up a vertex created by this builder.
    pub fn get_vertex(&self, name: &str) -> Option<&Vertex> {
        self.graph.vertex(self.id(name)?)
    }

    pub fn id(&self, name: &str) -> Option<VertexId> {
        self.name_to_id
            .get(name)
            .copied()
            .filter(|&id| self.graph.contains_vertex(id))
    }

    pub fn graph(&self) -> &RelativeLayoutGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut RelativeLayoutGraph {
        &mut self.graph
    }

    /// Finishes building and returns the graph.
    pub fn build(self) -> RelativeLayoutGraph {
        self.graph
    }
}
