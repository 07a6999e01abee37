//! Core graph data structure.
//!
//! `RelativeLayoutGraph` wraps a petgraph `StableDiGraph` and keeps, next
//! to it, the derived layout data the orchestrator asks for: the rank of
//! every vertex and the primary parent/children relation. Derived data is
//! updated inside each mutating call, limited to the part of the graph the
//! mutation can reach, so it is never stale when queried.

use crate::config::LayoutConfig;
use crate::edge::Edge;
use crate::error::{LayoutError, Result};
use crate::vertex::{IdAllocator, Vertex, VertexId};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// The relative-layout graph.
///
/// A DAG of diagram vertices with incrementally maintained ranks and a
/// deterministic primary-parent backbone.
#[derive(Debug, Clone)]
pub struct RelativeLayoutGraph {
    /// The underlying petgraph graph. Edges carry no payload.
    pub(crate) graph: StableDiGraph<Vertex, ()>,

    /// Maps vertex ids to graph node indexes.
    id_index: HashMap<VertexId, NodeIndex>,

    /// Maps vertex names to ids (for lookups by name).
    name_index: HashMap<String, Vec<VertexId>>,

    /// Longest-path rank of every vertex.
    pub(crate) ranks: HashMap<NodeIndex, usize>,

    /// Chosen parent of every non-root vertex.
    pub(crate) primary_parent: HashMap<NodeIndex, NodeIndex>,

    /// Inverse of `primary_parent`.
    pub(crate) primary_children: HashMap<NodeIndex, HashSet<NodeIndex>>,

    ids: IdAllocator,

    config: LayoutConfig,
}

impl Default for RelativeLayoutGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RelativeLayoutGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            graph: StableDiGraph::new(),
            id_index: HashMap::new(),
            name_index: HashMap::new(),
            ranks: HashMap::new(),
            primary_parent: HashMap::new(),
            primary_children: HashMap::new(),
            ids: IdAllocator::new(),
            config,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Returns an id no vertex of this graph has used.
    pub fn allocate_id(&mut self) -> Result<VertexId> {
        self.ids.next_id().ok_or(LayoutError::IdsExhausted)
    }

    /// Adds a vertex with no edges. It starts as a root at rank 0.
    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<VertexId> {
        if self.id_index.contains_key(&vertex.id) {
            return Err(LayoutError::DuplicateVertex(vertex.id));
        }

        debug!(id = %vertex.id, name = %vertex.name, kind = %vertex.kind, "add vertex");
        let id = vertex.id;
        self.ids.reserve(id);
        self.insert_node(vertex);
        Ok(id)
    }

    /// Stores a vertex whose id is known to be fresh.
    pub(crate) fn insert_node(&mut self, vertex: Vertex) -> NodeIndex {
        let id = vertex.id;
        let name = vertex.name.clone();

        let index = self.graph.add_node(vertex);

        // Update indexes
        self.id_index.insert(id, index);
        self.name_index.entry(name).or_default().push(id);
        self.ranks.insert(index, 0);

        index
    }

    /// Removes a vertex together with every edge touching it.
    ///
    /// Former children are re-ranked from their remaining parents and get
    /// their primary parent chosen again.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<Vertex> {
        let index = self.index_of(id)?;
        let children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .collect();

        self.forget_primary(index);
        self.ranks.remove(&index);
        let vertex = self
            .graph
            .remove_node(index)
            .ok_or(LayoutError::UnknownVertex(id))?;

        self.id_index.remove(&id);
        if let Some(ids) = self.name_index.get_mut(&vertex.name) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                self.name_index.remove(&vertex.name);
            }
        }

        for &child in &children {
            self.select_primary_parent(child);
        }
        self.rerank(&children);

        debug!(%id, name = %vertex.name, children = children.len(), "removed vertex");
        Ok(vertex)
    }

    /// Adds a parent -> child edge.
    ///
    /// The edge is rejected, and the graph left untouched, when it would be
    /// a self-loop, a duplicate, or close a cycle.
    pub fn add_edge(&mut self, parent: VertexId, child: VertexId) -> Result<()> {
        let p = self.index_of(parent)?;
        let c = self.index_of(child)?;

        if p == c {
            return Err(LayoutError::SelfLoop(parent));
        }
        if self.graph.find_edge(p, c).is_some() {
            return Err(LayoutError::DuplicateEdge { parent, child });
        }
        if petgraph::algo::has_path_connecting(&self.graph, c, p, None) {
            warn!(%parent, %child, "rejected edge closing a cycle");
            return Err(LayoutError::CycleDetected { parent, child });
        }

        self.graph.add_edge(p, c, ());
        self.select_primary_parent(c);
        self.rerank(&[c]);

        debug!(%parent, %child, rank = self.rank_of(c), "added edge");
        Ok(())
    }

    /// Removes a parent -> child edge.
    pub fn remove_edge(&mut self, parent: VertexId, child: VertexId) -> Result<()> {
        let p = self.index_of(parent)?;
        let c = self.index_of(child)?;

        let edge = self
            .graph
            .find_edge(p, c)
            .ok_or(LayoutError::UnknownEdge { parent, child })?;
        self.graph.remove_edge(edge);

        self.select_primary_parent(c);
        self.rerank(&[c]);

        debug!(%parent, %child, rank = self.rank_of(c), "removed edge");
        Ok(())
    }

    /// Changes the priority of a real vertex.
    ///
    /// Only the primary parents of its children can change as a result.
    pub fn set_priority(&mut self, id: VertexId, priority: i32) -> Result<()> {
        let index = self.index_of(id)?;
        let vertex = self
            .graph
            .node_weight_mut(index)
            .ok_or(LayoutError::UnknownVertex(id))?;
        if vertex.is_dummy() {
            return Err(LayoutError::DummyPriority(id));
        }
        if vertex.priority == priority {
            return Ok(());
        }
        vertex.priority = priority;

        let children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .collect();
        for child in children {
            self.select_primary_parent(child);
        }

        debug!(%id, priority, "set priority");
        Ok(())
    }

    /// Gets a vertex by id.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        let index = self.id_index.get(&id)?;
        self.graph.node_weight(*index)
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn contains_edge(&self, parent: VertexId, child: VertexId) -> bool {
        match (self.id_index.get(&parent), self.id_index.get(&child)) {
            (Some(&p), Some(&c)) => self.graph.find_edge(p, c).is_some(),
            _ => false,
        }
    }

    /// Finds all vertices with a given name.
    pub fn find_by_name(&self, name: &str) -> Vec<&Vertex> {
        self.name_index
            .get(name)
            .map(|ids| ids.iter().filter_map(|id| self.vertex(*id)).collect())
            .unwrap_or_default()
    }

    /// Direct parents of a vertex, name ascending.
    pub fn parents(&self, id: VertexId) -> Result<Vec<&Vertex>> {
        let index = self.index_of(id)?;
        Ok(self.neighbors_sorted(index, Direction::Incoming))
    }

    /// Direct children of a vertex, name ascending.
    pub fn children(&self, id: VertexId) -> Result<Vec<&Vertex>> {
        let index = self.index_of(id)?;
        Ok(self.neighbors_sorted(index, Direction::Outgoing))
    }

    /// Vertices without parents, name ascending.
    pub fn roots(&self) -> Vec<&Vertex> {
        let roots = self
            .graph
            .node_indices()
            .filter(|&index| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .filter_map(|index| self.graph.node_weight(index))
            .collect();
        sorted_by_name(roots)
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all vertices in no particular order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.graph.node_weights()
    }

    /// Iterates over all edges in no particular order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph.edge_references().filter_map(|edge_ref| {
            let parent = self.graph.node_weight(edge_ref.source())?;
            let child = self.graph.node_weight(edge_ref.target())?;
            Some(Edge::new(parent.id, child.id))
        })
    }

    pub(crate) fn index_of(&self, id: VertexId) -> Result<NodeIndex> {
        self.id_index
            .get(&id)
            .copied()
            .ok_or(LayoutError::UnknownVertex(id))
    }

    fn neighbors_sorted(&self, index: NodeIndex, direction: Direction) -> Vec<&Vertex> {
        let neighbors = self
            .graph
            .neighbors_directed(index, direction)
            .filter_map(|n| self.graph.node_weight(n))
            .collect();
        sorted_by_name(neighbors)
    }
}

/// Sorts vertices by name, then id.
pub(crate) fn sorted_by_name(mut vertices: Vec<&Vertex>) -> Vec<&Vertex> {
    vertices.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    vertices
}

/// Graph statistics for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub dummy_count: usize,
    pub layer_count: usize,
    pub proper: bool,
}

impl RelativeLayoutGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            vertex_count: self.vertex_count(),
            edge_count: self.edge_count(),
            dummy_count: self.vertices().filter(|v| v.is_dummy()).count(),
            layer_count: self.max_rank().map_or(0, |rank| rank + 1),
            proper: self.is_proper(),
        }
    }

    /// Re-derives ranks and primary parents from scratch and checks them
    /// against the incrementally maintained ones.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let order = petgraph::algo::toposort(&self.graph, None).expect("graph must stay acyclic");
        let mut ranks: HashMap<NodeIndex, usize> = HashMap::new();
        for index in order {
            let rank = self
                .graph
                .neighbors_directed(index, Direction::Incoming)
                .map(|p| ranks[&p] + 1)
                .max()
                .unwrap_or(0);
            ranks.insert(index, rank);
        }
        assert_eq!(ranks, self.ranks, "ranks drifted from the edge set");

        for index in self.graph.node_indices() {
            let expected = crate::primary::choose_primary_parent(
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .map(|p| &self.graph[p]),
            )
            .map(|v| v.id);
            let actual = self.primary_parent.get(&index).map(|&p| self.graph[p].id);
            assert_eq!(expected, actual, "primary parent of {}", self.graph[index]);
        }

        let mut inverse: HashMap<NodeIndex, HashSet<NodeIndex>> = HashMap::new();
        for (&child, &parent) in &self.primary_parent {
            inverse.entry(parent).or_default().insert(child);
        }
        assert_eq!(inverse, self.primary_children, "primary children drifted");
    }
}
