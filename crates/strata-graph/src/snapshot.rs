//! Serializable view of a layout graph and its derived data.

use crate::edge::EdgeSnapshot;
use crate::graph::RelativeLayoutGraph;
use crate::vertex::{VertexId, VertexKind};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::{Deserialize, Serialize};

/// One vertex with its derived layout data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexSnapshot {
    pub id: VertexId,
    pub name: String,
    pub kind: VertexKind,
    pub priority: i32,
    pub rank: usize,
    pub primary_parent: Option<String>,
    pub primary_children: Vec<String>,
}

/// The whole graph, ordered for stable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Ordered by rank, then name.
    pub vertices: Vec<VertexSnapshot>,
    /// Ordered by parent name, then child name.
    pub edges: Vec<EdgeSnapshot>,
    pub proper: bool,
}

impl LayoutSnapshot {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl RelativeLayoutGraph {
    /// Captures the current vertices, edges and derived data.
    pub fn snapshot(&self) -> LayoutSnapshot {
        let mut vertices: Vec<VertexSnapshot> = self
            .vertices()
            .map(|vertex| {
                // Lookups cannot fail for a vertex taken from the graph itself.
                let primary_parent = self
                    .get_primary_parent(vertex.id)
                    .ok()
                    .flatten()
                    .map(|parent| parent.name.clone());
                let primary_children = self
                    .get_primary_children(vertex.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|child| child.name.clone())
                    .collect();

                VertexSnapshot {
                    id: vertex.id,
                    name: vertex.name.clone(),
                    kind: vertex.kind,
                    priority: vertex.priority,
                    rank: self.get_rank(vertex.id).unwrap_or_default(),
                    primary_parent,
                    primary_children,
                }
            })
            .collect();
        vertices.sort_by(|a, b| {
            a.rank
                .cmp(&b.rank)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut edges: Vec<EdgeSnapshot> = self
            .graph
            .edge_references()
            .filter_map(|edge_ref| {
                let parent = self.graph.node_weight(edge_ref.source())?;
                let child = self.graph.node_weight(edge_ref.target())?;
                Some(EdgeSnapshot {
                    parent: parent.name.clone(),
                    child: child.name.clone(),
                    span: self.span(edge_ref.source(), edge_ref.target()),
                })
            })
            .collect();
        edges.sort_by(|a, b| a.parent.cmp(&b.parent).then_with(|| a.child.cmp(&b.child)));

        LayoutSnapshot {
            vertices,
            edges,
            proper: self.is_proper(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::GraphBuilder;

    #[test]
    fn test_snapshot_contents() {
        let mut builder = GraphBuilder::new();
        builder.set_up(&["P1<-C1<-C2", "P1<-C2"]).unwrap();
        let snapshot = builder.graph().snapshot();

        let names: Vec<&str> = snapshot.vertices.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["P1", "C1", "C2"]);
        assert_eq!(snapshot.vertices[0].primary_children, vec!["C1"]);
        assert_eq!(snapshot.vertices[2].primary_parent.as_deref(), Some("C1"));
        assert_eq!(snapshot.edges.len(), 3);
        assert_eq!(
            snapshot.edges.iter().find(|e| e.parent == "P1" && e.child == "C2").unwrap().span,
            2
        );
        assert!(!snapshot.proper);
    }

    #[test]
    fn test_snapshot_json() {
        let mut builder = GraphBuilder::new();
        builder.set_up(&["A<-B"]).unwrap();

        let json = builder.graph().snapshot().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vertices"][1]["name"], "B");
        assert_eq!(value["vertices"][1]["rank"], 1);
        assert_eq!(value["vertices"][1]["kind"], "real");
        assert_eq!(value["proper"], true);
    }
}
