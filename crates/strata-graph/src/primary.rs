//! Primary parent, children and siblings.
//!
//! Every non-root vertex has exactly one primary parent, picked from its
//! parents by a fixed total order. Following primary-parent links from any
//! vertex leads to a root, which turns the multi-parent DAG into a forest
//! the orchestrator can position new shapes against.
//!
//! The order, best first:
//! 1. higher priority
//! 2. real vertex before dummy vertex
//! 3. smaller name
//! 4. smaller id

use crate::error::Result;
use crate::graph::{sorted_by_name, RelativeLayoutGraph};
use crate::vertex::{Vertex, VertexId};
use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use std::cmp::Ordering;
use tracing::trace;

/// Orders candidate parents, best first.
pub fn compare_candidates(a: &Vertex, b: &Vertex) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.is_dummy().cmp(&b.is_dummy()))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Picks the primary parent among `candidates`, or `None` if there are none.
pub fn choose_primary_parent<'a>(
    candidates: impl IntoIterator<Item = &'a Vertex>,
) -> Option<&'a Vertex> {
    candidates
        .into_iter()
        .min_by(|a, b| compare_candidates(a, b))
}

impl RelativeLayoutGraph {
    /// Returns the primary parent of a vertex, or `None` for a root.
    pub fn get_primary_parent(&self, id: VertexId) -> Result<Option<&Vertex>> {
        let index = self.index_of(id)?;
        Ok(self
            .primary_parent
            .get(&index)
            .and_then(|&parent| self.graph.node_weight(parent)))
    }

    /// Returns the vertices whose primary parent is `id`, name ascending.
    pub fn get_primary_children(&self, id: VertexId) -> Result<Vec<&Vertex>> {
        let index = self.index_of(id)?;
        Ok(self.primary_children_of(index))
    }

    /// Returns the other primary children of `id`'s primary parent, name
    /// ascending. Roots have no siblings.
    pub fn get_primary_siblings(&self, id: VertexId) -> Result<Vec<&Vertex>> {
        let index = self.index_of(id)?;
        let Some(&parent) = self.primary_parent.get(&index) else {
            return Ok(Vec::new());
        };

        Ok(self
            .primary_children_of(parent)
            .into_iter()
            .filter(|sibling| sibling.id != id)
            .collect())
    }

    fn primary_children_of(&self, index: NodeIndex) -> Vec<&Vertex> {
        let children = self
            .primary_children
            .get(&index)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|&child| self.graph.node_weight(child))
                    .collect()
            })
            .unwrap_or_default();
        sorted_by_name(children)
    }

    /// Chooses the primary parent of `child` again from its current parents
    /// and updates both directions of the relation.
    pub(crate) fn select_primary_parent(&mut self, child: NodeIndex) {
        let chosen = self
            .graph
            .neighbors_directed(child, Direction::Incoming)
            .filter_map(|parent| self.graph.node_weight(parent).map(|v| (parent, v)))
            .min_by(|(_, a), (_, b)| compare_candidates(a, b))
            .map(|(parent, _)| parent);

        let previous = match chosen {
            Some(parent) => self.primary_parent.insert(child, parent),
            None => self.primary_parent.remove(&child),
        };
        if previous == chosen {
            return;
        }

        if let Some(old) = previous {
            if let Some(siblings) = self.primary_children.get_mut(&old) {
                siblings.remove(&child);
                if siblings.is_empty() {
                    self.primary_children.remove(&old);
                }
            }
        }
        if let Some(new) = chosen {
            self.primary_children.entry(new).or_default().insert(child);
        }

        trace!(?child, ?previous, ?chosen, "primary parent changed");
    }

    /// Drops every primary link to or from a vertex that is about to go.
    ///
    /// Its primary children are left without a primary parent until
    /// `select_primary_parent` runs for them.
    pub(crate) fn forget_primary(&mut self, index: NodeIndex) {
        if let Some(parent) = self.primary_parent.remove(&index) {
            if let Some(siblings) = self.primary_children.get_mut(&parent) {
                siblings.remove(&index);
                if siblings.is_empty() {
                    self.primary_children.remove(&parent);
                }
            }
        }
        if let Some(children) = self.primary_children.remove(&index) {
            for child in children {
                self.primary_parent.remove(&child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;

    fn names(vertices: Vec<&Vertex>) -> Vec<&str> {
        vertices.into_iter().map(|v| v.name.as_str()).collect()
    }

    fn primary_parent_name(builder: &GraphBuilder, name: &str) -> Option<String> {
        builder
            .graph()
            .get_primary_parent(builder.id(name).unwrap())
            .unwrap()
            .map(|v| v.name.clone())
    }

    #[test]
    fn test_chooses_first_in_name_order() {
        let mut builder = GraphBuilder::new();
        builder.set_up(&["P2<-C", "P1<-C"]).unwrap();

        assert_eq!(primary_parent_name(&builder, "C").as_deref(), Some("P1"));
    }

    #[test]
    fn test_prefers_real_over_dummy() {
        let mut builder = GraphBuilder::new();
        builder.set_up(&["P1<-*1<-C", "P1<-P2<-C"]).unwrap();

        assert_eq!(primary_parent_name(&builder, "C").as_deref(), Some("P2"));
    }

    #[test]
    fn test_prefers_higher_priority() {
        let mut builder = GraphBuilder::new();
        builder.set_priority("P2", 2).unwrap();
        builder.set_up(&["P1<-C", "P2<-C"]).unwrap();

        assert_eq!(primary_parent_name(&builder, "C").as_deref(), Some("P2"));
    }

    #[test]
    fn test_primary_children() {
        let mut builder = GraphBuilder::new();
        builder.set_priority("P1", 2).unwrap();
        builder
            .set_up(&["P1<-C1", "P1<-C2", "P2<-C2", "P2<-C3"])
            .unwrap();
        let graph = builder.graph();

        let p1 = builder.id("P1").unwrap();
        let p2 = builder.id("P2").unwrap();
        assert_eq!(names(graph.get_primary_children(p1).unwrap()), vec!["C1", "C2"]);
        assert_eq!(names(graph.get_primary_children(p2).unwrap()), vec!["C3"]);
    }

    #[test]
    fn test_primary_siblings() {
        let mut builder = GraphBuilder::new();
        builder.set_priority("P1", 2).unwrap();
        builder
            .set_up(&["P1<-C1", "P1<-C2", "P2<-C2", "P2<-C3"])
            .unwrap();
        let graph = builder.graph();

        let c2 = builder.id("C2").unwrap();
        let c3 = builder.id("C3").unwrap();
        let p1 = builder.id("P1").unwrap();
        assert_eq!(names(graph.get_primary_siblings(c2).unwrap()), vec!["C1"]);
        assert!(graph.get_primary_siblings(c3).unwrap().is_empty());
        assert!(graph.get_primary_siblings(p1).unwrap().is_empty());
    }

    #[test]
    fn test_leaf_has_no_primary_children() {
        let mut builder = GraphBuilder::new();
        builder.set_up(&["A<-B"]).unwrap();
        let b = builder.id("B").unwrap();

        assert!(builder.graph().get_primary_children(b).unwrap().is_empty());
    }

    #[test]
    fn test_priority_change_reselects_children() {
        let mut builder = GraphBuilder::new();
        builder.set_up(&["A<-X", "B<-X", "B<-Y"]).unwrap();
        assert_eq!(primary_parent_name(&builder, "X").as_deref(), Some("A"));

        builder.set_priority("B", 5).unwrap();
        assert_eq!(primary_parent_name(&builder, "X").as_deref(), Some("B"));
        let b = builder.id("B").unwrap();
        assert_eq!(
            names(builder.graph().get_primary_children(b).unwrap()),
            vec!["X", "Y"]
        );

        builder.set_priority("B", 1).unwrap();
        assert_eq!(primary_parent_name(&builder, "X").as_deref(), Some("A"));
        builder.graph().assert_consistent();
    }

    #[test]
    fn test_primary_parent_is_an_actual_parent() {
        let mut builder = GraphBuilder::new();
        builder
            .set_up(&["R<-A<-C", "R<-B<-C", "A<-D", "*1<-D", "R<-*1"])
            .unwrap();
        let graph = builder.graph();

        for vertex in graph.vertices() {
            let parents = graph.parents(vertex.id).unwrap();
            match graph.get_primary_parent(vertex.id).unwrap() {
                None => assert!(parents.is_empty()),
                Some(primary) => {
                    assert!(parents.iter().any(|p| p.id == primary.id));
                    let siblings = graph.get_primary_children(primary.id).unwrap();
                    assert!(siblings.iter().any(|c| c.id == vertex.id));
                }
            }
        }
        graph.assert_consistent();
    }

    #[test]
    fn test_removing_edge_falls_back_to_remaining_parent() {
        let mut builder = GraphBuilder::new();
        builder.set_up(&["A<-C", "B<-C"]).unwrap();
        let (a, c) = (builder.id("A").unwrap(), builder.id("C").unwrap());

        builder.graph_mut().remove_edge(a, c).unwrap();
        assert_eq!(primary_parent_name(&builder, "C").as_deref(), Some("B"));
        assert!(builder.graph().get_primary_children(a).unwrap().is_empty());

        builder.graph_mut().add_edge(a, c).unwrap();
        assert_eq!(primary_parent_name(&builder, "C").as_deref(), Some("A"));
        builder.graph().assert_consistent();
    }

    #[test]
    fn test_compare_candidates_order() {
        let high = Vertex::real(VertexId::new(1), "Z").with_priority(3);
        let real = Vertex::real(VertexId::new(2), "M");
        let dummy = Vertex::dummy(VertexId::new(3));
        let early = Vertex::real(VertexId::new(4), "A");

        let best = choose_primary_parent([&dummy, &real, &early, &high]).unwrap();
        assert_eq!(best.id, high.id);
        assert_eq!(compare_candidates(&real, &dummy), Ordering::Less);
        assert_eq!(compare_candidates(&early, &real), Ordering::Less);
        assert!(choose_primary_parent(std::iter::empty()).is_none());
    }
}
