//! Longest-path ranking.
//!
//! A root has rank 0; any other vertex sits one rank below its deepest
//! parent. After a structural change only the changed vertices and their
//! descendants can move, so re-ranking walks that subgraph in topological
//! order and re-derives each rank from all surviving parents. The same walk
//! handles ranks going up (edge added) and going down (edge or vertex
//! removed).

use crate::error::Result;
use crate::graph::{sorted_by_name, RelativeLayoutGraph};
use crate::vertex::{Vertex, VertexId};
use petgraph::stable_graph::NodeIndex;
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::trace;

impl RelativeLayoutGraph {
    /// Returns the rank of a vertex.
    pub fn get_rank(&self, id: VertexId) -> Result<usize> {
        let index = self.index_of(id)?;
        Ok(self.rank_of(index))
    }

    /// Highest rank in the graph, or `None` when it is empty.
    pub fn max_rank(&self) -> Option<usize> {
        self.ranks.values().copied().max()
    }

    /// Vertices grouped by rank; each layer is name ascending.
    pub fn layers(&self) -> Vec<Vec<&Vertex>> {
        let mut layers: Vec<Vec<&Vertex>> = match self.max_rank() {
            Some(max) => vec![Vec::new(); max + 1],
            None => return Vec::new(),
        };
        for (&index, &rank) in &self.ranks {
            if let Some(vertex) = self.graph.node_weight(index) {
                layers[rank].push(vertex);
            }
        }
        layers.into_iter().map(sorted_by_name).collect()
    }

    pub(crate) fn rank_of(&self, index: NodeIndex) -> usize {
        self.ranks.get(&index).copied().unwrap_or_default()
    }

    /// Re-derives the ranks of `seeds` and everything reachable from them.
    pub(crate) fn rerank(&mut self, seeds: &[NodeIndex]) {
        let mut affected: HashSet<NodeIndex> = HashSet::new();
        let mut stack: Vec<NodeIndex> = seeds.to_vec();
        while let Some(current) = stack.pop() {
            if affected.insert(current) {
                stack.extend(self.graph.neighbors_directed(current, Direction::Outgoing));
            }
        }

        // Kahn's algorithm over the affected subgraph. Parents outside it
        // keep their rank, so only affected parents hold a vertex back.
        let mut pending: HashMap<NodeIndex, usize> = affected
            .iter()
            .map(|&index| {
                let blocking = self
                    .graph
                    .neighbors_directed(index, Direction::Incoming)
                    .filter(|parent| affected.contains(parent))
                    .count();
                (index, blocking)
            })
            .collect();
        let mut ready: VecDeque<NodeIndex> = pending
            .iter()
            .filter(|&(_, &blocking)| blocking == 0)
            .map(|(&index, _)| index)
            .collect();

        let mut moved = 0usize;
        while let Some(current) = ready.pop_front() {
            let rank = self
                .graph
                .neighbors_directed(current, Direction::Incoming)
                .map(|parent| self.rank_of(parent) + 1)
                .max()
                .unwrap_or(0);
            if self.ranks.insert(current, rank) != Some(rank) {
                moved += 1;
            }

            for child in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if let Some(blocking) = pending.get_mut(&child) {
                    *blocking -= 1;
                    if *blocking == 0 {
                        ready.push_back(child);
                    }
                }
            }
        }

        trace!(visited = affected.len(), moved, "reranked");
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::GraphBuilder;

    fn builder_of(paths: &[&str]) -> GraphBuilder {
        let mut builder = GraphBuilder::new();
        builder.set_up(paths).unwrap();
        builder
    }

    fn rank(builder: &GraphBuilder, name: &str) -> usize {
        builder.graph().get_rank(builder.id(name).unwrap()).unwrap()
    }

    #[test]
    fn test_chain_ranks() {
        let builder = builder_of(&["P1<-C1<-C2"]);

        assert_eq!(rank(&builder, "P1"), 0);
        assert_eq!(rank(&builder, "C1"), 1);
        assert_eq!(rank(&builder, "C2"), 2);
    }

    #[test]
    fn test_rank_is_longest_path() {
        let builder = builder_of(&["A<-B<-C<-D", "A<-D"]);

        assert_eq!(rank(&builder, "D"), 3);
        builder.graph().assert_consistent();
    }

    #[test]
    fn test_added_edge_pushes_descendants_down() {
        let mut builder = builder_of(&["A<-B<-C", "X<-Y<-Z"]);
        let c = builder.id("C").unwrap();
        let x = builder.id("X").unwrap();

        builder.graph_mut().add_edge(c, x).unwrap();

        assert_eq!(rank(&builder, "X"), 3);
        assert_eq!(rank(&builder, "Y"), 4);
        assert_eq!(rank(&builder, "Z"), 5);
        builder.graph().assert_consistent();
    }

    #[test]
    fn test_removed_edge_uses_surviving_parents() {
        // D hangs below both the long branch and the short one.
        let mut builder = builder_of(&["A<-B<-C<-D", "A<-E<-D", "D<-F"]);
        let c = builder.id("C").unwrap();
        let d = builder.id("D").unwrap();
        assert_eq!(rank(&builder, "D"), 3);

        builder.graph_mut().remove_edge(c, d).unwrap();

        assert_eq!(rank(&builder, "D"), 2);
        assert_eq!(rank(&builder, "F"), 3);
        assert_eq!(rank(&builder, "C"), 2);
        builder.graph().assert_consistent();
    }

    #[test]
    fn test_removed_vertex_lifts_orphans_to_roots() {
        let mut builder = builder_of(&["A<-B<-C<-D"]);
        let b = builder.id("B").unwrap();

        builder.graph_mut().remove_vertex(b).unwrap();

        assert_eq!(rank(&builder, "A"), 0);
        assert_eq!(rank(&builder, "C"), 0);
        assert_eq!(rank(&builder, "D"), 1);
        builder.graph().assert_consistent();
    }

    #[test]
    fn test_remove_and_readd_edge_restores_ranks() {
        let mut builder = builder_of(&["A<-B<-C", "A<-D<-C", "C<-E"]);
        let (b, c) = (builder.id("B").unwrap(), builder.id("C").unwrap());
        let before = builder.graph().snapshot();

        builder.graph_mut().remove_edge(b, c).unwrap();
        builder.graph_mut().add_edge(b, c).unwrap();

        assert_eq!(builder.graph().snapshot(), before);
    }

    #[test]
    fn test_every_edge_goes_down_at_least_one_rank() {
        let builder = builder_of(&[
            "R<-A<-B<-C",
            "R<-C",
            "A<-D<-E",
            "B<-E",
            "R<-F<-E",
        ]);
        let graph = builder.graph();

        for edge in graph.edges() {
            let parent = graph.get_rank(edge.parent).unwrap();
            let child = graph.get_rank(edge.child).unwrap();
            assert!(child > parent, "edge {} goes up", edge);
        }
        for root in graph.roots() {
            assert_eq!(graph.get_rank(root.id).unwrap(), 0);
        }
        graph.assert_consistent();
    }

    #[test]
    fn test_layers() {
        let builder = builder_of(&["A<-C", "B<-C<-D"]);
        let layers: Vec<Vec<&str>> = builder
            .graph()
            .layers()
            .iter()
            .map(|layer| layer.iter().map(|v| v.name.as_str()).collect())
            .collect();

        assert_eq!(layers, vec![vec!["A", "B"], vec!["C"], vec!["D"]]);
        assert_eq!(builder.graph().max_rank(), Some(2));
    }

    #[test]
    fn test_empty_graph_has_no_layers() {
        let builder = GraphBuilder::new();
        assert!(builder.graph().layers().is_empty());
        assert_eq!(builder.graph().max_rank(), None);
    }
}
