//! Properness checks and dummy insertion.
//!
//! A graph is proper when every edge joins adjacent ranks. Edges that skip
//! ranks are legal, they only make the graph improper; `make_proper` splits
//! each of them into a chain of dummy vertices, one per skipped rank.

use crate::edge::Edge;
use crate::error::Result;
use crate::graph::RelativeLayoutGraph;
use crate::vertex::{Vertex, VertexId};
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use tracing::debug;

impl RelativeLayoutGraph {
    /// True if every edge connects vertices whose ranks differ by exactly 1.
    pub fn is_proper(&self) -> bool {
        self.graph
            .edge_references()
            .all(|edge_ref| self.span(edge_ref.source(), edge_ref.target()) == 1)
    }

    /// Edges that skip at least one rank, ordered by parent then child name.
    pub fn improper_edges(&self) -> Vec<Edge> {
        let mut long: Vec<(&Vertex, &Vertex)> = self
            .long_edges()
            .into_iter()
            .filter_map(|(p, c, _)| Some((self.graph.node_weight(p)?, self.graph.node_weight(c)?)))
            .collect();
        long.sort_by(|(p1, c1), (p2, c2)| {
            p1.name
                .cmp(&p2.name)
                .then_with(|| c1.name.cmp(&c2.name))
                .then_with(|| (p1.id, c1.id).cmp(&(p2.id, c2.id)))
        });

        long.into_iter()
            .map(|(parent, child)| Edge::new(parent.id, child.id))
            .collect()
    }

    /// Replaces every rank-skipping edge with a chain of dummy vertices.
    ///
    /// Ranks of existing vertices do not change. Dummies get the configured
    /// prefix and default priority. Returns the ids of the new dummies in
    /// creation order.
    ///
    /// Ids for every dummy are allocated before the graph is touched, so
    /// running out of ids leaves the graph unchanged.
    pub fn make_proper(&mut self) -> Result<Vec<VertexId>> {
        let long = self.long_edges();
        let needed: usize = long.iter().map(|&(_, _, span)| span - 1).sum();
        let mut fresh = Vec::with_capacity(needed);
        for _ in 0..needed {
            fresh.push(self.allocate_id()?);
        }

        let prefix = self.config().dummy_prefix.clone();
        let priority = self.config().default_priority;
        let mut fresh = fresh.into_iter();
        let mut created = Vec::with_capacity(needed);

        for (parent, child, span) in long {
            let Some(edge) = self.graph.find_edge(parent, child) else {
                continue;
            };
            self.graph.remove_edge(edge);

            let mut previous = parent;
            for id in fresh.by_ref().take(span - 1) {
                let dummy = Vertex::dummy_with_prefix(id, &prefix).with_priority(priority);
                let index = self.insert_node(dummy);

                let rank = self.rank_of(previous) + 1;
                self.graph.add_edge(previous, index, ());
                self.ranks.insert(index, rank);
                self.select_primary_parent(index);

                created.push(id);
                previous = index;
            }
            self.graph.add_edge(previous, child, ());
            self.select_primary_parent(child);
        }

        debug!(dummies = created.len(), "made graph proper");
        Ok(created)
    }

    /// `(parent, child, span)` for every edge spanning more than one rank.
    fn long_edges(&self) -> Vec<(NodeIndex, NodeIndex, usize)> {
        self.graph
            .edge_references()
            .map(|edge_ref| {
                let (parent, child) = (edge_ref.source(), edge_ref.target());
                (parent, child, self.span(parent, child))
            })
            .filter(|&(_, _, span)| span > 1)
            .collect()
    }

    pub(crate) fn span(&self, parent: NodeIndex, child: NodeIndex) -> usize {
        self.rank_of(child).saturating_sub(self.rank_of(parent))
    }
}
