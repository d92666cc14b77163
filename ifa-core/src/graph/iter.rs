//! Graph Iterators
//!
//! All iterators are single-pass and borrow the graph shared, so the graph
//! cannot be mutated while one is alive. Create a new iterator to walk
//! again.

use std::iter::FusedIterator;

use super::handle::{Node, Relation};
use super::node::NodeId;
use super::relation::{ChainLink, RelationId};
use super::Graph;

/// Live nodes in ascending index order, found by scanning the liveness
/// bitset for the next set bit.
pub struct Nodes<'g> {
    graph: &'g Graph,
    cursor: Option<usize>,
}

impl<'g> Nodes<'g> {
    pub(crate) fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            cursor: graph.live_nodes.next_set_from(0),
        }
    }
}

impl<'g> Iterator for Nodes<'g> {
    type Item = Node<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        self.cursor = self.graph.live_nodes.next_set_from(index + 1);
        Some(Node::new(self.graph, NodeId::from(index)))
    }
}

impl FusedIterator for Nodes<'_> {}

/// Live relations in ascending index order.
pub struct Relations<'g> {
    graph: &'g Graph,
    cursor: Option<usize>,
}

impl<'g> Relations<'g> {
    pub(crate) fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            cursor: graph.live_relations.next_set_from(0),
        }
    }
}

impl<'g> Iterator for Relations<'g> {
    type Item = Relation<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        self.cursor = self.graph.live_relations.next_set_from(index + 1);
        Some(Relation::new(self.graph, RelationId::from(index)))
    }
}

impl FusedIterator for Relations<'_> {}

/// The relations touching one node, walked along its adjacency chain.
///
/// Each step follows the pointer pair named by the current link's role,
/// so relations where the node is the source and relations where it is the
/// target interleave in chain order. A self-loop is yielded twice.
///
/// # Panics
///
/// Panics if a chain link names a free relation slot. The shared borrow
/// of the graph keeps the chain intact while the iterator is alive, so
/// only a corrupted store can reach that state.
pub struct NodeRelations<'g> {
    graph: &'g Graph,
    cursor: Option<ChainLink>,
}

impl<'g> NodeRelations<'g> {
    pub(crate) fn new(graph: &'g Graph, head: Option<ChainLink>) -> Self {
        Self {
            graph,
            cursor: head,
        }
    }
}

impl<'g> Iterator for NodeRelations<'g> {
    type Item = Relation<'g>;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.cursor?;
        let record = self.graph.expect_relation(link.relation);
        self.cursor = record.chain(link.role).next;
        Some(Relation::new(self.graph, link.relation))
    }
}

impl FusedIterator for NodeRelations<'_> {}
