//! Node Store
//!
//! Node slots and the add/delete operations on them.

use tracing::debug;

use super::property::{release_chain, PropertyId};
use super::relation::ChainLink;
use super::Graph;
use crate::error::{GraphError, Result};
use crate::journal::Transaction;

/// Identifier of a node: its slot index in the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Get the raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of one node slot.
#[derive(Debug)]
pub(crate) enum NodeSlot {
    /// The slot holds a live node.
    Occupied(NodeRecord),

    /// The slot is on the free list. `next` is the next free slot.
    Free { next: Option<NodeId> },
}

impl NodeSlot {
    pub(crate) fn record(&self) -> Option<&NodeRecord> {
        match self {
            NodeSlot::Occupied(record) => Some(record),
            NodeSlot::Free { .. } => None,
        }
    }
}

/// A live node.
#[derive(Debug)]
pub(crate) struct NodeRecord {
    /// Always equal to the slot's own index.
    pub(crate) id: NodeId,
    pub(crate) label: String,
    /// Head of the property chain.
    pub(crate) properties: Option<PropertyId>,
    /// Head of the adjacency chain.
    pub(crate) relations: Option<ChainLink>,
}

impl NodeRecord {
    fn new(id: NodeId, label: String) -> Self {
        Self {
            id,
            label,
            properties: None,
            relations: None,
        }
    }
}

impl Graph {
    /// Add a node with the given label and return its id.
    ///
    /// The most recently freed slot is reused first; otherwise the arena
    /// grows.
    pub fn add_node(&mut self, label: impl Into<String>) -> NodeId {
        let mut tx = Transaction::begin(self, "add_node");
        let id = insert_node(&mut tx, label.into());
        tx.commit();

        debug!(node = id.index(), "node added");
        id
    }

    /// Delete a node.
    ///
    /// Fails with [`GraphError::HasRelations`] while any relation still
    /// touches the node. The node's properties are handed to the free
    /// property list in one splice.
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        let record = self
            .node_record(id)
            .ok_or_else(|| GraphError::deleted_node(id))?;
        if record.relations.is_some() {
            return Err(GraphError::HasRelations(id));
        }
        let properties = record.properties;

        let mut tx = Transaction::begin(self, "delete_node");
        tx.perform(
            move |g| g.live_nodes.set(id.index(), false),
            move |g| g.live_nodes.set(id.index(), true),
        );
        release_chain(&mut tx, properties);

        let next = tx.free_node;
        tx.set(move |g| &mut g.nodes[id.index()], NodeSlot::Free { next });
        tx.set(|g| &mut g.free_node, Some(id));
        tx.decrement(|g| &mut g.node_count);
        tx.commit();

        debug!(node = id.index(), "node deleted");
        Ok(())
    }
}

/// Claim a node slot inside `tx`: pop the free list or grow the arena,
/// then mark the slot live and count it.
pub(crate) fn insert_node(tx: &mut Transaction<'_, Graph>, label: String) -> NodeId {
    let id = match tx.free_node {
        Some(id) => {
            let next = match &tx.nodes[id.index()] {
                NodeSlot::Free { next } => *next,
                NodeSlot::Occupied(_) => {
                    panic!("free node list points at live slot {}", id.index())
                }
            };
            tx.set(|g| &mut g.free_node, next);
            tx.set(
                move |g| &mut g.nodes[id.index()],
                NodeSlot::Occupied(NodeRecord::new(id, label)),
            );
            id
        }
        None => {
            let id = NodeId(tx.nodes.len());
            tx.perform(
                move |g| {
                    g.nodes.push(NodeSlot::Occupied(NodeRecord::new(id, label)));
                },
                |g| {
                    g.nodes.pop();
                },
            );
            id
        }
    };

    tx.perform(
        move |g| g.live_nodes.set(id.index(), true),
        move |g| g.live_nodes.set(id.index(), false),
    );
    tx.increment(|g| &mut g.node_count);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PAGE_SIZE;

    #[test]
    fn add_node_assigns_sequential_ids() {
        let mut graph = Graph::new();
        for i in 0..(PAGE_SIZE * 2 + 3) {
            assert_eq!(graph.add_node(format!("n{i}")), NodeId(i));
        }
        assert_eq!(graph.node_count(), PAGE_SIZE * 2 + 3);
        assert_eq!(graph.nodes.page_count(), 3);
    }

    #[test]
    fn new_node_is_bare() {
        let mut graph = Graph::new();
        let id = graph.add_node("A");
        let node = graph.node(id).unwrap();
        assert_eq!(node.label(), "A");
        assert!(node.properties().is_empty());
        assert_eq!(node.relations().count(), 0);
    }

    #[test]
    fn freed_slots_are_reused_lifo() {
        let mut graph = Graph::new();
        let ids: Vec<_> = (0..5).map(|i| graph.add_node(format!("n{i}"))).collect();

        graph.delete_node(ids[1]).unwrap();
        graph.delete_node(ids[3]).unwrap();

        assert_eq!(graph.add_node("x"), ids[3]);
        assert_eq!(graph.add_node("y"), ids[1]);
        assert_eq!(graph.add_node("z"), NodeId(5));
        assert_eq!(graph.check_nodes(), None);
    }

    #[test]
    fn reused_slot_does_not_leak_old_properties() {
        let mut graph = Graph::new();
        let id = graph.add_node("old");
        graph.set_node_property(id, "secret", 1).unwrap();
        graph.delete_node(id).unwrap();

        let reused = graph.add_node("new");
        assert_eq!(reused, id);
        let node = graph.node(reused).unwrap();
        assert_eq!(node.label(), "new");
        assert!(node.properties().is_empty());
    }

    #[test]
    fn delete_twice_fails() {
        let mut graph = Graph::new();
        let id = graph.add_node("A");
        graph.delete_node(id).unwrap();
        assert_eq!(graph.delete_node(id), Err(GraphError::deleted_node(id)));
        assert_eq!(
            graph.delete_node(NodeId(1000)),
            Err(GraphError::deleted_node(NodeId(1000)))
        );
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn delete_returns_properties_to_free_list() {
        let mut graph = Graph::new();
        let id = graph.add_node("A");
        for i in 0..3 {
            graph.set_node_property(id, format!("k{i}"), i).unwrap();
        }
        assert_eq!(graph.properties.len(), 3);
        graph.delete_node(id).unwrap();

        // The freed chain is reused before the property arena grows.
        let other = graph.add_node("B");
        for i in 0..3 {
            graph.set_node_property(other, format!("p{i}"), i).unwrap();
        }
        assert_eq!(graph.properties.len(), 3);
        assert_eq!(graph.free_property, None);
    }
}
