//! Index-Free Adjacency Graph
//!
//! This module implements the graph store: nodes and relations live in
//! paged arenas, and every relation is threaded directly into two
//! doubly-linked adjacency chains, one anchored at its source node and one
//! at its target node. There is no per-node edge list and no edge index.
//!
//! # Overview
//!
//! - Nodes, relations and properties each have their own [`PagedArena`].
//!   A slot index is a stable identity for the lifetime of the graph.
//!
//! - Freed node and relation slots form a LIFO free list threaded through
//!   the slots themselves. Property records are recycled through a single
//!   graph-wide free list.
//!
//! - Each relation carries two pairs of chain pointers. Every pointer
//!   records which relation it names *and* which role (source or target)
//!   that relation plays at the shared node, so splicing never has to
//!   compare endpoints to work out which pointer pair to follow.
//!
//! - Every mutation runs inside a [`Transaction`](crate::journal::Transaction).
//!   If the operation is aborted, all pointer surgery is undone.
//!
//! # Concurrency
//!
//! The graph has no internal locking. Mutations take `&mut self`, so the
//! borrow checker enforces the single-writer requirement; iterators borrow
//! the graph shared, so the graph cannot change underneath them.

mod check;
mod handle;
mod iter;
mod node;
mod property;
mod relation;

pub use handle::{Node, NodeMut, Relation, RelationMut};
pub use iter::{NodeRelations, Nodes, Relations};
pub use node::NodeId;
pub use relation::RelationId;

use indexmap::IndexMap;

use crate::error::{GraphError, Result};
use crate::options::GraphOptions;
use crate::store::{LivenessBitset, PagedArena};
use crate::value::PropertyValue;

use node::{NodeRecord, NodeSlot};
use property::{PropertyId, PropertyOwner, PropertyRecord};
use relation::{RelationRecord, RelationSlot};

/// An in-memory graph with index-free adjacency.
///
/// # Example
///
/// ```rust
/// use ifa_core::Graph;
///
/// let mut graph = Graph::new();
/// let a = graph.add_node("A");
/// let b = graph.add_node("B");
/// let knows = graph.add_relation(a, b).unwrap();
///
/// graph.relation_mut(knows).unwrap().set_property("since", 2019);
/// assert_eq!(graph.node(a).unwrap().relations().count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Graph {
    pub(crate) nodes: PagedArena<NodeSlot>,
    pub(crate) relations: PagedArena<RelationSlot>,
    pub(crate) properties: PagedArena<PropertyRecord>,

    pub(crate) live_nodes: LivenessBitset,
    pub(crate) live_relations: LivenessBitset,

    pub(crate) free_node: Option<NodeId>,
    pub(crate) free_relation: Option<RelationId>,
    pub(crate) free_property: Option<PropertyId>,

    pub(crate) node_count: usize,
    pub(crate) relation_count: usize,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with the given options.
    pub fn with_options(options: &GraphOptions) -> Self {
        Self {
            nodes: PagedArena::with_page_capacity(options.node_pages),
            relations: PagedArena::with_page_capacity(options.relation_pages),
            properties: PagedArena::with_page_capacity(options.property_pages),
            ..Self::default()
        }
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of live relations.
    pub fn relation_count(&self) -> usize {
        self.relation_count
    }

    /// Whether the graph has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Whether `id` names a live node.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_record(id).is_some()
    }

    /// Whether `id` names a live relation.
    pub fn contains_relation(&self, id: RelationId) -> bool {
        self.relation_record(id).is_some()
    }

    /// Look up a live node.
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        self.node_record(id).map(|_| Node::new(self, id))
    }

    /// Look up a live node for property updates.
    pub fn node_mut(&mut self, id: NodeId) -> Option<NodeMut<'_>> {
        if self.contains_node(id) {
            Some(NodeMut::new(self, id))
        } else {
            None
        }
    }

    /// Look up a live relation.
    pub fn relation(&self, id: RelationId) -> Option<Relation<'_>> {
        self.relation_record(id).map(|_| Relation::new(self, id))
    }

    /// Look up a live relation for property updates.
    pub fn relation_mut(&mut self, id: RelationId) -> Option<RelationMut<'_>> {
        if self.contains_relation(id) {
            Some(RelationMut::new(self, id))
        } else {
            None
        }
    }

    /// Iterate over live nodes in ascending index order.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes::new(self)
    }

    /// Iterate over live relations in ascending index order.
    pub fn relations(&self) -> Relations<'_> {
        Relations::new(self)
    }

    /// Set a property on a live node.
    pub fn set_node_property(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<()> {
        let mut node = self.node_mut(id).ok_or_else(|| GraphError::deleted_node(id))?;
        node.set_property(key, value);
        Ok(())
    }

    /// Remove a property from a live node. Returns whether the key existed.
    pub fn del_node_property(&mut self, id: NodeId, key: &str) -> Result<bool> {
        let mut node = self.node_mut(id).ok_or_else(|| GraphError::deleted_node(id))?;
        Ok(node.del_property(key))
    }

    /// All properties of a live node, in chain order.
    pub fn node_properties(&self, id: NodeId) -> Result<IndexMap<String, PropertyValue>> {
        self.node(id)
            .map(|node| node.properties())
            .ok_or_else(|| GraphError::deleted_node(id))
    }

    /// Set a property on a live relation.
    pub fn set_relation_property(
        &mut self,
        id: RelationId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<()> {
        let mut relation = self
            .relation_mut(id)
            .ok_or_else(|| GraphError::deleted_relation(id))?;
        relation.set_property(key, value);
        Ok(())
    }

    /// Remove a property from a live relation. Returns whether the key existed.
    pub fn del_relation_property(&mut self, id: RelationId, key: &str) -> Result<bool> {
        let mut relation = self
            .relation_mut(id)
            .ok_or_else(|| GraphError::deleted_relation(id))?;
        Ok(relation.del_property(key))
    }

    /// All properties of a live relation, in chain order.
    pub fn relation_properties(&self, id: RelationId) -> Result<IndexMap<String, PropertyValue>> {
        self.relation(id)
            .map(|relation| relation.properties())
            .ok_or_else(|| GraphError::deleted_relation(id))
    }

    /// The record of a live node, or `None` if the slot is out of range or free.
    pub(crate) fn node_record(&self, id: NodeId) -> Option<&NodeRecord> {
        if !self.live_nodes.get(id.index()) {
            return None;
        }
        self.nodes.get(id.index()).and_then(NodeSlot::record)
    }

    /// The record of a live relation, or `None` if the slot is out of range or free.
    pub(crate) fn relation_record(&self, id: RelationId) -> Option<&RelationRecord> {
        if !self.live_relations.get(id.index()) {
            return None;
        }
        self.relations.get(id.index()).and_then(RelationSlot::record)
    }

    /// The record of a node the caller knows to be live.
    ///
    /// # Panics
    ///
    /// Panics if the slot is free. Inside a transaction that unwinds the
    /// operation.
    pub(crate) fn expect_node(&self, id: NodeId) -> &NodeRecord {
        match &self.nodes[id.index()] {
            NodeSlot::Occupied(record) => record,
            NodeSlot::Free { .. } => panic!("node slot {} is free", id.index()),
        }
    }

    pub(crate) fn expect_node_mut(&mut self, id: NodeId) -> &mut NodeRecord {
        match &mut self.nodes[id.index()] {
            NodeSlot::Occupied(record) => record,
            NodeSlot::Free { .. } => panic!("node slot {} is free", id.index()),
        }
    }

    /// The record of a relation the caller knows to be live.
    ///
    /// # Panics
    ///
    /// Panics if the slot is free.
    pub(crate) fn expect_relation(&self, id: RelationId) -> &RelationRecord {
        match &self.relations[id.index()] {
            RelationSlot::Occupied(record) => record,
            RelationSlot::Free { .. } => panic!("relation slot {} is free", id.index()),
        }
    }

    pub(crate) fn expect_relation_mut(&mut self, id: RelationId) -> &mut RelationRecord {
        match &mut self.relations[id.index()] {
            RelationSlot::Occupied(record) => record,
            RelationSlot::Free { .. } => panic!("relation slot {} is free", id.index()),
        }
    }

    fn property_owner_head(&self, owner: PropertyOwner) -> Option<PropertyId> {
        match owner {
            PropertyOwner::Node(id) => self.expect_node(id).properties,
            PropertyOwner::Relation(id) => self.expect_relation(id).properties,
        }
    }
}
