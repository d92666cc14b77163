//! Node and Relation Handles
//!
//! Handles pair a graph reference with a slot id. Shared handles
//! ([`Node`], [`Relation`]) read; mutable handles ([`NodeMut`],
//! [`RelationMut`]) also edit the property chain. A handle can only be
//! obtained for a live entity, and the borrow it holds keeps the entity
//! live for as long as the handle exists.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::iter::NodeRelations;
use super::node::{NodeId, NodeRecord};
use super::property::PropertyOwner;
use super::relation::{ChainLink, RelationId, RelationRecord, Role};
use super::Graph;
use crate::value::PropertyValue;

/// Render a label or property map as compact JSON.
fn write_json<T: Serialize + ?Sized>(f: &mut fmt::Formatter<'_>, value: &T) -> fmt::Result {
    let json = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    f.write_str(&json)
}

/// A read-only view of a live node.
#[derive(Clone, Copy)]
pub struct Node<'g> {
    graph: &'g Graph,
    id: NodeId,
}

impl<'g> Node<'g> {
    pub(crate) fn new(graph: &'g Graph, id: NodeId) -> Self {
        Self { graph, id }
    }

    fn record(&self) -> &'g NodeRecord {
        self.graph.expect_node(self.id)
    }

    /// The node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The graph that owns this node.
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// The node's label.
    pub fn label(&self) -> &'g str {
        &self.record().label
    }

    /// All properties, in chain order.
    pub fn properties(&self) -> IndexMap<String, PropertyValue> {
        self.graph.collect_properties(PropertyOwner::Node(self.id))
    }

    /// One property value.
    pub fn property(&self, key: &str) -> Option<&'g PropertyValue> {
        self.graph.find_property(PropertyOwner::Node(self.id), key)
    }

    /// Whether any relation touches this node.
    pub fn has_relations(&self) -> bool {
        self.record().relations.is_some()
    }

    /// Walk this node's adjacency chain, newest relation first.
    pub fn relations(&self) -> NodeRelations<'g> {
        NodeRelations::new(self.graph, self.record().relations)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id.index())
            .field("label", &self.label())
            .finish()
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Node{label:")?;
        write_json(f, self.label())?;
        f.write_str(", properties: ")?;
        write_json(f, &self.properties())?;
        f.write_str("}")
    }
}

/// A view of a live node that can edit its properties.
pub struct NodeMut<'g> {
    graph: &'g mut Graph,
    id: NodeId,
}

impl<'g> NodeMut<'g> {
    pub(crate) fn new(graph: &'g mut Graph, id: NodeId) -> Self {
        Self { graph, id }
    }

    /// The node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Reborrow as a read-only handle.
    pub fn as_node(&self) -> Node<'_> {
        Node::new(&*self.graph, self.id)
    }

    /// The node's label.
    pub fn label(&self) -> &str {
        &self.graph.expect_node(self.id).label
    }

    /// Set a property, replacing any existing value for `key`.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.graph
            .set_property(PropertyOwner::Node(self.id), key.into(), value.into());
    }

    /// Remove a property. Returns whether it existed.
    pub fn del_property(&mut self, key: &str) -> bool {
        self.graph.del_property(PropertyOwner::Node(self.id), key)
    }

    /// All properties, in chain order.
    pub fn properties(&self) -> IndexMap<String, PropertyValue> {
        self.graph.collect_properties(PropertyOwner::Node(self.id))
    }
}

/// A read-only view of a live relation.
#[derive(Clone, Copy)]
pub struct Relation<'g> {
    graph: &'g Graph,
    id: RelationId,
}

impl<'g> Relation<'g> {
    pub(crate) fn new(graph: &'g Graph, id: RelationId) -> Self {
        Self { graph, id }
    }

    fn record(&self) -> &'g RelationRecord {
        self.graph.expect_relation(self.id)
    }

    fn neighbour(&self, link: Option<ChainLink>) -> Option<Relation<'g>> {
        link.map(|link| Relation::new(self.graph, link.relation))
    }

    /// The relation's id.
    pub fn id(&self) -> RelationId {
        self.id
    }

    /// The graph that owns this relation.
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// The source endpoint.
    pub fn source(&self) -> Node<'g> {
        Node::new(self.graph, self.record().source)
    }

    /// The target endpoint.
    pub fn target(&self) -> Node<'g> {
        Node::new(self.graph, self.record().target)
    }

    /// Previous relation in the source node's chain.
    pub fn source_prev(&self) -> Option<Relation<'g>> {
        self.neighbour(self.record().chain(Role::Source).prev)
    }

    /// Next relation in the source node's chain.
    pub fn source_next(&self) -> Option<Relation<'g>> {
        self.neighbour(self.record().chain(Role::Source).next)
    }

    /// Previous relation in the target node's chain.
    pub fn target_prev(&self) -> Option<Relation<'g>> {
        self.neighbour(self.record().chain(Role::Target).prev)
    }

    /// Next relation in the target node's chain.
    pub fn target_next(&self) -> Option<Relation<'g>> {
        self.neighbour(self.record().chain(Role::Target).next)
    }

    /// All properties, in chain order.
    pub fn properties(&self) -> IndexMap<String, PropertyValue> {
        self.graph.collect_properties(PropertyOwner::Relation(self.id))
    }

    /// One property value.
    pub fn property(&self, key: &str) -> Option<&'g PropertyValue> {
        self.graph.find_property(PropertyOwner::Relation(self.id), key)
    }
}

impl PartialEq for Relation<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for Relation<'_> {}

impl fmt::Debug for Relation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        f.debug_struct("Relation")
            .field("id", &self.id.index())
            .field("source", &record.source.index())
            .field("target", &record.target.index())
            .finish()
    }
}

impl fmt::Display for Relation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record();
        write!(f, "Relation({}-->{}", record.source, record.target)?;
        write_json(f, &self.properties())?;
        f.write_str(")")
    }
}

/// A view of a live relation that can edit its properties.
pub struct RelationMut<'g> {
    graph: &'g mut Graph,
    id: RelationId,
}

impl<'g> RelationMut<'g> {
    pub(crate) fn new(graph: &'g mut Graph, id: RelationId) -> Self {
        Self { graph, id }
    }

    /// The relation's id.
    pub fn id(&self) -> RelationId {
        self.id
    }

    /// Reborrow as a read-only handle.
    pub fn as_relation(&self) -> Relation<'_> {
        Relation::new(&*self.graph, self.id)
    }

    /// Set a property, replacing any existing value for `key`.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.graph
            .set_property(PropertyOwner::Relation(self.id), key.into(), value.into());
    }

    /// Remove a property. Returns whether it existed.
    pub fn del_property(&mut self, key: &str) -> bool {
        self.graph.del_property(PropertyOwner::Relation(self.id), key)
    }

    /// All properties, in chain order.
    pub fn properties(&self) -> IndexMap<String, PropertyValue> {
        self.graph.collect_properties(PropertyOwner::Relation(self.id))
    }
}
