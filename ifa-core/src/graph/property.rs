//! Property Chains
//!
//! Each node and relation owns a singly-linked chain of key/value records
//! stored in the graph's property arena. Removed records go onto one
//! graph-wide free list, linked through their own `next` field.

use indexmap::IndexMap;
use tracing::trace;

use super::node::NodeId;
use super::relation::RelationId;
use super::Graph;
use crate::journal::Transaction;
use crate::value::PropertyValue;

/// Slot index of a property record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PropertyId(pub(crate) usize);

/// One key/value record. Free records keep stale contents until reused.
#[derive(Debug)]
pub(crate) struct PropertyRecord {
    pub(crate) key: String,
    pub(crate) value: PropertyValue,
    pub(crate) next: Option<PropertyId>,
}

/// The entity whose chain an operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PropertyOwner {
    Node(NodeId),
    Relation(RelationId),
}

/// Walks a property chain from its head.
pub(crate) struct PropertyChain<'g> {
    graph: &'g Graph,
    cursor: Option<PropertyId>,
}

impl<'g> Iterator for PropertyChain<'g> {
    type Item = &'g PropertyRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let record = &self.graph.properties[id.0];
        self.cursor = record.next;
        Some(record)
    }
}

impl Graph {
    pub(crate) fn property_chain(&self, owner: PropertyOwner) -> PropertyChain<'_> {
        PropertyChain {
            graph: self,
            cursor: self.property_owner_head(owner),
        }
    }

    /// Materialize an owner's chain into a map, in chain order.
    pub(crate) fn collect_properties(&self, owner: PropertyOwner) -> IndexMap<String, PropertyValue> {
        self.property_chain(owner)
            .map(|record| (record.key.clone(), record.value.clone()))
            .collect()
    }

    pub(crate) fn find_property(&self, owner: PropertyOwner, key: &str) -> Option<&PropertyValue> {
        self.property_chain(owner)
            .find(|record| record.key == key)
            .map(|record| &record.value)
    }

    fn property_head_mut(&mut self, owner: PropertyOwner) -> &mut Option<PropertyId> {
        match owner {
            PropertyOwner::Node(id) => &mut self.expect_node_mut(id).properties,
            PropertyOwner::Relation(id) => &mut self.expect_relation_mut(id).properties,
        }
    }

    /// Set `key` on the owner's chain, overwriting in place when the key
    /// already exists and prepending a new record otherwise.
    pub(crate) fn set_property(&mut self, owner: PropertyOwner, key: String, value: PropertyValue) {
        let mut tx = Transaction::begin(self, "set_property");
        write_property(&mut tx, owner, key, value);
        tx.commit();
    }

    /// Remove `key` from the owner's chain. Returns whether it was present.
    pub(crate) fn del_property(&mut self, owner: PropertyOwner, key: &str) -> bool {
        let mut tx = Transaction::begin(self, "del_property");
        let removed = remove_property(&mut tx, owner, key);
        tx.commit();
        removed
    }
}

/// Journaled body of [`Graph::set_property`].
pub(crate) fn write_property(
    tx: &mut Transaction<'_, Graph>,
    owner: PropertyOwner,
    key: String,
    value: PropertyValue,
) {
    let head = tx.property_owner_head(owner);
    let mut cursor = head;
    while let Some(id) = cursor {
        let record = &tx.properties[id.0];
        if record.key == key {
            tx.set(move |g| &mut g.properties[id.0].value, value);
            trace!(?owner, key = %key, "property overwritten");
            return;
        }
        cursor = record.next;
    }

    let log_key = key.clone();
    let id = match tx.free_property {
        Some(id) => {
            let next = tx.properties[id.0].next;
            tx.set(|g| &mut g.free_property, next);
            tx.set(
                move |g| &mut g.properties[id.0],
                PropertyRecord { key, value, next: head },
            );
            id
        }
        None => {
            let id = PropertyId(tx.properties.len());
            tx.perform(
                move |g| {
                    g.properties.push(PropertyRecord { key, value, next: head });
                },
                |g| {
                    g.properties.pop();
                },
            );
            id
        }
    };
    tx.set(move |g| g.property_head_mut(owner), Some(id));
    trace!(?owner, key = %log_key, property = id.0, "property added");
}

/// Journaled body of [`Graph::del_property`]: splice the record out with a
/// trailing pointer and push it onto the free list.
pub(crate) fn remove_property(tx: &mut Transaction<'_, Graph>, owner: PropertyOwner, key: &str) -> bool {
    let mut prev: Option<PropertyId> = None;
    let mut cursor = tx.property_owner_head(owner);
    while let Some(id) = cursor {
        let record = &tx.properties[id.0];
        let next = record.next;
        if record.key == key {
            match prev {
                None => tx.set(move |g| g.property_head_mut(owner), next),
                Some(prev) => tx.set(move |g| &mut g.properties[prev.0].next, next),
            }
            let free = tx.free_property;
            tx.set(move |g| &mut g.properties[id.0].next, free);
            tx.set(|g| &mut g.free_property, Some(id));
            trace!(?owner, key, "property removed");
            return true;
        }
        prev = cursor;
        cursor = next;
    }
    false
}

/// Hand a whole chain to the free property list in one splice: the chain's
/// tail is pointed at the current free head and the chain head becomes the
/// new free head.
pub(crate) fn release_chain(tx: &mut Transaction<'_, Graph>, head: Option<PropertyId>) {
    let Some(head) = head else {
        return;
    };
    let mut tail = head;
    while let Some(next) = tx.properties[tail.0].next {
        tail = next;
    }
    let free = tx.free_property;
    tx.set(move |g| &mut g.properties[tail.0].next, free);
    tx.set(|g| &mut g.free_property, Some(head));
}
