//! Relation Store and Adjacency Chains
//!
//! A relation sits in two doubly-linked chains at once: the chain of its
//! source node and the chain of its target node. Each relation therefore
//! has two pointer pairs, one per role.
//!
//! # Chain Links
//!
//! A neighbour in a chain may reach the shared node through either of its
//! own pointer pairs: relation `r2 = (b -> a)` sits in `a`'s chain through
//! its target pair, while `r1 = (a -> c)` sits there through its source
//! pair. Every pointer is a [`ChainLink`] that stores the neighbour *and*
//! the role it plays at the shared node, fixed when the link is made.
//! Splicing follows the stored role instead of comparing endpoints.
//!
//! # Insert
//!
//! New relations go to the head of both chains:
//!
//! ```text
//! before:  a.head -> r1 -> r0
//! after:   a.head -> rN -> r1 -> r0      (rN.prev = None, r1.prev = rN)
//! ```
//!
//! # Delete
//!
//! For each role the relation is unlinked from the chain of that endpoint:
//! its predecessor (or the node head) takes its `next`, and its successor
//! takes its `prev`. Self-loops occupy two links in the same chain and are
//! unlinked one role at a time.

use tracing::{debug, trace};

use super::node::NodeId;
use super::property::{release_chain, PropertyId};
use super::Graph;
use crate::error::{GraphError, Result};
use crate::journal::Transaction;

/// Identifier of a relation: its slot index in the relation arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationId(usize);

impl RelationId {
    /// Get the raw slot index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for RelationId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for RelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role a relation plays at one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Role {
    Source,
    Target,
}

impl Role {
    pub(crate) const BOTH: [Role; 2] = [Role::Source, Role::Target];
}

/// A position in some node's adjacency chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChainLink {
    pub(crate) relation: RelationId,
    /// Which of `relation`'s pointer pairs continues this chain.
    pub(crate) role: Role,
}

/// One prev/next pointer pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ChainPointers {
    pub(crate) prev: Option<ChainLink>,
    pub(crate) next: Option<ChainLink>,
}

/// State of one relation slot.
#[derive(Debug)]
pub(crate) enum RelationSlot {
    Occupied(RelationRecord),
    Free { next: Option<RelationId> },
}

impl RelationSlot {
    pub(crate) fn record(&self) -> Option<&RelationRecord> {
        match self {
            RelationSlot::Occupied(record) => Some(record),
            RelationSlot::Free { .. } => None,
        }
    }
}

/// A live relation.
#[derive(Debug)]
pub(crate) struct RelationRecord {
    pub(crate) id: RelationId,
    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
    /// Links in the source node's chain.
    pub(crate) source_chain: ChainPointers,
    /// Links in the target node's chain.
    pub(crate) target_chain: ChainPointers,
    pub(crate) properties: Option<PropertyId>,
}

impl RelationRecord {
    fn new(id: RelationId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            source_chain: ChainPointers::default(),
            target_chain: ChainPointers::default(),
            properties: None,
        }
    }

    pub(crate) fn endpoint(&self, role: Role) -> NodeId {
        match role {
            Role::Source => self.source,
            Role::Target => self.target,
        }
    }

    pub(crate) fn chain(&self, role: Role) -> &ChainPointers {
        match role {
            Role::Source => &self.source_chain,
            Role::Target => &self.target_chain,
        }
    }

    pub(crate) fn chain_mut(&mut self, role: Role) -> &mut ChainPointers {
        match role {
            Role::Source => &mut self.source_chain,
            Role::Target => &mut self.target_chain,
        }
    }
}

impl Graph {
    /// Add a relation from `from` to `to` and return its id.
    ///
    /// Both endpoints must be live nodes. `from == to` is allowed; such a
    /// self-loop appears twice in the node's chain, once per role.
    pub fn add_relation(&mut self, from: NodeId, to: NodeId) -> Result<RelationId> {
        for endpoint in [from, to] {
            if !self.contains_node(endpoint) {
                return Err(GraphError::MissingEndpoint(endpoint));
            }
        }

        let mut tx = Transaction::begin(self, "add_relation");

        let id = match tx.free_relation {
            Some(id) => {
                let next = match &tx.relations[id.index()] {
                    RelationSlot::Free { next } => *next,
                    RelationSlot::Occupied(_) => {
                        panic!("free relation list points at live slot {}", id.index())
                    }
                };
                trace!(relation = id.index(), "reusing free relation slot");
                tx.set(|g| &mut g.free_relation, next);
                tx.set(
                    move |g| &mut g.relations[id.index()],
                    RelationSlot::Occupied(RelationRecord::new(id, from, to)),
                );
                id
            }
            None => {
                let id = RelationId(tx.relations.len());
                tx.perform(
                    move |g| {
                        g.relations
                            .push(RelationSlot::Occupied(RelationRecord::new(id, from, to)));
                    },
                    |g| {
                        g.relations.pop();
                    },
                );
                id
            }
        };

        for role in Role::BOTH {
            link_at_head(&mut tx, id, role);
        }

        tx.perform(
            move |g| g.live_relations.set(id.index(), true),
            move |g| g.live_relations.set(id.index(), false),
        );
        tx.increment(|g| &mut g.relation_count);
        tx.commit();

        debug!(
            relation = id.index(),
            source = from.index(),
            target = to.index(),
            "relation added"
        );
        Ok(id)
    }

    /// Delete a relation, unlinking it from both endpoint chains.
    pub fn delete_relation(&mut self, id: RelationId) -> Result<()> {
        let properties = self
            .relation_record(id)
            .ok_or_else(|| GraphError::deleted_relation(id))?
            .properties;

        let mut tx = Transaction::begin(self, "delete_relation");
        tx.perform(
            move |g| g.live_relations.set(id.index(), false),
            move |g| g.live_relations.set(id.index(), true),
        );

        for role in Role::BOTH {
            unlink(&mut tx, id, role);
        }
        release_chain(&mut tx, properties);

        let next = tx.free_relation;
        tx.set(
            move |g| &mut g.relations[id.index()],
            RelationSlot::Free { next },
        );
        tx.set(|g| &mut g.free_relation, Some(id));
        tx.decrement(|g| &mut g.relation_count);
        tx.commit();

        debug!(relation = id.index(), "relation deleted");
        Ok(())
    }
}

/// Push relation `id` onto the head of the chain of its `role` endpoint.
fn link_at_head(tx: &mut Transaction<'_, Graph>, id: RelationId, role: Role) {
    let node = tx.expect_relation(id).endpoint(role);
    let head = tx.expect_node(node).relations;
    let here = ChainLink { relation: id, role };

    tx.set(move |g| &mut g.expect_relation_mut(id).chain_mut(role).prev, None);
    tx.set(move |g| &mut g.expect_relation_mut(id).chain_mut(role).next, head);
    if let Some(old) = head {
        tx.set(
            move |g| &mut g.expect_relation_mut(old.relation).chain_mut(old.role).prev,
            Some(here),
        );
    }
    tx.set(move |g| &mut g.expect_node_mut(node).relations, Some(here));
}

/// Splice relation `id` out of the chain of its `role` endpoint.
fn unlink(tx: &mut Transaction<'_, Graph>, id: RelationId, role: Role) {
    let record = tx.expect_relation(id);
    let node = record.endpoint(role);
    let ChainPointers { prev, next } = *record.chain(role);

    match prev {
        None => {
            debug_assert_eq!(
                tx.expect_node(node).relations,
                Some(ChainLink { relation: id, role }),
                "chain head of node {node} does not point at relation {id}"
            );
            tx.set(move |g| &mut g.expect_node_mut(node).relations, next);
        }
        Some(prev) => tx.set(
            move |g| &mut g.expect_relation_mut(prev.relation).chain_mut(prev.role).next,
            next,
        ),
    }

    if let Some(next_link) = next {
        tx.set(
            move |g| &mut g.expect_relation_mut(next_link.relation).chain_mut(next_link.role).prev,
            prev,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(graph: &Graph, node: NodeId) -> Vec<usize> {
        graph
            .node(node)
            .unwrap()
            .relations()
            .map(|r| r.id().index())
            .collect()
    }

    #[test]
    fn insert_goes_to_the_head_of_both_chains() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");

        let r0 = graph.add_relation(a, b).unwrap();
        let r1 = graph.add_relation(c, a).unwrap();
        let r2 = graph.add_relation(a, c).unwrap();

        assert_eq!(chain_of(&graph, a), vec![r2.0, r1.0, r0.0]);
        assert_eq!(chain_of(&graph, b), vec![r0.0]);
        assert_eq!(chain_of(&graph, c), vec![r2.0, r1.0]);

        let rec = graph.expect_relation(r1);
        assert_eq!(rec.source_chain.prev, Some(ChainLink { relation: r2, role: Role::Target }));
        assert_eq!(rec.target_chain.prev, Some(ChainLink { relation: r2, role: Role::Source }));
        assert_eq!(rec.target_chain.next, Some(ChainLink { relation: r0, role: Role::Source }));
        assert_eq!(graph.check_adjacency(), None);
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let ghost = NodeId::from(7);

        assert_eq!(
            graph.add_relation(a, ghost),
            Err(GraphError::MissingEndpoint(ghost))
        );
        assert_eq!(
            graph.add_relation(ghost, a),
            Err(GraphError::MissingEndpoint(ghost))
        );

        let b = graph.add_node("b");
        graph.delete_node(b).unwrap();
        assert_eq!(graph.add_relation(a, b), Err(GraphError::MissingEndpoint(b)));
        assert_eq!(graph.relation_count(), 0);
        assert!(graph.relations.is_empty());
    }

    #[test]
    fn self_loop_appears_once_per_role() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let r0 = graph.add_relation(a, b).unwrap();
        let lp = graph.add_relation(a, a).unwrap();

        assert_eq!(chain_of(&graph, a), vec![lp.0, lp.0, r0.0]);
        assert_eq!(graph.check_adjacency(), None);

        graph.delete_relation(lp).unwrap();
        assert_eq!(chain_of(&graph, a), vec![r0.0]);
        assert_eq!(graph.check_adjacency(), None);
    }

    #[test]
    fn delete_twice_fails() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let r = graph.add_relation(a, b).unwrap();

        graph.delete_relation(r).unwrap();
        assert_eq!(graph.delete_relation(r), Err(GraphError::deleted_relation(r)));
        assert_eq!(
            graph.delete_relation(RelationId(99)),
            Err(GraphError::deleted_relation(RelationId(99)))
        );
        assert_eq!(graph.relation_count(), 0);
    }

    #[test]
    fn freed_relation_slots_are_reused_lifo() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let ids: Vec<_> = (0..4).map(|_| graph.add_relation(a, b).unwrap()).collect();

        graph.delete_relation(ids[0]).unwrap();
        graph.delete_relation(ids[2]).unwrap();

        assert_eq!(graph.add_relation(b, a).unwrap(), ids[2]);
        assert_eq!(graph.add_relation(b, a).unwrap(), ids[0]);
        assert_eq!(graph.add_relation(b, a).unwrap(), RelationId(4));
        assert_eq!(graph.check_relations(), None);
        assert_eq!(graph.check_adjacency(), None);
    }

    #[test]
    fn reused_relation_starts_without_properties() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let r = graph.add_relation(a, b).unwrap();
        graph.set_relation_property(r, "weight", 3).unwrap();
        graph.delete_relation(r).unwrap();

        let reused = graph.add_relation(b, a).unwrap();
        assert_eq!(reused, r);
        assert!(graph.relation_properties(reused).unwrap().is_empty());
        assert!(graph.free_property.is_some());
    }
}
