//! Consistency Checkers
//!
//! Full-structure scans used by tests to confirm the store's invariants.
//! Each returns `None` when the structure is sound, or the first slot that
//! violates an invariant.

use super::node::{NodeId, NodeSlot};
use super::relation::{RelationId, RelationSlot, Role};
use super::Graph;

impl Graph {
    /// Check node slots.
    ///
    /// A live slot must hold a record whose id is its own index. A free
    /// slot must not be marked live and must not link to itself. Walking
    /// the free list must only reach free slots and must terminate.
    pub fn check_nodes(&self) -> Option<NodeId> {
        for (index, slot) in self.nodes.iter().enumerate() {
            let live = self.live_nodes.get(index);
            let sound = match slot {
                NodeSlot::Occupied(record) => live && record.id.index() == index,
                NodeSlot::Free { next } => {
                    !live && next.map_or(true, |n| n.index() != index && n.index() < self.nodes.len())
                }
            };
            if !sound {
                return Some(NodeId::from(index));
            }
        }

        let mut cursor = self.free_node;
        let mut steps = 0;
        while let Some(id) = cursor {
            steps += 1;
            if steps > self.nodes.len() || self.live_nodes.get(id.index()) {
                return Some(id);
            }
            cursor = match self.nodes.get(id.index()) {
                Some(NodeSlot::Free { next }) => *next,
                _ => return Some(id),
            };
        }
        None
    }

    /// Check relation slots.
    ///
    /// No relation reachable through the free list may be marked live, and
    /// occupied slots must agree with the liveness bitset.
    pub fn check_relations(&self) -> Option<RelationId> {
        let mut cursor = self.free_relation;
        let mut steps = 0;
        while let Some(id) = cursor {
            steps += 1;
            if steps > self.relations.len() || self.live_relations.get(id.index()) {
                return Some(id);
            }
            cursor = match self.relations.get(id.index()) {
                Some(RelationSlot::Free { next }) => *next,
                _ => return Some(id),
            };
        }

        for (index, slot) in self.relations.iter().enumerate() {
            let live = self.live_relations.get(index);
            let sound = match slot {
                RelationSlot::Occupied(record) => live && record.id.index() == index,
                RelationSlot::Free { .. } => !live,
            };
            if !sound {
                return Some(RelationId::from(index));
            }
        }
        None
    }

    /// Check adjacency chains.
    ///
    /// Walks every live node's chain and confirms that each link names a
    /// live relation whose endpoint for that role is the node, and whose
    /// `prev` pointer names the link just visited. Every live relation must
    /// be visited exactly twice overall, once per role.
    pub fn check_adjacency(&self) -> Option<RelationId> {
        let mut visits = vec![0u8; self.relations.len()];
        let budget = 2 * self.relations.len();

        for node in self.nodes() {
            let mut prev = None;
            let mut cursor = self.expect_node(node.id()).relations;
            let mut steps = 0;
            while let Some(link) = cursor {
                steps += 1;
                let id = link.relation;
                let Some(record) = self.relation_record(id) else {
                    return Some(id);
                };
                let pointers = record.chain(link.role);
                if steps > budget || record.endpoint(link.role) != node.id() || pointers.prev != prev {
                    return Some(id);
                }
                visits[id.index()] = visits[id.index()].saturating_add(1);
                prev = Some(link);
                cursor = pointers.next;
            }
        }

        for (index, count) in visits.iter().enumerate() {
            let expected = if self.live_relations.get(index) {
                Role::BOTH.len() as u8
            } else {
                0
            };
            if *count != expected {
                return Some(RelationId::from(index));
            }
        }
        None
    }
}
