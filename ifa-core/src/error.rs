//! Graph Errors
//!
//! Every user-facing failure of the graph store is a [`GraphError`]. All
//! three cases are detected before an operation writes anything, so an
//! `Err` never leaves partial state behind.

use thiserror::Error;

use crate::graph::{NodeId, RelationId};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Which arena an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A node slot.
    Node,
    /// A relation slot.
    Relation,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Node => f.write_str("node"),
            EntityKind::Relation => f.write_str("relation"),
        }
    }
}

/// Errors reported by graph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The index is out of range, or its slot is already free.
    #[error("{0} {1} already deleted")]
    AlreadyDeleted(EntityKind, usize),

    /// The node still has incident relations and cannot be deleted.
    #[error("node {} still has relations", .0.index())]
    HasRelations(NodeId),

    /// A relation endpoint does not name a live node.
    #[error("relation endpoint {} is not a live node", .0.index())]
    MissingEndpoint(NodeId),
}

impl GraphError {
    pub(crate) fn deleted_node(id: NodeId) -> Self {
        GraphError::AlreadyDeleted(EntityKind::Node, id.index())
    }

    pub(crate) fn deleted_relation(id: RelationId) -> Self {
        GraphError::AlreadyDeleted(EntityKind::Relation, id.index())
    }
}
