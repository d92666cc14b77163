//! IFA Core
//!
//! This crate provides an embedded, in-memory graph store built on
//! index-free adjacency. It implements:
//!
//! - Paged arenas that grow without moving existing slots
//! - LIFO free lists for node, relation and property slots
//! - Adjacency chains threaded directly through relations
//! - A rollback journal that makes every mutation atomic
//!
//! The crate is designed to be used both as a native Rust library and,
//! with the `python` feature, as a Python extension module via PyO3.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `store`: Paged arenas and liveness bitsets
//! - `journal`: Undo log and scoped transactions
//! - `graph`: The graph facade, handles, iterators and checkers
//! - `value`: Property values
//! - `options`: Construction options
//!
//! # Example
//!
//! ```rust
//! use ifa_core::{Graph, GraphError};
//!
//! let mut graph = Graph::new();
//! let a = graph.add_node("A");
//! let b = graph.add_node("B");
//! let r = graph.add_relation(a, b)?;
//!
//! // A node with relations cannot be deleted.
//! assert_eq!(graph.delete_node(a), Err(GraphError::HasRelations(a)));
//!
//! graph.delete_relation(r)?;
//! graph.delete_node(a)?;
//! assert_eq!(graph.node_count(), 1);
//!
//! // The freed slot is reused.
//! assert_eq!(graph.add_node("C"), a);
//! # Ok::<(), GraphError>(())
//! ```

pub mod error;
pub mod graph;
pub mod journal;
pub mod options;
pub mod store;
pub mod value;

#[cfg(feature = "python")]
mod python;

pub use error::{EntityKind, GraphError, Result};
pub use graph::{Graph, Node, NodeId, NodeMut, Relation, RelationId, RelationMut};
pub use options::GraphOptions;
pub use value::PropertyValue;
