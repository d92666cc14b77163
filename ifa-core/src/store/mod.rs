//! Slot Storage
//!
//! The storage layer underneath the graph: paged arenas that hold node,
//! relation and property slots, and the liveness bitsets that record which
//! node and relation slots are occupied.
//!
//! # Address Stability
//!
//! An arena is a list of pages, each allocated once with a fixed capacity
//! of [`PAGE_SIZE`] slots. Growing the arena appends a page; it never moves
//! a page that already exists. A slot index therefore names the same slot
//! for the lifetime of the arena, which is what lets relations refer to
//! each other by index inside the adjacency chains.

mod arena;
mod bitset;

pub use arena::{PagedArena, PAGE_SIZE};
pub use bitset::LivenessBitset;
