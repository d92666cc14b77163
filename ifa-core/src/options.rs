//! Graph Options
//!
//! Construction-time knobs for a [`Graph`](crate::Graph). Reserving page
//! table slots avoids reallocating the outer page list while a graph fills
//! up; pages themselves are still appended one at a time.

use serde::Deserialize;

/// Construction options for a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphOptions {
    /// Page table entries to reserve for the node arena.
    pub node_pages: usize,

    /// Page table entries to reserve for the relation arena.
    pub relation_pages: usize,

    /// Page table entries to reserve for the property arena.
    pub property_pages: usize,
}

impl GraphOptions {
    /// Parse options from a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reserve room for roughly `nodes` nodes and `relations` relations.
    pub fn sized_for(nodes: usize, relations: usize) -> Self {
        use crate::store::PAGE_SIZE;
        Self {
            node_pages: nodes.div_ceil(PAGE_SIZE),
            relation_pages: relations.div_ceil(PAGE_SIZE),
            property_pages: 0,
        }
    }
}
