//! Stable indexing for solver integration.
//!
//! Maps caller identifiers (element IDs, node keys) to the dense indices used
//! by the solver vectors.

use std::collections::HashMap;

use crate::error::{GraphError, GraphResult};

/// Bidirectional lookup between caller identifiers and dense indices.
#[derive(Debug, Clone, Default)]
pub struct IndexMap {
    /// index -> element ID
    element_ids: Vec<u32>,
    /// index -> node key (ascending)
    node_keys: Vec<u32>,
    element_to_idx: HashMap<u32, usize>,
    node_to_idx: HashMap<u32, usize>,
}

impl IndexMap {
    pub(crate) fn new(element_ids: Vec<u32>, node_keys: Vec<u32>) -> Self {
        let element_to_idx = element_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();
        let node_to_idx = node_keys
            .iter()
            .enumerate()
            .map(|(i, &key)| (key, i))
            .collect();
        Self {
            element_ids,
            node_keys,
            element_to_idx,
            node_to_idx,
        }
    }

    /// Number of nodes in the index.
    pub fn node_count(&self) -> usize {
        self.node_keys.len()
    }

    /// Number of elements in the index.
    pub fn element_count(&self) -> usize {
        self.element_ids.len()
    }

    /// Dense index of an element ID.
    pub fn element_idx(&self, id: u32) -> GraphResult<usize> {
        self.element_to_idx
            .get(&id)
            .copied()
            .ok_or(GraphError::IdNotFound { what: "element id" })
    }

    /// Dense index of a node key.
    pub fn node_idx(&self, key: u32) -> GraphResult<usize> {
        self.node_to_idx
            .get(&key)
            .copied()
            .ok_or(GraphError::IdNotFound { what: "node key" })
    }

    /// Element ID at a dense index (panics if out of bounds).
    pub fn element_id(&self, i: usize) -> u32 {
        self.element_ids[i]
    }

    /// Node key at a dense index (panics if out of bounds).
    pub fn node_key(&self, i: usize) -> u32 {
        self.node_keys[i]
    }

    pub fn element_ids(&self) -> &[u32] {
        &self.element_ids
    }

    pub fn node_keys(&self) -> &[u32] {
        &self.node_keys
    }
}
