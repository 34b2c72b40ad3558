//! Incremental network builder.

use std::collections::{BTreeMap, BTreeSet};

use hn_core::{ElementId, Id};
use tracing::debug;

use crate::error::GraphResult;
use crate::graph::{Element, Network, Node};
use crate::indexing::IndexMap;
use crate::validate;

/// Builder for constructing a flow network from an element list.
///
/// Elements are given as `(id, inlet_key, outlet_key)` triples where the keys
/// are arbitrary node (or zone) identifiers. `build()` assigns dense node
/// indices by ascending key, builds adjacency and validates the topology.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    elements: Vec<(u32, u32, u32)>,
    heights: BTreeMap<u32, f64>,
    reference_element: Option<u32>,
}

impl NetworkBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element connecting `inlet_key` to `outlet_key`.
    ///
    /// Returns the dense element handle (position in insertion order).
    pub fn add_element(&mut self, id: u32, inlet_key: u32, outlet_key: u32) -> ElementId {
        let handle = Id::from_index(self.elements.len());
        self.elements.push((id, inlet_key, outlet_key));
        handle
    }

    /// Set the geodetic height (m) of a node. Unset nodes sit at 0 m.
    pub fn set_node_height(&mut self, key: u32, height: f64) {
        self.heights.insert(key, height);
    }

    /// Select the element whose inlet node carries the reference pressure.
    pub fn set_reference_element(&mut self, id: u32) {
        self.reference_element = Some(id);
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Build and validate the network, returning an immutable `Network`.
    pub fn build(self) -> GraphResult<Network> {
        validate::validate_elements(&self.elements, self.reference_element)?;

        let keys: BTreeSet<u32> = self
            .elements
            .iter()
            .flat_map(|&(_, inlet, outlet)| [inlet, outlet])
            .collect();
        let node_keys: Vec<u32> = keys.into_iter().collect();
        let element_ids: Vec<u32> = self.elements.iter().map(|&(id, _, _)| id).collect();
        let index = IndexMap::new(element_ids, node_keys);

        let mut nodes: Vec<Node> = index
            .node_keys()
            .iter()
            .enumerate()
            .map(|(i, &key)| Node {
                id: Id::from_index(i),
                key,
                height: self.heights.get(&key).copied().unwrap_or(0.0),
                inlet_elements: Vec::new(),
                outlet_elements: Vec::new(),
                elements: Vec::new(),
            })
            .collect();

        let mut elements = Vec::with_capacity(self.elements.len());
        for (i, &(id, inlet_key, outlet_key)) in self.elements.iter().enumerate() {
            let inlet = index.node_idx(inlet_key)?;
            let outlet = index.node_idx(outlet_key)?;
            nodes[inlet].inlet_elements.push(i);
            nodes[outlet].outlet_elements.push(i);
            elements.push(Element {
                index: Id::from_index(i),
                id,
                inlet,
                outlet,
            });
        }
        for node in &mut nodes {
            let mut all = node.inlet_elements.clone();
            all.extend_from_slice(&node.outlet_elements);
            node.elements = all;
        }

        let reference_id = self.reference_element.unwrap_or_default();
        let reference_element = index.element_idx(reference_id)?;

        validate::validate_adjacency(&nodes, &elements)?;
        let numbering = validate::bfs_numbering(&nodes, &elements)?;

        debug!(
            nodes = nodes.len(),
            elements = elements.len(),
            "network topology built"
        );

        Ok(Network {
            nodes,
            elements,
            reference_element,
            numbering,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphError;

    fn ring(n: u32) -> NetworkBuilder {
        let mut builder = NetworkBuilder::new();
        for i in 0..n {
            builder.add_element(i + 1, 100 + i, 100 + (i + 1) % n);
        }
        builder.set_reference_element(1);
        builder
    }

    #[test]
    fn builder_assigns_nodes_by_ascending_key() {
        let mut builder = NetworkBuilder::new();
        builder.add_element(1, 30, 10);
        builder.add_element(2, 10, 20);
        builder.add_element(3, 20, 30);
        builder.set_reference_element(2);
        let net = builder.build().unwrap();

        let keys: Vec<u32> = net.nodes().iter().map(|n| n.key).collect();
        assert_eq!(keys, vec![10, 20, 30]);
        assert_eq!(net.elements()[0].inlet, 2);
        assert_eq!(net.elements()[0].outlet, 0);
        assert_eq!(net.reference_element(), 1);
        assert_eq!(net.reference_node(), 0);
    }

    #[test]
    fn builder_adjacency_lists() {
        let net = ring(3).build().unwrap();
        for node in net.nodes() {
            assert_eq!(node.inlet_elements.len(), 1);
            assert_eq!(node.outlet_elements.len(), 1);
            assert_eq!(node.degree(), 2);
        }
        assert_eq!(net.nodes()[0].inlet_elements, vec![0]);
        assert_eq!(net.nodes()[0].outlet_elements, vec![2]);
    }

    #[test]
    fn builder_node_heights() {
        let mut builder = ring(2);
        builder.set_node_height(101, 12.5);
        let net = builder.build().unwrap();
        assert_eq!(net.nodes()[0].height, 0.0);
        assert_eq!(net.nodes()[1].height, 12.5);
    }

    #[test]
    fn builder_unknown_reference() {
        let mut builder = ring(3);
        builder.set_reference_element(77);
        assert_eq!(
            builder.build().unwrap_err(),
            GraphError::UnknownElement { id: 77 }
        );
    }
}
