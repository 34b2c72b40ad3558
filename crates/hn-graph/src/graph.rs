//! Core network data structures.

use hn_core::{ElementId, NodeId};

use crate::indexing::IndexMap;

/// A junction where element inlets/outlets meet. Mass is conserved here.
///
/// Nodes are numbered densely in ascending order of their caller key.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Caller's node (or zone) identifier.
    pub key: u32,
    /// Geodetic height in m, 0 unless set on the builder.
    pub height: f64,
    /// Elements that have this node as their inlet.
    pub inlet_elements: Vec<usize>,
    /// Elements that have this node as their outlet.
    pub outlet_elements: Vec<usize>,
    /// All adjacent elements, inlet connections first.
    pub elements: Vec<usize>,
}

impl Node {
    /// Number of element connections at this node.
    pub fn degree(&self) -> usize {
        self.elements.len()
    }
}

/// An edge of the network: one flow element between an inlet and an outlet node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub index: ElementId,
    /// Caller's element identifier.
    pub id: u32,
    /// Dense inlet node index.
    pub inlet: usize,
    /// Dense outlet node index.
    pub outlet: usize,
}

impl Element {
    /// The node at the other end of this element, seen from `node`.
    pub fn opposite(&self, node: usize) -> usize {
        if self.inlet == node {
            self.outlet
        } else {
            self.inlet
        }
    }
}

/// A validated, immutable flow network.
///
/// Guarantees established by [`crate::NetworkBuilder::build`]:
/// - every node has at least two element connections
/// - no element connects a node to itself
/// - all nodes form a single connected component
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    pub(crate) elements: Vec<Element>,
    pub(crate) reference_element: usize,
    pub(crate) numbering: Vec<usize>,
    pub(crate) index: IndexMap,
}

impl Network {
    /// Return all nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return all elements, parallel to the caller's element list.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Get a node by handle (returns None if out of bounds).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get an element by handle (returns None if out of bounds).
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    /// Dense index of the element whose inlet carries the reference pressure.
    pub fn reference_element(&self) -> usize {
        self.reference_element
    }

    /// Dense index of the node with the fixed reference pressure.
    pub fn reference_node(&self) -> usize {
        self.elements[self.reference_element].inlet
    }

    /// Breadth-first node order computed during the connectivity check.
    ///
    /// `bfs_numbering()[k]` is the node visited k-th, starting at node 0.
    pub fn bfs_numbering(&self) -> &[usize] {
        &self.numbering
    }

    /// Lookup tables from caller IDs/keys to dense indices.
    pub fn index_map(&self) -> &IndexMap {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::Id;

    #[test]
    fn element_opposite() {
        let e = Element {
            index: Id::from_index(0),
            id: 5,
            inlet: 1,
            outlet: 3,
        };
        assert_eq!(e.opposite(1), 3);
        assert_eq!(e.opposite(3), 1);
    }
}
