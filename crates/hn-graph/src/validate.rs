//! Topology validation.
//!
//! One validator serves both the hydraulic and the thermal layer. The open-end
//! check counts the combined (inlet + outlet) adjacency of a node.

use std::collections::{HashSet, VecDeque};

use tracing::warn;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Element, Node};

/// Checks that only need the raw element list.
pub(crate) fn validate_elements(
    elements: &[(u32, u32, u32)],
    reference_element: Option<u32>,
) -> GraphResult<()> {
    if elements.is_empty() {
        return Err(GraphError::EmptyNetwork);
    }

    let mut seen = HashSet::with_capacity(elements.len());
    for &(id, _, _) in elements {
        if !seen.insert(id) {
            return Err(GraphError::DuplicateElementId { id });
        }
    }

    match reference_element {
        None => Err(GraphError::MissingReferenceElement),
        Some(id) if !seen.contains(&id) => Err(GraphError::UnknownElement { id }),
        Some(_) => Ok(()),
    }
}

/// Reject open ends and elements listed twice at the same node.
pub(crate) fn validate_adjacency(nodes: &[Node], elements: &[Element]) -> GraphResult<()> {
    for node in nodes {
        if node.elements.len() < 2 {
            // A node always has at least one element, since nodes come from element endpoints.
            let element = node.elements.first().map_or(0, |&e| elements[e].id);
            return Err(GraphError::OpenEnd {
                element,
                node: node.key,
            });
        }

        let mut seen = HashSet::with_capacity(node.elements.len());
        for &e in &node.elements {
            if !seen.insert(e) {
                return Err(GraphError::InvalidCyclicConnection {
                    element: elements[e].id,
                    node: node.key,
                });
            }
        }
    }
    Ok(())
}

/// Breadth-first numbering starting at node 0.
///
/// Each newly numbered node appends its unvisited neighbors to the work queue.
/// If the queue runs dry early the network is disjoint; every component
/// except the largest is reported.
pub(crate) fn bfs_numbering(nodes: &[Node], elements: &[Element]) -> GraphResult<Vec<usize>> {
    let mut component = vec![usize::MAX; nodes.len()];
    let mut components: Vec<Vec<usize>> = Vec::new();

    for start in 0..nodes.len() {
        if component[start] != usize::MAX {
            continue;
        }
        let label = components.len();
        let order = visit(nodes, elements, start, label, &mut component);
        components.push(order);
    }

    if components.len() == 1 {
        return Ok(components.swap_remove(0));
    }

    let largest = components
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.len().cmp(&b.1.len()).then(b.0.cmp(&a.0)))
        .map_or(0, |(i, _)| i);

    let mut bad_nodes = Vec::new();
    let mut bad_elements = Vec::new();
    for (label, members) in components.iter().enumerate() {
        if label == largest {
            continue;
        }
        for &n in members {
            bad_nodes.push(nodes[n].key);
        }
    }
    for element in elements {
        if component[element.inlet] != largest {
            bad_elements.push(element.id);
        }
    }
    bad_nodes.sort_unstable();
    bad_elements.sort_unstable();

    warn!(
        components = components.len(),
        "flow network is split into disjoint sub-networks"
    );
    Err(GraphError::DisjointNetwork {
        nodes: bad_nodes,
        elements: bad_elements,
    })
}

fn visit(
    nodes: &[Node],
    elements: &[Element],
    start: usize,
    label: usize,
    component: &mut [usize],
) -> Vec<usize> {
    let mut order = Vec::new();
    let mut queue = VecDeque::from([start]);
    component[start] = label;
    while let Some(n) = queue.pop_front() {
        order.push(n);
        for &e in &nodes[n].elements {
            let next = elements[e].opposite(n);
            if component[next] == usize::MAX {
                component[next] = label;
                queue.push_back(next);
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use crate::{GraphError, NetworkBuilder};

    #[test]
    fn empty_network_rejected() {
        let builder = NetworkBuilder::new();
        assert_eq!(builder.build().unwrap_err(), GraphError::EmptyNetwork);
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut builder = NetworkBuilder::new();
        builder.add_element(1, 1, 2);
        builder.add_element(1, 2, 1);
        builder.set_reference_element(1);
        assert_eq!(
            builder.build().unwrap_err(),
            GraphError::DuplicateElementId { id: 1 }
        );
    }

    #[test]
    fn missing_reference_rejected() {
        let mut builder = NetworkBuilder::new();
        builder.add_element(1, 1, 2);
        builder.add_element(2, 2, 1);
        assert_eq!(
            builder.build().unwrap_err(),
            GraphError::MissingReferenceElement
        );
    }

    #[test]
    fn self_loop_rejected() {
        let mut builder = NetworkBuilder::new();
        builder.add_element(1, 1, 2);
        builder.add_element(2, 2, 1);
        builder.add_element(3, 2, 2);
        builder.set_reference_element(1);
        assert_eq!(
            builder.build().unwrap_err(),
            GraphError::InvalidCyclicConnection { element: 3, node: 2 }
        );
    }

    #[test]
    fn bfs_numbering_visits_all_nodes_once() {
        let mut builder = NetworkBuilder::new();
        builder.add_element(1, 1, 2);
        builder.add_element(2, 2, 3);
        builder.add_element(3, 3, 1);
        builder.add_element(4, 2, 4);
        builder.add_element(5, 4, 3);
        builder.set_reference_element(1);
        let net = builder.build().unwrap();

        let numbering = net.bfs_numbering();
        assert_eq!(numbering[0], 0);
        let mut sorted = numbering.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
    }
}
