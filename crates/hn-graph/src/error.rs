//! Topology error types.

use hn_core::HnError;

pub type GraphResult<T> = Result<T, GraphError>;

/// Structural errors detected while building a network.
///
/// Element and node identifiers are the caller's IDs/keys, not dense indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No elements were added.
    EmptyNetwork,

    /// Two elements share the same ID.
    DuplicateElementId { id: u32 },

    /// A node is touched by a single element only.
    OpenEnd { element: u32, node: u32 },

    /// An element connects a node to itself.
    InvalidCyclicConnection { element: u32, node: u32 },

    /// The network consists of more than one connected component.
    ///
    /// Lists nodes and elements of every component except the largest.
    DisjointNetwork { nodes: Vec<u32>, elements: Vec<u32> },

    /// No reference element was selected.
    MissingReferenceElement,

    /// An element ID does not exist in the network.
    UnknownElement { id: u32 },

    /// ID not found in index map.
    IdNotFound { what: &'static str },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::EmptyNetwork => write!(f, "Network has no flow elements"),
            GraphError::DuplicateElementId { id } => {
                write!(f, "Flow element id {} is used more than once", id)
            }
            GraphError::OpenEnd { element, node } => write!(
                f,
                "Flow element with id {} is an open end of the hydraulic network (node {})",
                element, node
            ),
            GraphError::InvalidCyclicConnection { element, node } => write!(
                f,
                "Flow element with id {} is an invalid cyclic connection (node {})",
                element, node
            ),
            GraphError::DisjointNetwork { nodes, elements } => write!(
                f,
                "Network is not connected: disjoint sub-network with nodes {:?} and flow elements {:?}",
                nodes, elements
            ),
            GraphError::MissingReferenceElement => {
                write!(f, "No reference element selected for the fixed reference pressure")
            }
            GraphError::UnknownElement { id } => {
                write!(f, "Flow element with id {} does not exist", id)
            }
            GraphError::IdNotFound { what } => write!(f, "{} not found in index map", what),
        }
    }
}

impl std::error::Error for GraphError {}

impl From<GraphError> for HnError {
    fn from(err: GraphError) -> Self {
        HnError::Structural {
            what: err.to_string(),
        }
    }
}
