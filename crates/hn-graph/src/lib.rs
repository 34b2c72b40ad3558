//! hn-graph: flow network topology for hydronet.
//!
//! Provides:
//! - Node/element data structures with inlet/outlet adjacency
//! - Builder translating caller node keys into a dense index space
//! - Structural validation (open ends, self-cyclic elements, disjoint sub-networks)
//! - ID lookup for solver integration
//!
//! # Example
//!
//! ```
//! use hn_graph::NetworkBuilder;
//!
//! let mut builder = NetworkBuilder::new();
//! builder.add_element(1, 10, 20); // pump
//! builder.add_element(2, 20, 10); // pipe
//! builder.set_reference_element(1);
//! let network = builder.build().unwrap();
//!
//! assert_eq!(network.nodes().len(), 2);
//! assert_eq!(network.elements().len(), 2);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod indexing;
pub(crate) mod validate;

pub use builder::NetworkBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{Element, Network, Node};
pub use indexing::IndexMap;
