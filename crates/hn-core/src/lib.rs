//! hn-core: shared foundation for the hydronet workspace.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + residual norm)
//! - ids (compact dense handles for nodes and elements)
//! - error (shared error type)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{HnError, HnResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
