//! Error types for the thermal layer.

use hn_core::HnError;
use hn_fluids::FluidError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermalError {
    #[error("Node {node} has no inflowing element; its temperature is undefined")]
    ZeroInflow { node: u32 },

    #[error("Invalid parameter {what}: {value}")]
    InvalidParameter { what: &'static str, value: f64 },

    #[error("Thermal element with id {id}: {source}")]
    Element { id: u32, source: Box<ThermalError> },

    #[error("Not supported by {element}: {what}")]
    NotSupported {
        element: &'static str,
        what: &'static str,
    },

    #[error("Size mismatch for {what}: expected {expected}, got {actual}")]
    Size {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown element id {id}")]
    UnknownElement { id: u32 },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),
}

pub type ThermalResult<T> = Result<T, ThermalError>;

impl ThermalError {
    pub(crate) fn for_element(self, id: u32) -> Self {
        ThermalError::Element {
            id,
            source: Box::new(self),
        }
    }
}

impl From<ThermalError> for HnError {
    fn from(e: ThermalError) -> Self {
        match e {
            ThermalError::ZeroInflow { .. } => HnError::Structural {
                what: e.to_string(),
            },
            other => HnError::InvalidArg {
                what: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_inflow_names_node() {
        let e = ThermalError::ZeroInflow { node: 17 };
        assert!(e.to_string().contains("17"));
        let hn: HnError = e.into();
        assert!(matches!(hn, HnError::Structural { .. }));
    }

    #[test]
    fn element_context_wraps_source() {
        let e = ThermalError::InvalidParameter {
            what: "volume",
            value: -1.0,
        }
        .for_element(4);
        let msg = e.to_string();
        assert!(msg.contains("id 4"));
        assert!(msg.contains("volume"));
    }
}
