//! hn-components: flow element library for hydronet.
//!
//! Provides the hydraulic elements that sit on the edges of a network:
//! - `Pipe`: Darcy–Weisbach friction with a laminar/turbulent blended friction factor
//! - `ConstantPressurePump`: fixed pressure head
//! - `ConstantMassFluxPump`: fixed mass flux
//! - `PressureLossCoefficient`: zeta-value loss, optionally modulated by a controller
//!
//! Every element implements [`FlowElement`]: a residual ("system function")
//! that vanishes when mass flux and boundary pressures satisfy the element's
//! physical law, plus its partial derivatives.
//!
//! # Example
//!
//! ```
//! use hn_components::{FlowElement, Pipe};
//! use hn_core::units::m;
//! use hn_fluids::Fluid;
//!
//! let pipe = Pipe::new(m(100.0), m(0.05), m(1e-5), 1, &Fluid::water()).unwrap();
//! let dp = pipe.pressure_loss(0.5);
//! // residual vanishes when the pressure difference equals the friction loss
//! assert!(pipe.system_function(0.5, 2.0e5 + dp, 2.0e5).abs() < 1e-9);
//! ```

pub mod common;
pub mod error;
pub mod friction;
pub mod params;
pub mod pipe;
pub mod pressure_loss;
pub mod pump;
pub mod traits;

// Re-exports
pub use error::{ComponentError, ComponentResult};
pub use params::ElementParams;
pub use pipe::Pipe;
pub use pressure_loss::PressureLossCoefficient;
pub use pump::{ConstantMassFluxPump, ConstantPressurePump};
pub use traits::{ElementInput, FlowElement, Partials};
