//! hn-fluids: incompressible fluid description for hydronet.
//!
//! Provides:
//! - `Fluid`: constant density, heat capacity and conductivity, plus a
//!   temperature-dependent kinematic viscosity
//! - `LinearSpline`: clamped piecewise-linear lookup table
//! - `Fluid::water()` preset
//!
//! # Example
//!
//! ```
//! use hn_fluids::Fluid;
//! use hn_core::units::k;
//!
//! let water = Fluid::water();
//! let nu = water.kinematic_viscosity(k(313.15));
//! assert!(nu.value > 6.0e-7 && nu.value < 7.0e-7);
//! ```

pub mod error;
pub mod fluid;
pub mod spline;

pub use error::{FluidError, FluidResult};
pub use fluid::Fluid;
pub use spline::LinearSpline;
