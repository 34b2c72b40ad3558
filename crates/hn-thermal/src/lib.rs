//! Thermal advection through a solved flow network.
//!
//! Each element is a well-mixed fluid volume with one state, its enthalpy
//! content `H = rho * V * h` in J. Given the element mass fluxes from a
//! hydraulic solve, one forward pass:
//!
//! 1. mixes the outlet enthalpies of all elements flowing into each node,
//!    weighted by mass flux;
//! 2. feeds every element from its upstream node (chosen by the sign of its
//!    own mass flux);
//! 3. evaluates per-element heat loss and state derivatives.
//!
//! Advancing the states in time is left to an outer integrator;
//! [`ForwardEuler`] is a minimal one.

pub mod element;
pub mod error;
pub mod heat_loss_pipe;
pub mod integrator;
pub mod model;
pub mod params;

pub use element::{AdiabaticElement, HeatExchanger, MixedVolume, ThermalElement};
pub use error::{ThermalError, ThermalResult};
pub use heat_loss_pipe::HeatLossPipe;
pub use integrator::ForwardEuler;
pub use model::{ThermalElementResult, ThermalNetworkModel, ThermalResults};
pub use params::ThermalParams;
