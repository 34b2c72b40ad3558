//! hn-controls: flow controllers for hydronet.
//!
//! Controllers attach to pressure-loss elements and supply an additive
//! correction to the element's zeta value so that the element's mass flux
//! tracks a setpoint.
//!
//! Controllers follow sampled semantics: the output is evaluated from the
//! current mass flux and the integral state frozen at the last completed
//! step. The integral only advances in `step_completed`, so repeated
//! evaluation within one step never drifts.

pub mod controller;
pub mod error;

pub use controller::{ControllerKind, MassFluxController, MassFluxControllerState};
pub use error::{ControlError, ControlResult};
