//! Element parameter blocks and the element factory.

use hn_controls::MassFluxController;
use hn_core::units::{kgps, m, pa};
use hn_fluids::Fluid;
use serde::{Deserialize, Serialize};

use crate::error::ComponentResult;
use crate::pipe::Pipe;
use crate::pressure_loss::PressureLossCoefficient;
use crate::pump::{ConstantMassFluxPump, ConstantPressurePump};
use crate::traits::FlowElement;

fn one() -> u32 {
    1
}

/// Physical parameters for one element, tagged by element type.
///
/// All values are SI: lengths in m, pressures in Pa, mass fluxes in kg/s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementParams {
    Pipe {
        length: f64,
        diameter: f64,
        roughness: f64,
        #[serde(default = "one")]
        parallel_pipes: u32,
    },
    ConstantPressurePump {
        pressure_head: f64,
    },
    ConstantMassFluxPump {
        mass_flux: f64,
    },
    PressureLossCoefficient {
        zeta: f64,
        diameter: f64,
        #[serde(default)]
        controller: Option<MassFluxController>,
    },
}

impl ElementParams {
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementParams::Pipe { .. } => "Pipe",
            ElementParams::ConstantPressurePump { .. } => "ConstantPressurePump",
            ElementParams::ConstantMassFluxPump { .. } => "ConstantMassFluxPump",
            ElementParams::PressureLossCoefficient { .. } => "PressureLossCoefficient",
        }
    }

    /// Validate parameters and create the flow element.
    pub fn instantiate(&self, fluid: &Fluid) -> ComponentResult<Box<dyn FlowElement>> {
        Ok(match self {
            ElementParams::Pipe {
                length,
                diameter,
                roughness,
                parallel_pipes,
            } => Box::new(Pipe::new(
                m(*length),
                m(*diameter),
                m(*roughness),
                *parallel_pipes,
                fluid,
            )?),
            ElementParams::ConstantPressurePump { pressure_head } => {
                Box::new(ConstantPressurePump::new(pa(*pressure_head))?)
            }
            ElementParams::ConstantMassFluxPump { mass_flux } => {
                Box::new(ConstantMassFluxPump::new(kgps(*mass_flux))?)
            }
            ElementParams::PressureLossCoefficient {
                zeta,
                diameter,
                controller,
            } => {
                let element = PressureLossCoefficient::new(*zeta, m(*diameter), fluid)?;
                match controller {
                    Some(c) => Box::new(element.with_controller(c.clone())?),
                    None => Box::new(element),
                }
            }
        })
    }
}
