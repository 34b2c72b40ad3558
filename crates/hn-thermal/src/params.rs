//! Thermal parameter blocks and the element factory.

use hn_core::units::{k, w};
use hn_fluids::Fluid;
use serde::{Deserialize, Serialize};

use crate::element::{AdiabaticElement, HeatExchanger, ThermalElement};
use crate::error::ThermalResult;
use crate::heat_loss_pipe::HeatLossPipe;

fn one() -> u32 {
    1
}

fn ten_celsius() -> f64 {
    283.15
}

/// Thermal description of one element, tagged by type.
///
/// Volumes in m³, lengths in m, temperatures in K, heat fluxes in W.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThermalParams {
    Adiabatic {
        volume: f64,
    },
    HeatLossPipe {
        length: f64,
        inner_diameter: f64,
        #[serde(default = "one")]
        parallel_pipes: u32,
        /// W/(m·K)
        u_value_wall: f64,
        /// W/(m²·K)
        outer_heat_transfer_coefficient: f64,
        #[serde(default = "ten_celsius")]
        ambient_temperature: f64,
    },
    HeatExchanger {
        volume: f64,
        heat_flux: f64,
    },
}

impl ThermalParams {
    pub fn type_name(&self) -> &'static str {
        match self {
            ThermalParams::Adiabatic { .. } => "Adiabatic",
            ThermalParams::HeatLossPipe { .. } => "HeatLossPipe",
            ThermalParams::HeatExchanger { .. } => "HeatExchanger",
        }
    }

    pub fn instantiate(&self, fluid: &Fluid) -> ThermalResult<Box<dyn ThermalElement>> {
        Ok(match self {
            ThermalParams::Adiabatic { volume } => Box::new(AdiabaticElement::new(*volume, fluid)?),
            ThermalParams::HeatLossPipe {
                length,
                inner_diameter,
                parallel_pipes,
                u_value_wall,
                outer_heat_transfer_coefficient,
                ambient_temperature,
            } => Box::new(HeatLossPipe::new(
                *length,
                *inner_diameter,
                *parallel_pipes,
                *u_value_wall,
                *outer_heat_transfer_coefficient,
                k(*ambient_temperature),
                fluid,
            )?),
            ThermalParams::HeatExchanger { volume, heat_flux } => {
                Box::new(HeatExchanger::new(*volume, w(*heat_flux), fluid)?)
            }
        })
    }
}
