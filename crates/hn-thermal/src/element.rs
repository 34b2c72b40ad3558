//! Thermal element contract and the simple variants.

use std::fmt::Debug;

use hn_core::units::{Power, Temperature};
use hn_fluids::Fluid;

use crate::error::{ThermalError, ThermalResult};

pub(crate) fn check_positive(value: f64, what: &'static str) -> ThermalResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ThermalError::InvalidParameter { what, value })
    }
}

/// Well-mixed fluid volume shared by all thermal elements.
///
/// The state is the enthalpy content `H` in J; the outlet specific enthalpy
/// equals the mixed content `h = H / (rho * V)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedVolume {
    /// m³
    pub volume: f64,
    /// kg/m³
    pub density: f64,
    /// J/(kg·K)
    pub heat_capacity: f64,
    /// J
    pub enthalpy: f64,
    /// Absolute mass flux through the volume, kg/s.
    pub mass_flux: f64,
    /// Specific enthalpy at the effective inlet, J/kg.
    pub inlet_specific_enthalpy: f64,
}

impl MixedVolume {
    pub fn new(volume: f64, fluid: &Fluid) -> ThermalResult<Self> {
        fluid.validate()?;
        let volume = check_positive(volume, "volume")?;
        Ok(Self {
            volume,
            density: fluid.density,
            heat_capacity: fluid.heat_capacity,
            enthalpy: 0.0,
            mass_flux: 0.0,
            inlet_specific_enthalpy: 0.0,
        })
    }

    /// Fluid mass in kg.
    pub fn mass(&self) -> f64 {
        self.density * self.volume
    }

    /// Enthalpy content of the volume filled with fluid at `t` (K).
    pub fn content_at(&self, t: f64) -> f64 {
        self.mass() * self.heat_capacity * t
    }

    pub fn specific_enthalpy(&self) -> f64 {
        self.enthalpy / self.mass()
    }

    pub fn temperature(&self) -> f64 {
        self.specific_enthalpy() / self.heat_capacity
    }

    pub fn inlet_temperature(&self) -> f64 {
        self.inlet_specific_enthalpy / self.heat_capacity
    }

    /// Net enthalpy carried into the volume by the flow, W.
    pub fn advection(&self) -> f64 {
        self.mass_flux * (self.inlet_specific_enthalpy - self.specific_enthalpy())
    }
}

/// One element of the thermal network.
///
/// Implementors own a [`MixedVolume`] and decide how much heat leaves it to
/// the surroundings. Inputs an element does not consume are rejected with
/// [`ThermalError::NotSupported`].
pub trait ThermalElement: Debug + Send {
    fn type_name(&self) -> &'static str;

    fn volume(&self) -> &MixedVolume;

    fn volume_mut(&mut self) -> &mut MixedVolume;

    /// Heat leaving the fluid to the surroundings at the current inflow, W.
    fn ambient_heat_loss(&self) -> f64;

    /// Feed the element from its upstream node.
    fn set_inflow(&mut self, mass_flux: f64, inlet_specific_enthalpy: f64) {
        let v = self.volume_mut();
        v.mass_flux = mass_flux.abs();
        v.inlet_specific_enthalpy = inlet_specific_enthalpy;
    }

    fn set_ambient_temperature(&mut self, _t: Temperature) -> ThermalResult<()> {
        Err(ThermalError::NotSupported {
            element: self.type_name(),
            what: "ambient temperature",
        })
    }

    fn set_heat_flux(&mut self, _q: Power) -> ThermalResult<()> {
        Err(ThermalError::NotSupported {
            element: self.type_name(),
            what: "heat flux",
        })
    }

    /// dH/dt in W.
    fn derivative(&self) -> f64 {
        self.volume().advection() - self.ambient_heat_loss()
    }
}

/// Element without heat exchange: pumps, valves, short connectors.
#[derive(Debug, Clone)]
pub struct AdiabaticElement {
    volume: MixedVolume,
}

impl AdiabaticElement {
    pub fn new(volume: f64, fluid: &Fluid) -> ThermalResult<Self> {
        Ok(Self {
            volume: MixedVolume::new(volume, fluid)?,
        })
    }
}

impl ThermalElement for AdiabaticElement {
    fn type_name(&self) -> &'static str {
        "Adiabatic"
    }

    fn volume(&self) -> &MixedVolume {
        &self.volume
    }

    fn volume_mut(&mut self) -> &mut MixedVolume {
        &mut self.volume
    }

    fn ambient_heat_loss(&self) -> f64 {
        0.0
    }
}

/// Element extracting a prescribed heat flux from the fluid.
///
/// Negative values heat the fluid (e.g. a generator).
#[derive(Debug, Clone)]
pub struct HeatExchanger {
    volume: MixedVolume,
    heat_flux: f64,
}

impl HeatExchanger {
    pub fn new(volume: f64, heat_flux: Power, fluid: &Fluid) -> ThermalResult<Self> {
        if !heat_flux.value.is_finite() {
            return Err(ThermalError::InvalidParameter {
                what: "heat flux",
                value: heat_flux.value,
            });
        }
        Ok(Self {
            volume: MixedVolume::new(volume, fluid)?,
            heat_flux: heat_flux.value,
        })
    }
}

impl ThermalElement for HeatExchanger {
    fn type_name(&self) -> &'static str {
        "HeatExchanger"
    }

    fn volume(&self) -> &MixedVolume {
        &self.volume
    }

    fn volume_mut(&mut self) -> &mut MixedVolume {
        &mut self.volume
    }

    fn ambient_heat_loss(&self) -> f64 {
        self.heat_flux
    }

    fn set_heat_flux(&mut self, q: Power) -> ThermalResult<()> {
        if !q.value.is_finite() {
            return Err(ThermalError::InvalidParameter {
                what: "heat flux",
                value: q.value,
            });
        }
        self.heat_flux = q.value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::{k, w};

    #[test]
    fn mixed_volume_round_trips_temperature() {
        let water = Fluid::water();
        let mut v = MixedVolume::new(0.5, &water).unwrap();
        v.enthalpy = v.content_at(330.0);
        assert!((v.temperature() - 330.0).abs() < 1e-9);
        assert!((v.mass() - 499.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_volume() {
        let water = Fluid::water();
        assert!(matches!(
            AdiabaticElement::new(0.0, &water),
            Err(ThermalError::InvalidParameter { what: "volume", .. })
        ));
    }

    #[test]
    fn adiabatic_derivative_is_pure_advection() {
        let water = Fluid::water();
        let mut e = AdiabaticElement::new(0.1, &water).unwrap();
        e.volume_mut().enthalpy = e.volume().content_at(300.0);
        e.set_inflow(-2.0, water.heat_capacity * 310.0);
        assert_eq!(e.volume().mass_flux, 2.0);
        let expected = 2.0 * water.heat_capacity * 10.0;
        assert!((e.derivative() - expected).abs() < 1e-6);
        assert!(e.set_ambient_temperature(k(280.0)).is_err());
    }

    #[test]
    fn heat_exchanger_subtracts_heat_flux() {
        let water = Fluid::water();
        let mut e = HeatExchanger::new(0.1, w(5000.0), &water).unwrap();
        e.volume_mut().enthalpy = e.volume().content_at(320.0);
        e.set_inflow(1.0, water.heat_capacity * 320.0);
        assert!((e.derivative() + 5000.0).abs() < 1e-9);
        e.set_heat_flux(w(-1000.0)).unwrap();
        assert!((e.derivative() - 1000.0).abs() < 1e-9);
    }
}
