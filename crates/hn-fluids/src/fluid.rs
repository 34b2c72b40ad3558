//! Incompressible single-phase fluid.

use hn_core::units::constants::T0_K;
use hn_core::units::{Density, KinVisc, Temperature, kg_per_m3, m2_per_s};
use serde::{Deserialize, Serialize};

use crate::error::{FluidError, FluidResult};
use crate::spline::LinearSpline;

/// Fluid used throughout one network.
///
/// Scalar properties are constant; kinematic viscosity is tabulated against
/// absolute temperature in K.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fluid {
    pub name: String,
    /// kg/m³
    pub density: f64,
    /// J/(kg·K)
    pub heat_capacity: f64,
    /// W/(m·K)
    pub conductivity: f64,
    /// m²/s over K
    pub kinematic_viscosity: LinearSpline,
}

impl Fluid {
    /// Liquid water between 0 and 100 °C.
    pub fn water() -> Self {
        const T_C: [f64; 11] = [
            0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0,
        ];
        const NU: [f64; 11] = [
            1.792e-6, 1.307e-6, 1.004e-6, 0.801e-6, 0.658e-6, 0.553e-6, 0.475e-6, 0.413e-6,
            0.365e-6, 0.326e-6, 0.294e-6,
        ];
        let x = T_C.iter().map(|t| t + T0_K).collect();
        let kinematic_viscosity = match LinearSpline::new(x, NU.to_vec()) {
            Ok(s) => s,
            Err(_) => LinearSpline::constant(1.004e-6),
        };
        Self {
            name: "Water".to_string(),
            density: 998.0,
            heat_capacity: 4180.0,
            conductivity: 0.6,
            kinematic_viscosity,
        }
    }

    /// Check that all properties are physical.
    pub fn validate(&self) -> FluidResult<()> {
        for (what, value) in [
            ("density", self.density),
            ("heat capacity", self.heat_capacity),
            ("conductivity", self.conductivity),
            ("kinematic viscosity", self.kinematic_viscosity.min_y()),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FluidError::NonPhysical { what, value });
            }
        }
        Ok(())
    }

    pub fn rho(&self) -> Density {
        kg_per_m3(self.density)
    }

    pub fn kinematic_viscosity(&self, t: Temperature) -> KinVisc {
        m2_per_s(self.kinematic_viscosity.value(t.value))
    }

    /// Specific enthalpy h = cp·T in J/kg (reference 0 K).
    pub fn specific_enthalpy(&self, t: Temperature) -> f64 {
        self.heat_capacity * t.value
    }

    /// Inverse of [`Fluid::specific_enthalpy`], in K.
    pub fn temperature(&self, h: f64) -> f64 {
        h / self.heat_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::k;

    #[test]
    fn water_is_valid() {
        let water = Fluid::water();
        water.validate().unwrap();
        assert_eq!(water.rho().value, 998.0);
        let nu20 = water.kinematic_viscosity(k(293.15)).value;
        assert!((nu20 - 1.004e-6).abs() < 1e-12);
    }

    #[test]
    fn enthalpy_temperature_inverse() {
        let water = Fluid::water();
        let h = water.specific_enthalpy(k(330.0));
        assert!((water.temperature(h) - 330.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_negative_density() {
        let mut fluid = Fluid::water();
        fluid.density = -1.0;
        assert!(matches!(
            fluid.validate(),
            Err(FluidError::NonPhysical { what: "density", .. })
        ));
    }
}
