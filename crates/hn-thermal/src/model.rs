//! Thermal network model: upwinded enthalpy transport over a flow network.

use hn_core::units::{Power, Temperature};
use hn_fluids::Fluid;
use hn_graph::Network;
use serde::Serialize;
use tracing::{debug, info};

use crate::element::ThermalElement;
use crate::error::{ThermalError, ThermalResult};
use crate::params::ThermalParams;

/// Thermal results for one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermalElementResult {
    pub id: u32,
    /// kg/s, positive inlet → outlet
    pub mass_flux: f64,
    /// Temperature at the upstream node (K).
    pub inlet_temperature: f64,
    /// Mixed element temperature, leaving towards the downstream node (K).
    pub outlet_temperature: f64,
    /// `|mdot| * (h_in - h_out)` in W.
    pub heat_loss: f64,
    /// Heat released to the surroundings in W.
    pub ambient_heat_loss: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThermalResults {
    pub elements: Vec<ThermalElementResult>,
    /// Mixed node temperatures in dense node order (K).
    pub node_temperatures: Vec<f64>,
}

impl ThermalResults {
    /// Look up an element by its caller ID.
    pub fn element(&self, id: u32) -> Option<&ThermalElementResult> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn total_ambient_heat_loss(&self) -> f64 {
        self.elements.iter().map(|e| e.ambient_heat_loss).sum()
    }
}

/// Enthalpy transport over the topology of a hydraulic network.
///
/// The caller owns the state vector (one enthalpy content per element, in
/// element order). Per evaluation:
///
/// ```text
/// set_internal_states(y) -> advect(mdot) -> internal_derivatives(ydot)
/// ```
#[derive(Debug)]
pub struct ThermalNetworkModel {
    network: Network,
    elements: Vec<Box<dyn ThermalElement>>,
    heat_capacity: f64,
    mass_fluxes: Vec<f64>,
    node_enthalpies: Vec<f64>,
    results: ThermalResults,
}

impl ThermalNetworkModel {
    /// `params` runs parallel to `network.elements()`.
    pub fn setup(network: Network, params: &[ThermalParams], fluid: &Fluid) -> ThermalResult<Self> {
        fluid.validate()?;
        if params.len() != network.element_count() {
            return Err(ThermalError::Size {
                what: "thermal parameter blocks",
                expected: network.element_count(),
                actual: params.len(),
            });
        }
        let elements = network
            .elements()
            .iter()
            .zip(params)
            .map(|(element, p)| p.instantiate(fluid).map_err(|e| e.for_element(element.id)))
            .collect::<ThermalResult<Vec<_>>>()?;

        info!(
            nodes = network.node_count(),
            elements = network.element_count(),
            "thermal network set up"
        );

        Ok(Self {
            mass_fluxes: vec![0.0; network.element_count()],
            node_enthalpies: vec![0.0; network.node_count()],
            heat_capacity: fluid.heat_capacity,
            network,
            elements,
            results: ThermalResults::default(),
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn elements(&self) -> &[Box<dyn ThermalElement>] {
        &self.elements
    }

    /// Number of internal states, one per element.
    pub fn state_size(&self) -> usize {
        self.elements.len()
    }

    /// States with every element filled with fluid at `t0`.
    pub fn initial_states(&self, t0: Temperature) -> Vec<f64> {
        self.elements
            .iter()
            .map(|e| e.volume().content_at(t0.value))
            .collect()
    }

    pub fn set_internal_states(&mut self, y: &[f64]) -> ThermalResult<()> {
        self.check_size("internal states", y.len())?;
        for (e, &h) in self.elements.iter_mut().zip(y) {
            e.volume_mut().enthalpy = h;
        }
        Ok(())
    }

    /// dH/dt per element for the last [`advect`](Self::advect) pass.
    pub fn internal_derivatives(&self, ydot: &mut [f64]) -> ThermalResult<()> {
        self.check_size("state derivatives", ydot.len())?;
        for (e, d) in self.elements.iter().zip(ydot.iter_mut()) {
            *d = e.derivative();
        }
        Ok(())
    }

    pub fn set_ambient_temperature(&mut self, id: u32, t: Temperature) -> ThermalResult<()> {
        let e = self.element_index(id)?;
        self.elements[e]
            .set_ambient_temperature(t)
            .map_err(|err| err.for_element(id))
    }

    pub fn set_heat_flux(&mut self, id: u32, q: Power) -> ThermalResult<()> {
        let e = self.element_index(id)?;
        self.elements[e].set_heat_flux(q).map_err(|err| err.for_element(id))
    }

    /// Forward pass for the given element mass fluxes (kg/s, element order).
    ///
    /// Mixes node enthalpies from inflowing elements, then feeds every
    /// element from its upstream node.
    pub fn advect(&mut self, mass_fluxes: &[f64]) -> ThermalResult<&ThermalResults> {
        self.check_size("mass fluxes", mass_fluxes.len())?;
        self.mass_fluxes.copy_from_slice(mass_fluxes);

        for (n, node) in self.network.nodes().iter().enumerate() {
            let mut inflow = 0.0;
            let mut enthalpy_flow = 0.0;
            let arriving = node
                .outlet_elements
                .iter()
                .map(|&e| (e, mass_fluxes[e]))
                .chain(node.inlet_elements.iter().map(|&e| (e, -mass_fluxes[e])));
            for (e, mdot) in arriving {
                if mdot > 0.0 {
                    inflow += mdot;
                    enthalpy_flow += mdot * self.elements[e].volume().specific_enthalpy();
                }
            }
            if inflow <= 0.0 {
                return Err(ThermalError::ZeroInflow { node: node.key });
            }
            self.node_enthalpies[n] = enthalpy_flow / inflow;
        }

        for (e, element) in self.network.elements().iter().enumerate() {
            let mdot = mass_fluxes[e];
            let upstream = if mdot >= 0.0 { element.inlet } else { element.outlet };
            self.elements[e].set_inflow(mdot, self.node_enthalpies[upstream]);
        }

        self.results = self.collect_results();
        debug!(
            ambient_heat_loss = self.results.total_ambient_heat_loss(),
            "thermal pass finished"
        );
        Ok(&self.results)
    }

    pub fn results(&self) -> &ThermalResults {
        &self.results
    }

    /// Mixed node specific enthalpies (J/kg) from the last pass.
    pub fn node_enthalpies(&self) -> &[f64] {
        &self.node_enthalpies
    }

    fn collect_results(&self) -> ThermalResults {
        let cp = self.heat_capacity;
        let elements = self
            .network
            .elements()
            .iter()
            .zip(&self.elements)
            .zip(&self.mass_fluxes)
            .map(|((element, te), &mdot)| {
                let v = te.volume();
                let h_out = v.specific_enthalpy();
                ThermalElementResult {
                    id: element.id,
                    mass_flux: mdot,
                    inlet_temperature: v.inlet_specific_enthalpy / cp,
                    outlet_temperature: h_out / cp,
                    heat_loss: v.mass_flux * (v.inlet_specific_enthalpy - h_out),
                    ambient_heat_loss: te.ambient_heat_loss(),
                }
            })
            .collect();
        ThermalResults {
            elements,
            node_temperatures: self.node_enthalpies.iter().map(|h| h / cp).collect(),
        }
    }

    fn element_index(&self, id: u32) -> ThermalResult<usize> {
        self.network
            .index_map()
            .element_idx(id)
            .map_err(|_| ThermalError::UnknownElement { id })
    }

    fn check_size(&self, what: &'static str, actual: usize) -> ThermalResult<()> {
        if actual == self.elements.len() {
            Ok(())
        } else {
            Err(ThermalError::Size {
                what,
                expected: self.elements.len(),
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_core::units::k;
    use hn_graph::NetworkBuilder;

    fn adiabatic(volume: f64) -> ThermalParams {
        ThermalParams::Adiabatic { volume }
    }

    fn ring() -> Network {
        let mut b = NetworkBuilder::new();
        b.add_element(1, 1, 2);
        b.add_element(2, 2, 3);
        b.add_element(3, 3, 1);
        b.set_reference_element(1);
        b.build().unwrap()
    }

    #[test]
    fn parameter_count_must_match() {
        let err = ThermalNetworkModel::setup(ring(), &[adiabatic(0.1)], &Fluid::water()).unwrap_err();
        assert!(matches!(
            err,
            ThermalError::Size {
                expected: 3,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn uniform_temperature_is_steady() {
        let params = vec![adiabatic(0.1); 3];
        let mut model = ThermalNetworkModel::setup(ring(), &params, &Fluid::water()).unwrap();
        let y = model.initial_states(k(320.0));
        model.set_internal_states(&y).unwrap();
        let results = model.advect(&[0.4, 0.4, 0.4]).unwrap();
        for t in &results.node_temperatures {
            assert!((t - 320.0).abs() < 1e-9);
        }
        let mut ydot = vec![1.0; 3];
        model.internal_derivatives(&mut ydot).unwrap();
        for d in ydot {
            assert!(d.abs() < 1e-6);
        }
    }

    #[test]
    fn state_size_mismatch_is_rejected() {
        let params = vec![adiabatic(0.1); 3];
        let mut model = ThermalNetworkModel::setup(ring(), &params, &Fluid::water()).unwrap();
        assert!(model.set_internal_states(&[0.0; 2]).is_err());
        assert!(model.advect(&[0.1; 4]).is_err());
        let mut ydot = [0.0; 1];
        assert!(model.internal_derivatives(&mut ydot).is_err());
    }

    #[test]
    fn inputs_reach_elements_by_id() {
        let params = vec![
            adiabatic(0.1),
            ThermalParams::HeatExchanger {
                volume: 0.1,
                heat_flux: 100.0,
            },
            adiabatic(0.1),
        ];
        let mut model = ThermalNetworkModel::setup(ring(), &params, &Fluid::water()).unwrap();
        model.set_heat_flux(2, hn_core::units::w(250.0)).unwrap();
        assert!(model.set_heat_flux(1, hn_core::units::w(1.0)).is_err());
        assert!(matches!(
            model.set_ambient_temperature(9, k(280.0)),
            Err(ThermalError::UnknownElement { id: 9 })
        ));
    }
}
