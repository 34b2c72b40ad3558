//! Published hydraulic results.

use hn_core::units::constants::G0_MPS2;
use hn_graph::Network;
use serde::Serialize;

use crate::newton::SolveReport;
use crate::system::HydraulicSystem;

/// Results for one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementResult {
    pub id: u32,
    /// kg/s, positive inlet → outlet
    pub mass_flux: f64,
    /// Pa
    pub inlet_pressure: f64,
    /// Pa
    pub outlet_pressure: f64,
    /// inlet minus outlet pressure (Pa)
    pub pressure_difference: f64,
    /// Inlet pressure plus hydrostatic head relative to the reference node (Pa).
    pub inlet_pressure_static: f64,
    /// Outlet pressure plus hydrostatic head relative to the reference node (Pa).
    pub outlet_pressure_static: f64,
}

/// Snapshot of a solved network.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HydraulicResults {
    pub elements: Vec<ElementResult>,
    /// Node pressures in dense node order (Pa).
    pub node_pressures: Vec<f64>,
    pub report: Option<SolveReport>,
}

impl HydraulicResults {
    pub(crate) fn from_solution(
        network: &Network,
        system: &HydraulicSystem,
        density: f64,
        y: &[f64],
        report: SolveReport,
    ) -> Self {
        let z_ref = network.nodes()[system.reference_node()].height;
        let static_head = |node: usize| density * G0_MPS2 * (z_ref - network.nodes()[node].height);

        let elements = network
            .elements()
            .iter()
            .enumerate()
            .map(|(e, element)| {
                let p_in = system.pressure(y, element.inlet);
                let p_out = system.pressure(y, element.outlet);
                ElementResult {
                    id: element.id,
                    mass_flux: system.mass_flux(y, e),
                    inlet_pressure: p_in,
                    outlet_pressure: p_out,
                    pressure_difference: p_in - p_out,
                    inlet_pressure_static: p_in + static_head(element.inlet),
                    outlet_pressure_static: p_out + static_head(element.outlet),
                }
            })
            .collect();

        let node_pressures = (0..system.node_count())
            .map(|n| system.pressure(y, n))
            .collect();

        Self {
            elements,
            node_pressures,
            report: Some(report),
        }
    }

    /// Look up an element by its caller ID.
    pub fn element(&self, id: u32) -> Option<&ElementResult> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Mass fluxes in element order (kg/s).
    pub fn mass_fluxes(&self) -> Vec<f64> {
        self.elements.iter().map(|e| e.mass_flux).collect()
    }
}
