//! Residual assembly for the hydraulic equation system.

use hn_components::FlowElement;
use hn_graph::Network;

use crate::error::{SolverError, SolverResult};

/// Index layout and residual function `G(y)` of one network.
#[derive(Debug, Clone)]
pub struct HydraulicSystem {
    /// (inlet, outlet) node index per element.
    connections: Vec<(usize, usize)>,
    /// Per node: adjacent elements with +1 (outlet side, inflow) or -1 (inlet side).
    node_elements: Vec<Vec<(usize, f64)>>,
    reference_node: usize,
    reference_pressure: f64,
    mass_flux_scale: f64,
}

impl HydraulicSystem {
    pub fn new(network: &Network, reference_pressure: f64, mass_flux_scale: f64) -> Self {
        let connections = network
            .elements()
            .iter()
            .map(|e| (e.inlet, e.outlet))
            .collect();
        let node_elements = network
            .nodes()
            .iter()
            .map(|n| {
                n.inlet_elements
                    .iter()
                    .map(|&e| (e, -1.0))
                    .chain(n.outlet_elements.iter().map(|&e| (e, 1.0)))
                    .collect()
            })
            .collect();
        Self {
            connections,
            node_elements,
            reference_node: network.reference_node(),
            reference_pressure,
            mass_flux_scale,
        }
    }

    pub fn element_count(&self) -> usize {
        self.connections.len()
    }

    pub fn node_count(&self) -> usize {
        self.node_elements.len()
    }

    /// Length of `y` and `G`.
    pub fn dim(&self) -> usize {
        self.element_count() + self.node_count()
    }

    pub fn reference_node(&self) -> usize {
        self.reference_node
    }

    pub fn reference_pressure(&self) -> f64 {
        self.reference_pressure
    }

    pub fn mass_flux_scale(&self) -> f64 {
        self.mass_flux_scale
    }

    pub fn connections(&self) -> &[(usize, usize)] {
        &self.connections
    }

    /// Adjacent elements of each node with their inflow sign.
    pub fn node_elements(&self) -> &[Vec<(usize, f64)>] {
        &self.node_elements
    }

    /// Mass flux (kg/s) of element `e` in `y`.
    pub fn mass_flux(&self, y: &[f64], e: usize) -> f64 {
        y[e] / self.mass_flux_scale
    }

    /// Pressure (Pa) of node `n` in `y`.
    pub fn pressure(&self, y: &[f64], n: usize) -> f64 {
        y[self.element_count() + n]
    }

    /// Initial unknowns: uniform mass flux, all pressures at the reference value.
    pub fn initial_guess(&self, mass_flux: f64) -> Vec<f64> {
        let mut y = vec![self.reference_pressure; self.dim()];
        for v in &mut y[..self.element_count()] {
            *v = mass_flux * self.mass_flux_scale;
        }
        y
    }

    /// Evaluate `G(y)` into `g`.
    pub fn residuals(
        &self,
        elements: &[Box<dyn FlowElement>],
        y: &[f64],
        g: &mut [f64],
    ) -> SolverResult<()> {
        let ne = self.element_count();

        for (i, adjacent) in self.node_elements.iter().enumerate() {
            let mass_sum: f64 = adjacent
                .iter()
                .map(|&(e, sign)| sign * self.mass_flux(y, e))
                .sum();
            g[ne + i] = mass_sum * self.mass_flux_scale;
        }
        g[ne + self.reference_node] += self.pressure(y, self.reference_node) - self.reference_pressure;

        for (e, element) in elements.iter().enumerate() {
            let (inlet, outlet) = self.connections[e];
            g[e] = element.system_function(
                self.mass_flux(y, e),
                self.pressure(y, inlet),
                self.pressure(y, outlet),
            );
        }

        match g.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(SolverError::NonFiniteResidual { index }),
            None => Ok(()),
        }
    }

    /// Signed mass balance (kg/s) of every node; zero for a converged solution.
    pub fn node_balances(&self, y: &[f64]) -> Vec<f64> {
        self.node_elements
            .iter()
            .map(|adjacent| {
                adjacent
                    .iter()
                    .map(|&(e, sign)| sign * self.mass_flux(y, e))
                    .sum()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hn_components::ElementParams;
    use hn_fluids::Fluid;
    use hn_graph::NetworkBuilder;

    fn two_element_loop() -> (HydraulicSystem, Vec<Box<dyn FlowElement>>) {
        let mut b = NetworkBuilder::new();
        b.add_element(1, 1, 2);
        b.add_element(2, 2, 1);
        b.set_reference_element(1);
        let net = b.build().unwrap();
        let water = Fluid::water();
        let elements = vec![
            ElementParams::ConstantMassFluxPump { mass_flux: 0.5 }
                .instantiate(&water)
                .unwrap(),
            ElementParams::PressureLossCoefficient {
                zeta: 1.0,
                diameter: 0.05,
                controller: None,
            }
            .instantiate(&water)
            .unwrap(),
        ];
        (HydraulicSystem::new(&net, 1.0e5, 1000.0), elements)
    }

    #[test]
    fn layout() {
        let (sys, _) = two_element_loop();
        assert_eq!(sys.dim(), 4);
        assert_eq!(sys.reference_node(), 0);
        let y = sys.initial_guess(0.1);
        assert_eq!(y, vec![100.0, 100.0, 1.0e5, 1.0e5]);
    }

    #[test]
    fn residual_rows() {
        let (sys, elements) = two_element_loop();
        // mdot_1 = 0.5, mdot_2 = 0.3, p_0 = 1.1e5, p_1 = 1.0e5
        let y = [500.0, 300.0, 1.1e5, 1.0e5];
        let mut g = [0.0; 4];
        sys.residuals(&elements, &y, &mut g).unwrap();

        assert_eq!(g[0], 0.0);
        // node 0: element 1 leaves (inlet), element 2 arrives (outlet)
        assert!((g[2] - ((-0.5 + 0.3) * 1000.0 + 1.0e4)).abs() < 1e-9);
        assert!((g[3] - (0.5 - 0.3) * 1000.0).abs() < 1e-9);
        let balances = sys.node_balances(&y);
        assert!((balances[0] + 0.2).abs() < 1e-12);
        assert!((balances[1] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn non_finite_residual_reported() {
        let (sys, elements) = two_element_loop();
        let y = [f64::NAN, 300.0, 1.0e5, 1.0e5];
        let mut g = [0.0; 4];
        assert!(matches!(
            sys.residuals(&elements, &y, &mut g),
            Err(SolverError::NonFiniteResidual { .. })
        ));
    }
}
