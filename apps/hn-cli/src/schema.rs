//! YAML network description.

use std::path::Path;

use hn_components::ElementParams;
use hn_fluids::Fluid;
use hn_graph::{Network, NetworkBuilder};
use hn_solver::NewtonConfig;
use hn_thermal::ThermalParams;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

fn atmospheric() -> f64 {
    101_325.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkFile {
    #[serde(default)]
    pub name: String,
    #[serde(default = "Fluid::water")]
    pub fluid: Fluid,
    /// Fluid temperature for viscosity evaluation (K).
    #[serde(default)]
    pub fluid_temperature: Option<f64>,
    /// Initial temperature of all thermal volumes (K); defaults to the fluid
    /// temperature.
    #[serde(default)]
    pub initial_temperature: Option<f64>,
    pub reference_element: u32,
    /// Pa
    #[serde(default = "atmospheric")]
    pub reference_pressure: f64,
    #[serde(default)]
    pub solver: NewtonConfig,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    pub elements: Vec<ElementSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub key: u32,
    /// m
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: u32,
    pub inlet: u32,
    pub outlet: u32,
    pub flow: ElementParams,
    #[serde(default)]
    pub thermal: Option<ThermalParams>,
}

impl NetworkFile {
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn network(&self) -> CliResult<Network> {
        let mut b = NetworkBuilder::new();
        for e in &self.elements {
            b.add_element(e.id, e.inlet, e.outlet);
        }
        for n in &self.nodes {
            b.set_node_height(n.key, n.height);
        }
        b.set_reference_element(self.reference_element);
        Ok(b.build()?)
    }

    pub fn flow_params(&self) -> Vec<ElementParams> {
        self.elements.iter().map(|e| e.flow.clone()).collect()
    }

    /// Thermal blocks, if every element has one.
    pub fn thermal_params(&self) -> Option<Vec<ThermalParams>> {
        self.elements.iter().map(|e| e.thermal.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = include_str!("../../../demos/district_loop.yaml");

    #[test]
    fn demo_file_parses_and_builds() {
        let file: NetworkFile = serde_yaml::from_str(DEMO).unwrap();
        assert!(file.elements.len() >= 6);
        let network = file.network().unwrap();
        assert_eq!(network.element_count(), file.elements.len());
        assert!(file.thermal_params().is_some());
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let yaml = r#"
reference_element: 1
elements:
  - id: 1
    inlet: 1
    outlet: 2
    flow: { type: constant_pressure_pump, pressure_head: 20000.0 }
  - id: 2
    inlet: 2
    outlet: 1
    flow: { type: pipe, length: 10.0, diameter: 0.02, roughness: 0.00001 }
"#;
        let file: NetworkFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.reference_pressure, 101_325.0);
        assert_eq!(file.fluid.name, "Water");
        assert_eq!(file.solver, NewtonConfig::default());
        assert!(file.thermal_params().is_none());
        file.network().unwrap();
    }
}
