use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read network file: {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid network file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Topology error: {0}")]
    Graph(#[from] hn_graph::GraphError),

    #[error("Solver error: {0}")]
    Solver(#[from] hn_solver::SolverError),

    #[error("Thermal error: {0}")]
    Thermal(#[from] hn_thermal::ThermalError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;
