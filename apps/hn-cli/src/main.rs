use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use hn_core::units::{k, pa};
use hn_solver::{HydraulicNetworkModel, HydraulicResults, LinearSolverKind};
use hn_thermal::{ForwardEuler, ThermalNetworkModel, ThermalResults};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod schema;

use error::CliResult;
use schema::NetworkFile;

#[derive(Parser)]
#[command(name = "hn-cli")]
#[command(about = "HydroNet CLI - steady-state hydraulic network solver", long_about = None)]
struct Cli {
    /// Log solver progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check topology and element parameters
    Validate {
        /// Path to the network YAML file
        path: PathBuf,
    },
    /// Solve the network and print element results
    Solve {
        /// Path to the network YAML file
        path: PathBuf,
        /// Use the dense LU backend
        #[arg(long)]
        dense: bool,
        /// Override the Newton iteration budget
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct Output<'a> {
    name: &'a str,
    hydraulics: &'a HydraulicResults,
    thermal: Option<ThermalResults>,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let outcome = match cli.command {
        Commands::Validate { path } => cmd_validate(&path),
        Commands::Solve {
            path,
            dense,
            max_iterations,
            json,
        } => cmd_solve(&path, dense, max_iterations, json),
    };
    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn setup_hydraulics(file: &NetworkFile) -> CliResult<HydraulicNetworkModel> {
    let mut model = HydraulicNetworkModel::setup(
        file.network()?,
        &file.flow_params(),
        &file.fluid,
        pa(file.reference_pressure),
        file.solver.clone(),
    )?;
    if let Some(t) = file.fluid_temperature {
        model.set_fluid_temperature(k(t))?;
    }
    Ok(model)
}

fn setup_thermal(file: &NetworkFile) -> CliResult<Option<ThermalNetworkModel>> {
    let Some(params) = file.thermal_params() else {
        return Ok(None);
    };
    Ok(Some(ThermalNetworkModel::setup(
        file.network()?,
        &params,
        &file.fluid,
    )?))
}

fn cmd_validate(path: &Path) -> CliResult<()> {
    println!("Validating network: {}", path.display());
    let file = NetworkFile::load(path)?;
    let model = setup_hydraulics(&file)?;
    let thermal = setup_thermal(&file)?;
    println!("✓ Network is valid");
    println!("  Nodes: {}", model.network().node_count());
    println!("  Elements: {}", model.network().element_count());
    println!(
        "  Jacobian: {} nonzeros, {} colors",
        model.jacobian_nnz(),
        model.color_count()
    );
    println!(
        "  Thermal layer: {}",
        if thermal.is_some() { "yes" } else { "no" }
    );
    Ok(())
}

fn cmd_solve(path: &Path, dense: bool, max_iterations: Option<usize>, json: bool) -> CliResult<()> {
    let mut file = NetworkFile::load(path)?;
    if dense {
        file.solver.linear_solver = LinearSolverKind::Dense;
    }
    if let Some(n) = max_iterations {
        file.solver.max_iterations = n;
    }

    let mut model = setup_hydraulics(&file)?;
    let report = model.solve()?;
    info!(
        iterations = report.iterations,
        residual_norm = report.residual_norm,
        "hydraulics solved"
    );

    let thermal = match setup_thermal(&file)? {
        Some(mut thermal) => {
            let t0 = file
                .initial_temperature
                .or(file.fluid_temperature)
                .unwrap_or(293.15);
            let mdot = model.mass_fluxes();
            let mut y = thermal.initial_states(k(t0));
            let steps = ForwardEuler::default().relax(&mut thermal, &mdot, &mut y)?;
            info!(steps, "thermal states relaxed");
            Some(thermal.results().clone())
        }
        None => None,
    };

    if json {
        let output = Output {
            name: &file.name,
            hydraulics: model.results(),
            thermal,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} Newton iterations: {}, residual norm: {:.3e}",
        if report.converged { "✓" } else { "✗" },
        report.iterations,
        report.residual_norm
    );
    println!(
        "{:>6} {:>12} {:>12} {:>12} {:>12}",
        "id", "mdot kg/s", "p_in Pa", "p_out Pa", "dp Pa"
    );
    for e in &model.results().elements {
        println!(
            "{:>6} {:>12.5} {:>12.1} {:>12.1} {:>12.1}",
            e.id, e.mass_flux, e.inlet_pressure, e.outlet_pressure, e.pressure_difference
        );
    }
    if let Some(thermal) = &thermal {
        println!();
        println!(
            "{:>6} {:>10} {:>10} {:>12} {:>12}",
            "id", "T_in K", "T_out K", "Q W", "Q_amb W"
        );
        for e in &thermal.elements {
            println!(
                "{:>6} {:>10.3} {:>10.3} {:>12.2} {:>12.2}",
                e.id, e.inlet_temperature, e.outlet_temperature, e.heat_loss, e.ambient_heat_loss
            );
        }
    }
    Ok(())
}
