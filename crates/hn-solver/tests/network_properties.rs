//! End-to-end properties of the hydraulic network solver.

use hn_components::{ElementInput, ElementParams, Pipe};
use hn_controls::MassFluxController;
use hn_core::units::{k, kgps, m, pa};
use hn_fluids::Fluid;
use hn_graph::{GraphError, NetworkBuilder};
use hn_solver::{HydraulicNetworkModel, LinearSolverKind, NewtonConfig, SolverError};

const P_REF: f64 = 2.0e5;

fn pipe(length: f64) -> ElementParams {
    ElementParams::Pipe {
        length,
        diameter: 0.05,
        roughness: 2e-5,
        parallel_pipes: 1,
    }
}

fn consumer(zeta: f64) -> ElementParams {
    ElementParams::PressureLossCoefficient {
        zeta,
        diameter: 0.03,
        controller: None,
    }
}

/// Pump, supply line with two consumers, return line.
///
/// ```text
///   1 --pump 10--> 2 --20--> 3 --30--> 4
///                            |         |
///                          40 |       50 |
///                            v         v
///   1 <----70----- 7 <--60-- 8 <-------'
/// ```
fn district(pump: ElementParams, config: NewtonConfig) -> HydraulicNetworkModel {
    let mut b = NetworkBuilder::new();
    let mut params = Vec::new();
    for (id, inlet, outlet, p) in [
        (10, 1, 2, pump),
        (20, 2, 3, pipe(80.0)),
        (30, 3, 4, pipe(60.0)),
        (40, 3, 7, consumer(12.0)),
        (50, 4, 8, consumer(20.0)),
        (60, 8, 7, pipe(60.0)),
        (70, 7, 1, pipe(80.0)),
    ] {
        b.add_element(id, inlet, outlet);
        params.push(p);
    }
    b.set_reference_element(10);
    HydraulicNetworkModel::setup(b.build().unwrap(), &params, &Fluid::water(), pa(P_REF), config)
        .unwrap()
}

fn pressure_pump() -> ElementParams {
    ElementParams::ConstantPressurePump {
        pressure_head: 5.0e4,
    }
}

#[test]
fn multi_loop_network_converges() {
    for kind in [LinearSolverKind::Sparse, LinearSolverKind::Dense] {
        let config = NewtonConfig {
            linear_solver: kind,
            ..Default::default()
        };
        let mut model = district(pressure_pump(), config);
        model.set_time(0.0);
        let report = model.solve().unwrap();
        assert!(report.converged, "{kind:?}: {report:?}");
        assert!(report.residual_norm < 1e-3);
        assert!(report.iterations <= 30);
    }
}

#[test]
fn backends_agree() {
    let mut sparse = district(pressure_pump(), NewtonConfig::default());
    let mut dense = district(
        pressure_pump(),
        NewtonConfig {
            linear_solver: LinearSolverKind::Dense,
            ..Default::default()
        },
    );
    sparse.solve().unwrap();
    dense.solve().unwrap();
    for (a, b) in sparse.mass_fluxes().iter().zip(dense.mass_fluxes()) {
        assert!((a - b).abs() < 1e-6, "{a} vs {b}");
    }
}

#[test]
fn mass_is_conserved_at_every_node() {
    let mut model = district(pressure_pump(), NewtonConfig::default());
    model.solve().unwrap();
    for balance in model.node_balances() {
        assert!(balance.abs() < 1e-5, "balance {balance}");
    }
    // reference node sits exactly at the reference pressure
    let reference = model.network().reference_node();
    assert!((model.node_pressures()[reference] - P_REF).abs() < 1e-3);

    let flows = model.mass_fluxes();
    assert!((flows[0] - (flows[3] + flows[4])).abs() < 1e-5);
    assert!(flows.iter().all(|&f| f > 0.0));
}

#[test]
fn single_pipe_matches_friction_correlation() {
    let mdot = 0.8;
    let mut b = NetworkBuilder::new();
    b.add_element(1, 1, 2);
    b.add_element(2, 2, 1);
    b.set_reference_element(1);
    let params = [
        ElementParams::ConstantMassFluxPump { mass_flux: mdot },
        ElementParams::Pipe {
            length: 150.0,
            diameter: 0.04,
            roughness: 3e-5,
            parallel_pipes: 1,
        },
    ];
    let water = Fluid::water();
    let mut model = HydraulicNetworkModel::setup(
        b.build().unwrap(),
        &params,
        &water,
        pa(P_REF),
        NewtonConfig::default(),
    )
    .unwrap();
    let report = model.solve().unwrap();
    assert!(report.converged);

    let reference = Pipe::new(m(150.0), m(0.04), m(3e-5), 1, &water).unwrap();
    let expected = reference.pressure_loss(mdot);
    let result = model.results().element(2).unwrap();
    assert!((result.mass_flux - mdot).abs() < 1e-6);
    assert!(
        (result.pressure_difference - expected).abs() < 1e-2,
        "{} vs {}",
        result.pressure_difference,
        expected
    );
}

#[test]
fn open_end_fails_setup_and_closing_it_succeeds() {
    let mut b = NetworkBuilder::new();
    b.add_element(1, 1, 2);
    b.add_element(2, 2, 1);
    b.add_element(3, 2, 3);
    b.set_reference_element(1);
    let err: SolverError = b.build().unwrap_err().into();
    assert_eq!(
        err,
        SolverError::Graph(GraphError::OpenEnd {
            element: 3,
            node: 3
        })
    );
    assert!(!err.is_recoverable());

    let mut b = NetworkBuilder::new();
    b.add_element(1, 1, 2);
    b.add_element(2, 2, 1);
    b.add_element(3, 2, 3);
    b.add_element(4, 3, 1);
    b.set_reference_element(1);
    assert!(b.build().is_ok());
}

#[test]
fn repeated_solve_is_a_fixed_point() {
    let mut model = district(pressure_pump(), NewtonConfig::default());
    model.set_time(10.0);
    model.solve().unwrap();
    let first = model.unknowns().to_vec();

    let report = model.solve().unwrap();
    assert!(report.converged);
    let scale = model.config().mass_flux_scale;
    let ne = model.network().element_count();
    for (i, (a, b)) in first.iter().zip(model.unknowns()).enumerate() {
        let tol = if i < ne { 1e-6 * scale } else { 1e-3 };
        assert!((a - b).abs() < tol, "unknown {i}: {a} vs {b}");
    }
}

#[test]
fn new_step_restarts_from_last_completed_solution() {
    let mut model = district(pressure_pump(), NewtonConfig::default());
    model.set_time(0.0);
    model.solve().unwrap();
    model.step_completed(0.0);
    let accepted = model.unknowns().to_vec();

    // a trial at a new time with a weaker pump, then a retry at another time
    model.set_time(60.0);
    model
        .set_input(10, ElementInput::PressureHead(pa(2.0e4)))
        .unwrap();
    model.solve().unwrap();
    assert_ne!(model.unknowns(), accepted.as_slice());

    model
        .set_input(10, ElementInput::PressureHead(pa(5.0e4)))
        .unwrap();
    model.set_time(30.0);
    model.solve().unwrap();
    for (a, b) in accepted.iter().zip(model.unknowns()) {
        assert!((a - b).abs() < 1e-3 * a.abs().max(1.0));
    }
}

fn controlled_district() -> HydraulicNetworkModel {
    let mut b = NetworkBuilder::new();
    b.add_element(1, 1, 2);
    b.add_element(2, 2, 3);
    b.add_element(3, 3, 1);
    b.set_reference_element(1);
    let params = [
        pressure_pump(),
        pipe(100.0),
        ElementParams::PressureLossCoefficient {
            zeta: 5.0,
            diameter: 0.03,
            controller: Some(MassFluxController::pi(0.6, 200.0, 300.0, 5000.0).unwrap()),
        },
    ];
    HydraulicNetworkModel::setup(
        b.build().unwrap(),
        &params,
        &Fluid::water(),
        pa(P_REF),
        NewtonConfig::default(),
    )
    .unwrap()
}

#[test]
fn restart_reproduces_uninterrupted_run() {
    let mut original = controlled_district();
    for t in [0.0, 60.0, 120.0] {
        original.set_time(t);
        assert_eq!(original.update(), 0);
        original.step_completed(t);
    }

    let mut checkpoint = vec![0u8; original.serialized_size()];
    original.serialize(&mut checkpoint).unwrap();

    original.set_time(180.0);
    original.solve().unwrap();

    let mut restarted = controlled_district();
    restarted.deserialize(&checkpoint).unwrap();
    restarted.set_time(180.0);
    restarted.solve().unwrap();

    assert_eq!(original.unknowns(), restarted.unknowns());
    assert_eq!(original.results(), restarted.results());
}

#[test]
fn deserialize_rejects_wrong_size() {
    let mut model = controlled_district();
    let err = model.deserialize(&[0u8; 3]).unwrap_err();
    assert!(matches!(err, SolverError::StateSize { .. }));
}

#[test]
fn controller_throttles_flow() {
    let mut controlled = controlled_district();
    controlled.set_time(0.0);
    controlled.solve().unwrap();
    let q0 = controlled.mass_fluxes()[2];
    controlled.step_completed(0.0);

    // the integral grows while the flow sits above the setpoint
    controlled.set_time(600.0);
    controlled.solve().unwrap();
    controlled.step_completed(600.0);
    controlled.set_time(1200.0);
    controlled.solve().unwrap();
    let q2 = controlled.mass_fluxes()[2];
    assert!(q0 > 0.6);
    assert!(q2 < q0);
}

#[test]
fn two_fixed_flux_pumps_give_recoverable_failure() {
    let params = [
        ElementParams::ConstantMassFluxPump { mass_flux: 0.5 },
        ElementParams::ConstantMassFluxPump { mass_flux: 0.5 },
    ];
    for kind in [LinearSolverKind::Sparse, LinearSolverKind::Dense] {
        let mut model = HydraulicNetworkModel::setup(
            two_node_loop(),
            &params,
            &Fluid::water(),
            pa(P_REF),
            NewtonConfig {
                linear_solver: kind,
                ..Default::default()
            },
        )
        .unwrap();
        let before = model.unknowns().to_vec();
        assert_eq!(model.update(), 1, "{kind:?}");
        assert_eq!(model.unknowns(), before.as_slice());
        assert!(model.solve().unwrap_err().is_recoverable());
    }
}

fn two_node_loop() -> hn_graph::Network {
    let mut b = NetworkBuilder::new();
    b.add_element(1, 1, 2);
    b.add_element(2, 2, 1);
    b.set_reference_element(1);
    b.build().unwrap()
}

#[test]
fn iteration_budget_exhaustion_is_not_an_error() {
    let config = NewtonConfig {
        max_iterations: 1,
        ..Default::default()
    };
    let mut model = district(pressure_pump(), config);
    let report = model.solve().unwrap();
    assert!(!report.converged);
    assert_eq!(report.iterations, 1);
    assert_eq!(model.update(), 0);
}

#[test]
fn clipped_steps_still_converge() {
    let config = NewtonConfig {
        clip_mass_flux_step: true,
        ..Default::default()
    };
    let mut model = district(
        ElementParams::ConstantMassFluxPump { mass_flux: 1.2 },
        config,
    );
    let report = model.solve().unwrap();
    assert!(report.converged);
    assert!((model.mass_fluxes()[0] - 1.2).abs() < 1e-6);
}

#[test]
fn mass_flux_override_moves_solution() {
    let mut model = district(
        ElementParams::ConstantMassFluxPump { mass_flux: 1.0 },
        NewtonConfig::default(),
    );
    model.solve().unwrap();
    model
        .set_input(10, ElementInput::MassFlux(kgps(0.5)))
        .unwrap();
    model.solve().unwrap();
    assert!((model.results().element(10).unwrap().mass_flux - 0.5).abs() < 1e-6);
}

#[test]
fn warm_fluid_reduces_pump_head_needed() {
    let mut cold = district(
        ElementParams::ConstantMassFluxPump { mass_flux: 0.3 },
        NewtonConfig::default(),
    );
    cold.set_fluid_temperature(k(283.15)).unwrap();
    cold.solve().unwrap();

    let mut warm = district(
        ElementParams::ConstantMassFluxPump { mass_flux: 0.3 },
        NewtonConfig::default(),
    );
    warm.set_fluid_temperature(k(343.15)).unwrap();
    warm.solve().unwrap();

    let head = |m: &HydraulicNetworkModel| -m.results().element(10).unwrap().pressure_difference;
    assert!(head(&warm) < head(&cold));
}

#[test]
fn static_pressure_includes_geodetic_head() {
    let mut b = NetworkBuilder::new();
    b.add_element(1, 1, 2);
    b.add_element(2, 2, 1);
    b.set_reference_element(1);
    b.set_node_height(2, 10.0);
    let params = [
        ElementParams::ConstantMassFluxPump { mass_flux: 0.2 },
        pipe(20.0),
    ];
    let water = Fluid::water();
    let mut model = HydraulicNetworkModel::setup(
        b.build().unwrap(),
        &params,
        &water,
        pa(P_REF),
        NewtonConfig::default(),
    )
    .unwrap();
    model.solve().unwrap();
    let pump = model.results().element(1).unwrap();
    assert_eq!(pump.inlet_pressure_static, pump.inlet_pressure);
    let expected = pump.outlet_pressure - water.density * 9.806_65 * 10.0;
    assert!((pump.outlet_pressure_static - expected).abs() < 1e-6);
}

#[test]
fn diagnostics_reflect_pattern() {
    let model = district(pressure_pump(), NewtonConfig::default());
    // 3 entries per element row, one per element end in node rows, plus the reference diagonal
    let elements = model.network().element_count();
    assert_eq!(model.jacobian_nnz(), 3 * elements + 2 * elements + 1);
    assert!(model.color_count() < elements + model.network().node_count());
}
