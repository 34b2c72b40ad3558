//! Cross-element checks through the `FlowElement` trait object.

use hn_components::{ElementInput, ElementParams, FlowElement};
use hn_core::units::k;
use hn_fluids::Fluid;

fn elements() -> Vec<Box<dyn FlowElement>> {
    let water = Fluid::water();
    [
        ElementParams::Pipe {
            length: 120.0,
            diameter: 0.025,
            roughness: 4e-5,
            parallel_pipes: 2,
        },
        ElementParams::ConstantPressurePump {
            pressure_head: 3.0e4,
        },
        ElementParams::ConstantMassFluxPump { mass_flux: 0.35 },
        ElementParams::PressureLossCoefficient {
            zeta: 8.0,
            diameter: 0.025,
            controller: None,
        },
    ]
    .iter()
    .map(|p| p.instantiate(&water).unwrap())
    .collect()
}

#[test]
fn partials_agree_with_finite_differences() {
    let h = 1e-3;
    for e in elements() {
        for &(mdot, p_in, p_out) in &[(0.2, 2.1e5, 2.0e5), (-0.1, 1.0e5, 1.2e5)] {
            let d = e.partials(mdot, p_in, p_out);
            let f0 = e.system_function(mdot, p_in, p_out);
            let dpin = (e.system_function(mdot, p_in + h, p_out) - f0) / h;
            let dpout = (e.system_function(mdot, p_in, p_out + h) - f0) / h;
            assert!((d.d_p_in - dpin).abs() < 1e-6, "{}", e.type_name());
            assert!((d.d_p_out - dpout).abs() < 1e-6, "{}", e.type_name());
        }
    }
}

#[test]
fn every_element_accepts_fluid_temperature() {
    for mut e in elements() {
        e.set_input(ElementInput::FluidTemperature(k(330.0))).unwrap();
    }
}

#[test]
fn stateless_elements_have_no_state() {
    for mut e in elements() {
        assert_eq!(e.state_size(), 0);
        e.read_state(&[]).unwrap();
        assert!(e.read_state(&[1.0]).is_err());
    }
}

#[test]
fn params_deserialize_from_tagged_json() {
    let json = r#"[
        {"type": "pipe", "length": 10.0, "diameter": 0.02, "roughness": 1e-5},
        {"type": "constant_mass_flux_pump", "mass_flux": 0.1},
        {"type": "pressure_loss_coefficient", "zeta": 3.0, "diameter": 0.02,
         "controller": {"kind": "pi", "setpoint": 0.1, "kp": 50.0, "ti": 120.0, "max_zeta": 500.0}}
    ]"#;
    let params: Vec<ElementParams> = serde_json::from_str(json).unwrap();
    assert_eq!(
        params[0],
        ElementParams::Pipe {
            length: 10.0,
            diameter: 0.02,
            roughness: 1e-5,
            parallel_pipes: 1
        }
    );
    let e = params[2].instantiate(&Fluid::water()).unwrap();
    assert_eq!(e.state_size(), 1);
}
