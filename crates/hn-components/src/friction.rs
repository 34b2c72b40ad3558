//! Darcy friction factor with laminar/turbulent blending.
//!
//! ```text
//! Re < 1700          f = 64 / Re
//! Re > 4000          f = 0.25 / log10(e/(3.7 D) + 5.74 / Re^0.9)^2   (Swamee–Jain)
//! 1700 <= Re <= 4000 linear blend between f(1700) and f(4000)
//! ```

/// Upper Reynolds bound of the laminar regime.
pub const RE_LAMINAR: f64 = 1700.0;

/// Lower Reynolds bound of the fully turbulent regime.
pub const RE_TURBULENT: f64 = 4000.0;

pub fn laminar(reynolds: f64) -> f64 {
    64.0 / reynolds
}

/// Swamee–Jain explicit approximation of Colebrook–White.
pub fn swamee_jain(reynolds: f64, rel_roughness: f64) -> f64 {
    let a = rel_roughness / 3.7;
    let b = 5.74 / reynolds.powf(0.9);
    0.25 / (a + b).log10().powi(2)
}

/// Darcy friction factor for `reynolds > 0`.
///
/// `rel_roughness` is roughness over diameter.
pub fn friction_factor(reynolds: f64, rel_roughness: f64) -> f64 {
    if reynolds < RE_LAMINAR {
        laminar(reynolds)
    } else if reynolds > RE_TURBULENT {
        swamee_jain(reynolds, rel_roughness)
    } else {
        let f_lam = laminar(RE_LAMINAR);
        let f_turb = swamee_jain(RE_TURBULENT, rel_roughness);
        let w = (reynolds - RE_LAMINAR) / (RE_TURBULENT - RE_LAMINAR);
        f_lam + w * (f_turb - f_lam)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn laminar_value() {
        assert!((friction_factor(1000.0, 1e-4) - 0.064).abs() < 1e-12);
    }

    #[test]
    fn smooth_turbulent_value() {
        // Moody chart: smooth pipe at Re = 1e5 gives f ≈ 0.018
        let f = friction_factor(1.0e5, 0.0);
        assert!((f - 0.018).abs() < 0.001, "f = {f}");
    }

    #[test]
    fn rough_pipe_has_higher_friction() {
        assert!(friction_factor(1.0e5, 1e-2) > friction_factor(1.0e5, 1e-5));
    }

    proptest! {
        #[test]
        fn continuous_at_regime_boundaries(rel in 0.0..0.05f64) {
            for re in [RE_LAMINAR, RE_TURBULENT] {
                let below = friction_factor(re * (1.0 - 1e-9), rel);
                let above = friction_factor(re * (1.0 + 1e-9), rel);
                prop_assert!((below - above).abs() < 1e-6 * below.max(above));
            }
        }

        #[test]
        fn positive_and_finite(re in 1.0..1.0e7f64, rel in 0.0..0.05f64) {
            let f = friction_factor(re, rel);
            prop_assert!(f.is_finite() && f > 0.0);
        }
    }
}
