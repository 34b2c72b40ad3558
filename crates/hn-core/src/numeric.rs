/// Floating point type used throughout the solver.
pub type Real = f64;

/// Root-mean-square norm with unit weights: `sqrt(sum(v_i^2) / n)`.
///
/// Returns 0 for an empty slice.
pub fn wrms_norm(v: &[Real]) -> Real {
    if v.is_empty() {
        return 0.0;
    }
    let sum: Real = v.iter().map(|x| x * x).sum();
    (sum / v.len() as Real).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn wrms_of_constant_vector() {
        assert_eq!(wrms_norm(&[]), 0.0);
        assert!((wrms_norm(&[3.0, -3.0, 3.0, -3.0]) - 3.0).abs() < 1e-14);
    }

    #[test]
    fn wrms_weights_every_entry_equally() {
        let n = wrms_norm(&[0.0, 0.0, 0.0, 2.0]);
        assert!((n - 1.0).abs() < 1e-14);
    }

    proptest! {
        #[test]
        fn wrms_bounded_by_max_abs(v in proptest::collection::vec(-1e6f64..1e6, 1..50)) {
            let max = v.iter().fold(0.0f64, |m, x| m.max(x.abs()));
            prop_assert!(wrms_norm(&v) <= max * (1.0 + 1e-12));
        }
    }
}
