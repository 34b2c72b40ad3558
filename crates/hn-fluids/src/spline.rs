//! Piecewise-linear lookup table.

use serde::{Deserialize, Serialize};

use crate::error::{FluidError, FluidResult};

/// Linear interpolation over strictly ascending x values.
///
/// Values outside the table range are clamped to the first/last y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SplineRepr", into = "SplineRepr")]
pub struct LinearSpline {
    x: Vec<f64>,
    y: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct SplineRepr {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl TryFrom<SplineRepr> for LinearSpline {
    type Error = FluidError;

    fn try_from(repr: SplineRepr) -> FluidResult<Self> {
        LinearSpline::new(repr.x, repr.y)
    }
}

impl From<LinearSpline> for SplineRepr {
    fn from(spline: LinearSpline) -> Self {
        SplineRepr {
            x: spline.x,
            y: spline.y,
        }
    }
}

impl LinearSpline {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> FluidResult<Self> {
        if x.is_empty() {
            return Err(FluidError::InvalidSpline { what: "empty table" });
        }
        if x.len() != y.len() {
            return Err(FluidError::InvalidSpline {
                what: "x and y lengths differ",
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(FluidError::InvalidSpline {
                what: "non-finite value",
            });
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FluidError::InvalidSpline {
                what: "x values not strictly ascending",
            });
        }
        Ok(Self { x, y })
    }

    /// Constant-valued table.
    pub fn constant(value: f64) -> Self {
        Self {
            x: vec![0.0],
            y: vec![value],
        }
    }

    pub fn value(&self, x: f64) -> f64 {
        let n = self.x.len();
        if x <= self.x[0] {
            return self.y[0];
        }
        if x >= self.x[n - 1] {
            return self.y[n - 1];
        }
        // first index with self.x[i] > x; guaranteed 1..n-1 here
        let i = self.x.partition_point(|&xi| xi <= x);
        let (x0, x1) = (self.x[i - 1], self.x[i]);
        let (y0, y1) = (self.y[i - 1], self.y[i]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    pub fn min_y(&self) -> f64 {
        self.y.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn interpolates_and_clamps() {
        let s = LinearSpline::new(vec![0.0, 10.0, 20.0], vec![1.0, 2.0, 4.0]).unwrap();
        assert_eq!(s.value(-5.0), 1.0);
        assert_eq!(s.value(5.0), 1.5);
        assert_eq!(s.value(10.0), 2.0);
        assert_eq!(s.value(15.0), 3.0);
        assert_eq!(s.value(99.0), 4.0);
    }

    #[test]
    fn rejects_bad_tables() {
        assert!(LinearSpline::new(vec![], vec![]).is_err());
        assert!(LinearSpline::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(LinearSpline::new(vec![1.0, 1.0], vec![1.0, 2.0]).is_err());
        assert!(LinearSpline::new(vec![0.0, f64::NAN], vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn constant_table() {
        let s = LinearSpline::constant(3.0);
        assert_eq!(s.value(-100.0), 3.0);
        assert_eq!(s.value(100.0), 3.0);
    }

    proptest! {
        #[test]
        fn value_stays_within_table_bounds(x in -100.0..200.0f64) {
            let s = LinearSpline::new(vec![0.0, 50.0, 100.0], vec![5.0, 1.0, 3.0]).unwrap();
            let v = s.value(x);
            prop_assert!((1.0..=5.0).contains(&v));
        }
    }
}
