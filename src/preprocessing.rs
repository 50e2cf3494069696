//! Z-score standardization shared by cross-validation and final training.
//!
//! Provides a simple per-column mean/std scaler operating on `Array2<f64>`.
//! The scaler is fit once and can transform any matrix with the same number
//! of columns.

use ndarray::{Array1, Array2, Axis};

/// Per-column mean/std standardizer.
#[derive(Clone, Debug)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl StandardScaler {
    /// Minimum stddev to avoid division by zero on constant columns.
    const MIN_STD: f64 = 1e-12;

    /// Fit a scaler from a matrix where rows are samples and columns are
    /// features. Uses population variance.
    pub fn fit(x: &Array2<f64>) -> Self {
        assert!(
            x.nrows() > 0 && x.ncols() > 0,
            "StandardScaler::fit requires a non-empty matrix"
        );

        let mean = x.mean_axis(Axis(0)).unwrap();
        let std = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| s.max(Self::MIN_STD));

        StandardScaler { mean, std }
    }

    /// Standardize all rows, returning a new matrix.
    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = x.clone();
        for mut row in out.rows_mut() {
            row -= &self.mean;
            row /= &self.std;
        }
        out
    }

    /// Fit on `x` and return the transformed matrix in one call.
    pub fn fit_transform(x: &Array2<f64>) -> (Self, Array2<f64>) {
        let scaler = Self::fit(x);
        let scaled = scaler.transform(x);
        (scaler, scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn standardizes_to_zero_mean_unit_variance() {
        let x = arr2(&[[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]]);
        let (_, scaled) = StandardScaler::fit_transform(&x);

        for col in scaled.columns() {
            let mean = col.mean().unwrap();
            let var = col.mapv(|v| (v - mean).powi(2)).mean().unwrap();
            assert!(mean.abs() < 1e-10);
            assert!((var - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn constant_column_does_not_divide_by_zero() {
        let x = arr2(&[[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]]);
        let (_, scaled) = StandardScaler::fit_transform(&x);
        assert!(scaled.iter().all(|v| v.is_finite()));
        assert!(scaled.column(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn transform_reuses_fitted_statistics() {
        let train = arr2(&[[0.0], [2.0]]);
        let scaler = StandardScaler::fit(&train);
        let test = arr2(&[[4.0]]);
        let scaled = scaler.transform(&test);
        // mean 1, std 1 -> (4 - 1) / 1 = 3
        assert!((scaled[(0, 0)] - 3.0).abs() < 1e-10);
    }
}
