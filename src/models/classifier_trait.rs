use ndarray::{Array1, Array2};

use crate::error::PipelineError;

/// Contract for binary classifiers used by the evaluation pipeline.
/// Centralized here so implementations can live next to model code.
pub trait BinaryClassifier {
    /// Fit the model. `y` holds 0/1 class labels, one per row of `x`.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i32>) -> Result<(), PipelineError>;

    /// Predict 0/1 class labels.
    fn predict(&self, x: &Array2<f64>) -> Array1<i32>;

    /// Predict class-1 probabilities in [0, 1].
    fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64>;

    /// Human readable name for the model.
    fn name(&self) -> &str {
        "classifier"
    }
}
