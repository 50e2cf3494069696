use serde::{Deserialize, Serialize};

/// Regularization strengths tried when the default model overfits.
/// C is the inverse penalty, so the list runs from strong to weak.
pub const DEFAULT_C_CANDIDATES: [f64; 6] = [0.001, 0.01, 0.1, 1.0, 10.0, 100.0];

/// Train/validation accuracy gap above which a model counts as overfit.
pub const OVERFIT_GAP_THRESHOLD: f64 = 0.05;

/// Central configuration for the logistic-regression classifier.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LogisticConfig {
    /// Inverse regularization strength. Larger values weaken the L2 penalty.
    pub c: f64,
    /// Gradient-descent iteration cap.
    pub max_iter: usize,
    /// Gradient-descent step size.
    pub learning_rate: f64,
    /// Seed for weight initialization.
    pub seed: u64,
}

impl LogisticConfig {
    pub fn new(c: f64) -> Self {
        Self {
            c,
            ..Self::default()
        }
    }

    /// Clone this configuration with a different regularization strength.
    /// Used by the grid search to vary only C.
    pub fn with_c(&self, c: f64) -> Self {
        Self { c, ..self.clone() }
    }
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            learning_rate: 0.1,
            seed: 42,
        }
    }
}
