//! L2-regularized logistic regression trained by full-batch gradient descent.
//!
//! The regularization strength follows the inverse-C convention: the penalty
//! term added to the gradient is `w / (c * n)`, so larger C means a weaker
//! penalty. The bias is never penalized. Callers are expected to standardize
//! features before fitting; the model itself does no scaling.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::LogisticConfig;
use crate::error::PipelineError;
use crate::models::classifier_trait::BinaryClassifier;

pub struct LogisticRegression {
    config: LogisticConfig,
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl LogisticRegression {
    pub fn new(config: LogisticConfig) -> Self {
        LogisticRegression {
            config,
            weights: None,
            bias: 0.0,
        }
    }

    pub fn config(&self) -> &LogisticConfig {
        &self.config
    }

    /// Fitted feature weights, `None` before `fit`.
    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    fn init_weights(n_features: usize, seed: u64) -> Array1<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array1::from_iter((0..n_features).map(|_| rng.gen_range(-0.01..0.01)))
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    fn decision(&self, x: &Array2<f64>) -> Array1<f64> {
        let weights = self
            .weights
            .as_ref()
            .expect("model used before fit");
        x.dot(weights) + self.bias
    }
}

impl BinaryClassifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i32>) -> Result<(), PipelineError> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples == 0 || n_features == 0 {
            return Err(PipelineError::InvalidArgument(
                "cannot fit on an empty matrix".to_string(),
            ));
        }
        if y.len() != n_samples {
            return Err(PipelineError::InvalidArgument(format!(
                "{} rows but {} labels",
                n_samples,
                y.len()
            )));
        }
        if y.iter().any(|&label| label != 0 && label != 1) {
            return Err(PipelineError::InvalidArgument(
                "labels must be 0 or 1".to_string(),
            ));
        }

        let targets = y.mapv(|label| label as f64);
        let mut weights = Self::init_weights(n_features, self.config.seed);
        let mut bias = 0.0;

        let n = n_samples as f64;
        let penalty = 1.0 / (self.config.c * n);
        let lr = self.config.learning_rate;

        for _ in 0..self.config.max_iter {
            let probs = (x.dot(&weights) + bias).mapv(Self::sigmoid);
            let error = &probs - &targets;

            let grad_w = x.t().dot(&error) / n + &weights * penalty;
            let grad_b = error.sum() / n;

            weights -= &(grad_w * lr);
            bias -= grad_b * lr;
        }

        self.weights = Some(weights);
        self.bias = bias;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Array1<i32> {
        self.predict_proba(x)
            .mapv(|p| if p >= 0.5 { 1 } else { 0 })
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Array1<f64> {
        self.decision(x).mapv(Self::sigmoid)
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}
