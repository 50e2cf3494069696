//! Per-feature score providers for the three selection strategies.
//!
//! Filter scores come from Pearson correlation against the target (with an
//! F-statistic variant for significance testing), wrapper scores from
//! recursive feature elimination over the logistic model, and embedded
//! scores from the magnitudes of a single regularized fit. All providers
//! return one score per feature; ranking takes absolute values downstream.

use ndarray::{Array1, Array2, Axis};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::config::LogisticConfig;
use crate::error::PipelineError;
use crate::models::classifier_trait::BinaryClassifier;
use crate::models::logistic::LogisticRegression;
use crate::preprocessing::StandardScaler;

/// Pearson's r of each feature column against the target.
///
/// Signed: negatively correlated features score negative. Non-finite
/// coefficients (constant columns, constant target) are forced to 0.
pub fn correlation_scores(x: &Array2<f64>, y: &Array1<i32>) -> Array1<f64> {
    let n_features = x.ncols();
    let targets = y.mapv(|label| label as f64);

    let y_mean = targets.mean().unwrap_or(0.0);
    let y_centered = &targets - y_mean;
    let y_norm = y_centered.dot(&y_centered).sqrt();

    let mut coefficients = Array1::zeros(n_features);
    for (idx, col) in x.columns().into_iter().enumerate() {
        let col_mean = col.mean().unwrap_or(0.0);
        let centered = col.mapv(|v| v - col_mean);
        let col_norm = centered.dot(&centered).sqrt();

        let r = centered.dot(&y_centered) / (col_norm * y_norm);
        coefficients[idx] = if r.is_finite() { r } else { 0.0 };
    }

    coefficients
}

/// Univariate F-statistics and p-values derived from Pearson's r.
///
/// The F-statistic for a single regressor is `r^2 / (1 - r^2) * dof` with
/// `dof = n - 2`; p-values come from the Fisher–Snedecor CDF. Infinite
/// statistics (perfect correlation) map to `f64::MAX` with p = 0, NaN to
/// 0 with p = 1.
pub fn f_scores(x: &Array2<f64>, y: &Array1<i32>) -> (Array1<f64>, Array1<f64>) {
    let coefficients = correlation_scores(x, y);
    let dof = x.nrows() as f64 - 2.0;

    let mut f_statistic = coefficients.mapv(|r| {
        let r2 = r * r;
        r2 / (1.0 - r2) * dof
    });
    let mut p_values = Array1::ones(f_statistic.len());

    if dof > 0.0 {
        if let Ok(f_dist) = FisherSnedecor::new(1.0, dof) {
            for (i, &f) in f_statistic.iter().enumerate() {
                if f.is_finite() {
                    p_values[i] = 1.0 - f_dist.cdf(f);
                }
            }
        }
    }

    for i in 0..f_statistic.len() {
        if f_statistic[i].is_infinite() {
            f_statistic[i] = f64::MAX;
            p_values[i] = 0.0;
        } else if f_statistic[i].is_nan() {
            f_statistic[i] = 0.0;
            p_values[i] = 1.0;
        }
    }

    (f_statistic, p_values)
}

/// Recursive feature elimination scores (wrapper method).
///
/// Repeatedly standardize the surviving columns, fit the logistic model,
/// and drop the feature with the smallest absolute weight. A feature's
/// score is the round in which it was eliminated, so survivors score
/// highest.
pub fn rfe_scores(
    x: &Array2<f64>,
    y: &Array1<i32>,
    config: &LogisticConfig,
) -> Result<Array1<f64>, PipelineError> {
    let n_features = x.ncols();
    if n_features == 0 {
        return Err(PipelineError::InvalidArgument(
            "cannot run elimination on an empty feature set".to_string(),
        ));
    }

    let mut scores = Array1::zeros(n_features);
    let mut remaining: Vec<usize> = (0..n_features).collect();
    let mut round = 0usize;

    while remaining.len() > 1 {
        let subset = x.select(Axis(1), &remaining);
        let (_, scaled) = StandardScaler::fit_transform(&subset);

        let mut model = LogisticRegression::new(config.clone());
        model.fit(&scaled, y)?;
        let weights = model
            .weights()
            .expect("weights available after fit");

        let weakest = weights
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.abs()
                    .partial_cmp(&b.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(pos, _)| pos)
            .expect("at least two features remain");

        round += 1;
        scores[remaining[weakest]] = round as f64;
        let dropped = remaining.remove(weakest);
        log::debug!("Elimination round {}: dropped feature {}", round, dropped);
    }

    scores[remaining[0]] = n_features as f64;
    Ok(scores)
}

/// Embedded scores: absolute weights of one regularized fit on the
/// standardized full feature set.
pub fn embedded_scores(
    x: &Array2<f64>,
    y: &Array1<i32>,
    config: &LogisticConfig,
) -> Result<Array1<f64>, PipelineError> {
    let (_, scaled) = StandardScaler::fit_transform(x);
    let mut model = LogisticRegression::new(config.clone());
    model.fit(&scaled, y)?;

    Ok(model
        .weights()
        .expect("weights available after fit")
        .mapv(f64::abs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    /// Five features: noise, perfectly aligned with the target, constant,
    /// collinear with the first, weak noise.
    fn structured_data() -> (Array2<f64>, Array1<i32>) {
        let x = Array2::from_shape_vec(
            (10, 5),
            vec![
                0.1, 1.0, 5.0, 0.2, -0.3, //
                0.4, 0.0, 5.0, 0.8, 0.1, //
                0.6, 1.0, 5.0, 1.2, 0.2, //
                0.9, 0.0, 5.0, 1.8, -0.1, //
                1.2, 1.0, 5.0, 2.4, 0.3, //
                1.5, 0.0, 5.0, 3.0, 0.0, //
                1.8, 1.0, 5.0, 3.6, -0.2, //
                2.1, 0.0, 5.0, 4.2, 0.4, //
                2.4, 1.0, 5.0, 4.8, -0.1, //
                2.7, 0.0, 5.0, 5.4, 0.2,
            ],
        )
        .unwrap();
        let y = arr1(&[1, 0, 1, 0, 1, 0, 1, 0, 1, 0]);
        (x, y)
    }

    #[test]
    fn correlation_finds_the_aligned_feature() {
        let (x, y) = structured_data();
        let scores = correlation_scores(&x, &y);

        assert!((scores[1] - 1.0).abs() < 1e-9);
        // constant column forced to zero instead of NaN
        assert_eq!(scores[2], 0.0);
        assert!(scores.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn f_scores_rank_the_aligned_feature_highest() {
        let (x, y) = structured_data();
        let (f, p) = f_scores(&x, &y);

        let best = f
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(idx, _)| idx)
            .unwrap();
        assert_eq!(best, 1);
        assert!(p[1] < 0.05);
        assert!(p[2] > 0.5);
    }

    #[test]
    fn rfe_keeps_the_predictive_feature_longest() {
        let (x, y) = structured_data();
        let scores = rfe_scores(&x, &y, &LogisticConfig::default()).unwrap();

        let best = scores
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(idx, _)| idx)
            .unwrap();
        assert_eq!(best, 1);
        assert_eq!(scores.len(), 5);
    }

    #[test]
    fn embedded_weights_favor_the_predictive_feature() {
        let (x, y) = structured_data();
        let scores = embedded_scores(&x, &y, &LogisticConfig::default()).unwrap();

        let best = scores
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(idx, _)| idx)
            .unwrap();
        assert_eq!(best, 1);
        assert!(scores.iter().all(|&s| s >= 0.0));
    }
}
