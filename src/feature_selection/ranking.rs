//! Score ranking: absolute value, min-max normalization, dense ranks.

use ndarray::Array1;

use crate::error::PipelineError;

/// One feature's position in a ranking.
#[derive(Debug, Clone)]
pub struct RankedFeature {
    pub name: String,
    pub raw_score: f64,
    pub abs_score: f64,
    pub normalized_score: f64,
    /// Dense 1..N rank, 1 = largest absolute score.
    pub rank: usize,
}

/// Min-max normalize absolute scores to [0, 1].
///
/// When every score is equal the range is degenerate and all entries map
/// to 1.0.
pub fn normalize_scores(abs_scores: &Array1<f64>) -> Array1<f64> {
    let min = abs_scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = abs_scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return Array1::ones(abs_scores.len());
    }
    abs_scores.mapv(|score| (score - min) / (max - min))
}

/// Rank features by descending absolute score.
///
/// Correlation-style scores may be negative, so ordering uses |score|. The
/// sort is stable: ties keep original column order. Ranks are dense 1..N.
pub fn rank_features(
    names: &[String],
    scores: &Array1<f64>,
) -> Result<Vec<RankedFeature>, PipelineError> {
    if names.len() != scores.len() {
        return Err(PipelineError::InvalidArgument(format!(
            "{} feature names but {} scores",
            names.len(),
            scores.len()
        )));
    }
    if names.is_empty() {
        return Err(PipelineError::InvalidArgument(
            "cannot rank an empty feature set".to_string(),
        ));
    }

    let abs_scores = scores.mapv(f64::abs);
    let normalized = normalize_scores(&abs_scores);

    let mut entries: Vec<RankedFeature> = names
        .iter()
        .zip(scores.iter())
        .zip(abs_scores.iter().zip(normalized.iter()))
        .map(|((name, &raw), (&abs, &norm))| RankedFeature {
            name: name.clone(),
            raw_score: raw,
            abs_score: abs,
            normalized_score: norm,
            rank: 0,
        })
        .collect();

    // Vec::sort_by is stable, so equal scores stay in input order.
    entries.sort_by(|a, b| {
        b.abs_score
            .partial_cmp(&a.abs_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rank = idx + 1;
    }

    Ok(entries)
}

/// Names of the `top_n` best-ranked features.
pub fn top_features(
    ranking: &[RankedFeature],
    top_n: usize,
) -> Result<Vec<String>, PipelineError> {
    if top_n == 0 {
        return Err(PipelineError::InvalidArgument(
            "top_n must be positive".to_string(),
        ));
    }
    if top_n > ranking.len() {
        return Err(PipelineError::InvalidArgument(format!(
            "top_n {} exceeds ranking length {}",
            top_n,
            ranking.len()
        )));
    }

    Ok(ranking[..top_n]
        .iter()
        .map(|entry| entry.name.clone())
        .collect())
}
