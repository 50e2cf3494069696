//! Tabular dataset loading and partitioning.
//!
//! A `Dataset` holds the numeric feature matrix, the 0/1 target vector, and
//! the column names. Loading validates the header, construction drops the
//! target column from the matrix, and `stratified_split` produces a
//! deterministic class-proportional train/test partition.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::PipelineError;

/// Loaded samples: features by row, one 0/1 label per row.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: Array2<f64>,
    pub y: Array1<i32>,
    pub feature_names: Vec<String>,
    pub target_name: String,
}

/// Row partition produced by `stratified_split`.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<i32>,
    pub y_test: Array1<i32>,
}

impl Dataset {
    /// Read a headered, comma-delimited CSV. Every column except
    /// `target_column` is parsed as a numeric feature; the target column
    /// must hold 0/1 labels (integer, float, or boolean literal form).
    pub fn from_csv<P: AsRef<Path>>(path: P, target_column: &str) -> Result<Dataset> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::DatasetNotFound(path.to_path_buf()).into());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

        let headers = reader
            .headers()
            .context("Failed to read dataset header row")?
            .clone();

        let target_idx = headers
            .iter()
            .position(|header| header == target_column)
            .ok_or_else(|| PipelineError::MissingColumn(target_column.to_string()))?;

        let feature_names: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != target_idx)
            .map(|(_, name)| name.to_string())
            .collect();
        if feature_names.is_empty() {
            return Err(anyhow!("Dataset has no feature columns besides the target"));
        }

        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

            for (col_idx, value) in record.iter().enumerate() {
                if col_idx == target_idx {
                    labels.push(parse_label(value, row_idx, target_column)?);
                } else {
                    let parsed = value.trim().parse::<f64>().with_context(|| {
                        format!(
                            "Invalid value for feature '{}' at row {}",
                            headers.get(col_idx).unwrap_or(""),
                            row_idx + 1
                        )
                    })?;
                    features.push(parsed);
                }
            }
        }

        let n_samples = labels.len();
        let x = Array2::from_shape_vec((n_samples, feature_names.len()), features)
            .context("Failed to build feature matrix")?;
        let y = Array1::from_vec(labels);

        let dataset = Dataset {
            x,
            y,
            feature_names,
            target_name: target_column.to_string(),
        };
        log::info!(
            "Loaded dataset {}: {} samples, {} features, class counts {:?}",
            path.display(),
            dataset.x.nrows(),
            dataset.x.ncols(),
            dataset.class_counts()
        );

        Ok(dataset)
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Feature matrix, target column already dropped.
    pub fn features(&self) -> &Array2<f64> {
        &self.x
    }

    /// Target vector of 0/1 labels.
    pub fn target(&self) -> &Array1<i32> {
        &self.y
    }

    /// Samples per class label, keyed in ascending label order.
    pub fn class_counts(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for &label in self.y.iter() {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }

    /// Project onto the named features, keeping the order of `names`.
    pub fn select_features(&self, names: &[String]) -> Result<Dataset, PipelineError> {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let idx = self
                .feature_names
                .iter()
                .position(|existing| existing == name)
                .ok_or_else(|| PipelineError::MissingColumn(name.clone()))?;
            indices.push(idx);
        }

        Ok(Dataset {
            x: self.x.select(Axis(1), &indices),
            y: self.y.clone(),
            feature_names: names.to_vec(),
            target_name: self.target_name.clone(),
        })
    }

    /// Persist the dataset (features plus target column) as a headered CSV.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create dataset file: {}", path.display()))?;

        let mut header: Vec<&str> = self.feature_names.iter().map(String::as_str).collect();
        header.push(&self.target_name);
        writer.write_record(&header)?;

        for (row, &label) in self.x.rows().into_iter().zip(self.y.iter()) {
            let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            record.push(label.to_string());
            writer.write_record(&record)?;
        }
        writer.flush()?;

        log::debug!("Wrote selected dataset: {}", path.display());
        Ok(path.to_path_buf())
    }
}

fn parse_label(value: &str, row_idx: usize, column: &str) -> Result<i32, PipelineError> {
    let trimmed = value.trim();
    let label = match trimmed {
        "0" | "false" | "False" => 0,
        "1" | "true" | "True" => 1,
        other => match other.parse::<f64>() {
            Ok(v) if v == 0.0 => 0,
            Ok(v) if v == 1.0 => 1,
            _ => {
                return Err(PipelineError::InvalidArgument(format!(
                    "target column '{}' holds non-binary value '{}' at row {}",
                    column,
                    trimmed,
                    row_idx + 1
                )))
            }
        },
    };
    Ok(label)
}

/// Split rows into train/test partitions, preserving class proportions.
///
/// Deterministic for a given seed: each class's indices are shuffled with a
/// seeded rng and the first `round(len * test_fraction)` go to the test set
/// (clamped so both sides keep at least one sample per class).
pub fn stratified_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, PipelineError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::InvalidArgument(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let mut by_class: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in dataset.y.iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }
    for (label, indices) in &by_class {
        if indices.len() < 2 {
            return Err(PipelineError::InvalidArgument(format!(
                "class {} has {} sample(s); stratified split needs at least 2",
                label,
                indices.len()
            )));
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_indices = Vec::new();
    let mut test_indices = Vec::new();

    for indices in by_class.values() {
        let mut shuffled = indices.clone();
        shuffled.shuffle(&mut rng);

        let n_test = ((shuffled.len() as f64 * test_fraction).round() as usize)
            .clamp(1, shuffled.len() - 1);
        test_indices.extend_from_slice(&shuffled[..n_test]);
        train_indices.extend_from_slice(&shuffled[n_test..]);
    }

    // Row order within each partition is index order, not shuffle order.
    train_indices.sort_unstable();
    test_indices.sort_unstable();

    log::info!(
        "Split {} samples into {} train / {} test",
        dataset.n_samples(),
        train_indices.len(),
        test_indices.len()
    );

    Ok(TrainTestSplit {
        x_train: dataset.x.select(Axis(0), &train_indices),
        x_test: dataset.x.select(Axis(0), &test_indices),
        y_train: dataset.y.select(Axis(0), &train_indices),
        y_test: dataset.y.select(Axis(0), &test_indices),
    })
}
