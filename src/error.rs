use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by the evaluation pipeline.
///
/// Every variant aborts the run at the call site; there is no retry or
/// partial-recovery path.
#[derive(Debug)]
pub enum PipelineError {
    /// The input dataset file does not exist.
    DatasetNotFound(PathBuf),
    /// A named column is absent from the dataset header.
    MissingColumn(String),
    /// A parameter is outside its valid range (test fraction, top-N, fold count, ...).
    InvalidArgument(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::DatasetNotFound(path) => {
                write!(f, "Dataset not found: {}", path.display())
            }
            PipelineError::MissingColumn(name) => {
                write!(f, "Column '{}' not found in dataset", name)
            }
            PipelineError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl Error for PipelineError {}
