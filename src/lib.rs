//! newspop: feature selection and logistic-regression evaluation for
//! tabular news-popularity data.
//!
//! This crate loads a CSV dataset, ranks features with filter, wrapper, or
//! embedded scoring strategies, trains an L2-regularized logistic-regression
//! classifier per feature set, evaluates it with stratified cross-validation
//! and held-out test metrics (including overfitting detection with a
//! regularization grid search), and writes comparison tables, Markdown
//! reports, and PNG charts to a results directory.
//!
//! The design favors small, testable modules: every step is a pure function
//! of its inputs apart from file I/O.
pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_selection;
pub mod metrics;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod validation;
