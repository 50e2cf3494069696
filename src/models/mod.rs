//! Classifier model wrappers.
//!
//! The trait contract lives in `classifier_trait`; `logistic` holds the
//! gradient-descent logistic regression and `factory` builds boxed models
//! from a configuration.
pub mod classifier_trait;
pub mod factory;
pub mod logistic;
