//! Feature selection: per-feature scoring strategies and score ranking.
pub mod ranking;
pub mod scoring;
