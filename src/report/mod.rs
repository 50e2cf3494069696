//! Result tables, Markdown reports, and PNG chart rendering.
pub mod plots;
pub mod report;
