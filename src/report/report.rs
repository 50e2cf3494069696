//! Result tables and Markdown report assembly.
//!
//! Rendering is deterministic template substitution over the accumulated
//! per-method results; file writers create the results directory on demand.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::feature_selection::ranking::RankedFeature;
use crate::metrics::ConfusionMatrix;

/// One evaluated method's bottom line.
#[derive(Debug, Clone)]
pub struct MethodResult {
    pub name: String,
    pub feature_count: usize,
    pub accuracy: f64,
    pub f1: f64,
    pub training_secs: f64,
    /// Set when the overfitting search chose a non-default C.
    pub regularization_c: Option<f64>,
}

/// Per-method overfitting summary for the report.
#[derive(Debug, Clone)]
pub struct OverfitSummary {
    pub method: String,
    pub detected: bool,
    pub gap: f64,
    pub best_c: Option<f64>,
}

/// Create the results directory if it does not exist yet.
pub fn ensure_results_dir<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create results directory: {}", dir.display()))?;
        log::info!("Created results directory: {}", dir.display());
    }
    Ok(())
}

/// Header row plus one formatted row per method. Numeric fields are
/// rendered to 4 decimal places.
pub fn results_table(results: &[(String, MethodResult)]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(results.len() + 1);
    rows.push(vec![
        "Method".to_string(),
        "Features".to_string(),
        "Accuracy".to_string(),
        "F1 score".to_string(),
        "Training time (s)".to_string(),
        "C (regularization)".to_string(),
    ]);

    for (_, result) in results {
        rows.push(vec![
            result.name.clone(),
            result.feature_count.to_string(),
            format!("{:.4}", result.accuracy),
            format!("{:.4}", result.f1),
            format!("{:.4}", result.training_secs),
            result
                .regularization_c
                .map(|c| c.to_string())
                .unwrap_or_default(),
        ]);
    }
    rows
}

/// Write the results table as a comma-delimited UTF-8 CSV.
pub fn write_results_csv<P: AsRef<Path>>(
    results: &[(String, MethodResult)],
    dir: P,
    filename: &str,
) -> Result<PathBuf> {
    ensure_results_dir(&dir)?;
    let path = dir.as_ref().join(filename);

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create results file: {}", path.display()))?;
    for row in results_table(results) {
        writer.write_record(&row)?;
    }
    writer.flush()?;

    log::info!("Results saved: {}", path.display());
    Ok(path)
}

/// Render the evaluation report. The best method is starred in the table;
/// the overfitting and confusion-matrix sections appear only when their
/// data is provided.
pub fn render_markdown_report(
    results: &[(String, MethodResult)],
    best_key: &str,
    confusion: Option<&ConfusionMatrix>,
    overfitting: Option<&[OverfitSummary]>,
) -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut report = format!(
        "# Logistic Regression Evaluation Report\n\n\
         **Date:** {}\n\
         **Method:** Logistic regression + stratified k-fold cross-validation\n\n\
         ---\n\n\
         ## Results\n\n\
         | Method | Features | Accuracy | F1 score | Training time (s) |\n\
         |--------|----------|----------|----------|-------------------|\n",
        timestamp
    );

    for (key, result) in results {
        let marker = if key == best_key { " ⭐" } else { "" };
        report.push_str(&format!(
            "| {}{} | {} | {:.4} | {:.4} | {:.4} |\n",
            result.name, marker, result.feature_count, result.accuracy, result.f1, result.training_secs
        ));
    }

    if let Some((_, best)) = results.iter().find(|(key, _)| key == best_key) {
        report.push_str(&format!(
            "\n> Best method: **{}** (accuracy {:.4}, F1 {:.4})\n\n\
             ---\n\n\
             ## Best Method Details\n\n\
             **Method:** {}\n\
             **Features:** {}\n\
             **Accuracy:** {:.4} ({:.2}%)\n\
             **F1 score:** {:.4}\n",
            best.name,
            best.accuracy,
            best.f1,
            best.name,
            best.feature_count,
            best.accuracy,
            best.accuracy * 100.0,
            best.f1
        ));
    }

    if let Some(summaries) = overfitting {
        report.push_str("\n---\n\n## Overfitting Analysis\n\n");
        for summary in summaries {
            let status = if summary.detected {
                "detected"
            } else {
                "not detected"
            };
            report.push_str(&format!(
                "- **{}:** {} (gap {:.4})",
                summary.method, status, summary.gap
            ));
            if let Some(c) = summary.best_c.filter(|_| summary.detected) {
                report.push_str(&format!(", regularization C = {}", c));
            }
            report.push('\n');
        }
    }

    if let Some(cm) = confusion {
        report.push_str(&format!(
            "\n---\n\n\
             ## Confusion Matrix\n\n\
             |  | Predicted: 0 | Predicted: 1 |\n\
             |--|--------------|--------------|\n\
             | **Actual: 0** | {} (TN) | {} (FP) |\n\
             | **Actual: 1** | {} (FN) | {} (TP) |\n\n\
             - TN: correctly predicted negatives\n\
             - FP: negatives predicted positive\n\
             - FN: positives predicted negative\n\
             - TP: correctly predicted positives\n",
            cm.tn, cm.fp, cm.fn_, cm.tp
        ));
    }

    report
}

fn score_comment(normalized_score: f64, rank: usize) -> &'static str {
    if rank <= 3 {
        "among the most important"
    } else if rank <= 5 {
        "very high importance"
    } else if rank <= 10 {
        "high importance"
    } else if normalized_score >= 0.5 {
        "medium-high importance"
    } else if normalized_score >= 0.3 {
        "medium importance"
    } else {
        "low-medium importance"
    }
}

/// Render a feature-selection analysis report for one scoring strategy.
pub fn render_feature_report(
    method_name: &str,
    method_description: &str,
    ranking: &[RankedFeature],
    top_n: usize,
    dataset_name: &str,
) -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let shown = top_n.min(ranking.len());

    let mut report = format!(
        "# Feature Selection Analysis\n\n\
         **Method:** {}\n\
         **Dataset:** {}\n\
         **Date:** {}\n\n\
         ---\n\n\
         {}\n\n\
         **Selected features:** {}\n\n\
         ---\n\n\
         ## Feature Ranking\n\n\
         | Rank | Feature | Normalized score | Comment |\n\
         |------|---------|------------------|---------|\n",
        method_name, dataset_name, timestamp, method_description, shown
    );

    for entry in &ranking[..shown] {
        report.push_str(&format!(
            "| {} | {} | {:.4} | {} |\n",
            entry.rank,
            entry.name,
            entry.normalized_score,
            score_comment(entry.normalized_score, entry.rank)
        ));
    }

    report.push_str("\n---\n\n## Selected Feature List\n\n");
    for (i, entry) in ranking[..shown].iter().enumerate() {
        report.push_str(&format!("{}. `{}`\n", i + 1, entry.name));
    }

    let max_norm = ranking
        .iter()
        .map(|e| e.normalized_score)
        .fold(f64::NEG_INFINITY, f64::max);
    let top = &ranking[..shown];
    let top_min = top
        .iter()
        .map(|e| e.normalized_score)
        .fold(f64::INFINITY, f64::min);
    let top_mean = top.iter().map(|e| e.normalized_score).sum::<f64>() / shown as f64;

    report.push_str(&format!(
        "\n---\n\n\
         ## Score Statistics\n\n\
         | Metric | Value |\n\
         |--------|-------|\n\
         | Max normalized score | {:.4} |\n\
         | Min normalized score (top {}) | {:.4} |\n\
         | Mean normalized score (top {}) | {:.4} |\n",
        max_norm, shown, top_min, shown, top_mean
    ));

    report
}

/// Write a rendered Markdown report into the results directory.
pub fn write_markdown_report<P: AsRef<Path>>(
    report: &str,
    dir: P,
    filename: &str,
) -> Result<PathBuf> {
    ensure_results_dir(&dir)?;
    let path = dir.as_ref().join(filename);
    fs::write(&path, report)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    log::info!("Report saved: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> Vec<(String, MethodResult)> {
        vec![
            (
                "all_features".to_string(),
                MethodResult {
                    name: "All features".to_string(),
                    feature_count: 58,
                    accuracy: 0.6512,
                    f1: 0.6488,
                    training_secs: 0.7321,
                    regularization_c: None,
                },
            ),
            (
                "filter_method".to_string(),
                MethodResult {
                    name: "Filter (Pearson)".to_string(),
                    feature_count: 15,
                    accuracy: 0.6603,
                    f1: 0.6590,
                    training_secs: 0.2105,
                    regularization_c: Some(0.1),
                },
            ),
        ]
    }

    #[test]
    fn table_has_header_and_one_row_per_method() {
        let table = results_table(&sample_results());
        assert_eq!(table.len(), 3);
        assert_eq!(table[1][0], "All features");
        assert_eq!(table[2][2], "0.6603");
        assert_eq!(table[2][5], "0.1");
        assert_eq!(table[1][5], "");
    }

    #[test]
    fn markdown_report_stars_the_best_method() {
        let results = sample_results();
        let report = render_markdown_report(&results, "filter_method", None, None);

        assert!(report.contains("Filter (Pearson) ⭐"));
        assert!(!report.contains("All features ⭐"));
        assert!(report.contains("Best method: **Filter (Pearson)**"));
        assert!(!report.contains("Confusion Matrix"));
        assert!(!report.contains("Overfitting Analysis"));
    }

    #[test]
    fn optional_sections_render_when_provided() {
        let results = sample_results();
        let cm = ConfusionMatrix {
            tn: 40,
            fp: 10,
            fn_: 12,
            tp: 38,
        };
        let overfit = vec![OverfitSummary {
            method: "Filter (Pearson)".to_string(),
            detected: true,
            gap: 0.0712,
            best_c: Some(0.1),
        }];
        let report =
            render_markdown_report(&results, "filter_method", Some(&cm), Some(&overfit));

        assert!(report.contains("## Confusion Matrix"));
        assert!(report.contains("40 (TN)"));
        assert!(report.contains("## Overfitting Analysis"));
        assert!(report.contains("regularization C = 0.1"));
    }

    #[test]
    fn results_csv_round_trips_through_the_csv_reader(){
        let dir = std::env::temp_dir().join("newspop_report_csv");
        let path = write_results_csv(&sample_results(), &dir, "results.csv").unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "All features");
    }

    #[test]
    fn feature_report_lists_top_entries_with_comments() {
        let ranking = vec![
            RankedFeature {
                name: "kw_avg_avg".to_string(),
                raw_score: 0.41,
                abs_score: 0.41,
                normalized_score: 1.0,
                rank: 1,
            },
            RankedFeature {
                name: "num_hrefs".to_string(),
                raw_score: -0.2,
                abs_score: 0.2,
                normalized_score: 0.32,
                rank: 2,
            },
        ];
        let report = render_feature_report(
            "Filter (Pearson correlation)",
            "Features ranked by absolute correlation with the target.",
            &ranking,
            2,
            "processed_dataset.csv",
        );

        assert!(report.contains("| 1 | kw_avg_avg | 1.0000 | among the most important |"));
        assert!(report.contains("`num_hrefs`"));
        assert!(report.contains("## Score Statistics"));
    }
}
