//! Batch evaluation run: compare feature-selection strategies on one dataset.
//!
//! Usage: `evaluate [dataset.csv] [results_dir]`. Loads the dataset, builds
//! the three selected-feature variants, resolves overfitting per method,
//! trains and scores a final model on a held-out split, and writes the
//! results table, Markdown report, and PNG charts.

use anyhow::{Context, Result};
use ndarray::Array1;

use newspop::config::LogisticConfig;
use newspop::dataset::{stratified_split, Dataset};
use newspop::feature_selection::ranking::{rank_features, top_features, RankedFeature};
use newspop::feature_selection::scoring;
use newspop::metrics::{classification_report, compute_metrics, confusion_matrix};
use newspop::report::plots::{render_comparison_bar_chart, render_confusion_heatmap, ComparisonMetric};
use newspop::report::report::{
    ensure_results_dir, render_feature_report, render_markdown_report, write_markdown_report,
    write_results_csv, MethodResult, OverfitSummary,
};
use newspop::validation::{resolve_overfitting, train_final};

const TARGET_COLUMN: &str = "is_popular";
const TEST_FRACTION: f64 = 0.2;
const SPLIT_SEED: u64 = 42;
const CV_FOLDS: usize = 5;
const TOP_N: usize = 15;

const CLASS_LABELS: [&str; 2] = ["Not Popular (0)", "Popular (1)"];

struct Strategy {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    report_file: &'static str,
    dataset_file: &'static str,
}

const STRATEGIES: [Strategy; 3] = [
    Strategy {
        key: "filter_method",
        name: "Filter (Pearson)",
        description: "Features ranked by absolute Pearson correlation with the target.",
        report_file: "filter_analysis_report.md",
        dataset_file: "filter_method_selected_dataset.csv",
    },
    Strategy {
        key: "wrapper_method",
        name: "Wrapper (RFE)",
        description: "Features ranked by recursive elimination order over the logistic model.",
        report_file: "wrapper_analysis_report.md",
        dataset_file: "wrapper_method_selected_dataset.csv",
    },
    Strategy {
        key: "embedded_method",
        name: "Embedded (model weights)",
        description: "Features ranked by absolute weight of one regularized fit.",
        report_file: "embedded_analysis_report.md",
        dataset_file: "embedded_method_selected_dataset.csv",
    },
];

fn strategy_scores(key: &str, dataset: &Dataset) -> Result<Array1<f64>> {
    let config = LogisticConfig::default();
    let scores = match key {
        "filter_method" => scoring::correlation_scores(&dataset.x, &dataset.y),
        "wrapper_method" => scoring::rfe_scores(&dataset.x, &dataset.y, &config)?,
        "embedded_method" => scoring::embedded_scores(&dataset.x, &dataset.y, &config)?,
        other => anyhow::bail!("unknown strategy key: {}", other),
    };
    Ok(scores)
}

/// Evaluate one dataset variant end to end.
fn evaluate_method(name: &str, dataset: &Dataset) -> Result<MethodEvaluation> {
    log::info!("=== {} ({} features) ===", name, dataset.n_features());

    let split = stratified_split(dataset, TEST_FRACTION, SPLIT_SEED)?;
    let (config, diagnostics) = resolve_overfitting(&split.x_train, &split.y_train, CV_FOLDS)?;

    let trained = train_final(&config, &split.x_train, &split.y_train)?;
    let predictions = trained.predict(&split.x_test);
    let metrics = compute_metrics(&split.y_test, &predictions);
    let cm = confusion_matrix(&split.y_test, &predictions);

    log::info!(
        "{}: accuracy {:.4}, F1 {:.4}, precision {:.4}, recall {:.4}",
        name,
        metrics.accuracy,
        metrics.f1,
        metrics.precision,
        metrics.recall
    );
    log::debug!(
        "\n{}",
        classification_report(&split.y_test, &predictions, &CLASS_LABELS)
    );

    Ok(MethodEvaluation {
        result: MethodResult {
            name: name.to_string(),
            feature_count: dataset.n_features(),
            accuracy: metrics.accuracy,
            f1: metrics.f1,
            training_secs: trained.training_secs,
            regularization_c: diagnostics.detected.then_some(diagnostics.best_c),
        },
        overfit: OverfitSummary {
            method: name.to_string(),
            detected: diagnostics.detected,
            gap: diagnostics.original_gap,
            best_c: Some(diagnostics.best_c),
        },
        confusion: cm,
    })
}

struct MethodEvaluation {
    result: MethodResult,
    overfit: OverfitSummary,
    confusion: newspop::metrics::ConfusionMatrix,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let dataset_path = args.next().unwrap_or_else(|| "processed_dataset.csv".to_string());
    let results_dir = args.next().unwrap_or_else(|| "results".to_string());

    let dataset = Dataset::from_csv(&dataset_path, TARGET_COLUMN)
        .with_context(|| format!("loading {}", dataset_path))?;
    ensure_results_dir(&results_dir)?;

    let top_n = TOP_N.min(dataset.n_features());

    // all-features baseline plus one variant per selection strategy
    let mut evaluations: Vec<(String, MethodEvaluation)> = Vec::new();
    evaluations.push((
        "all_features".to_string(),
        evaluate_method("All features", &dataset)?,
    ));

    for strategy in &STRATEGIES {
        let scores = strategy_scores(strategy.key, &dataset)?;
        let ranking: Vec<RankedFeature> = rank_features(&dataset.feature_names, &scores)?;
        let selected_names = top_features(&ranking, top_n)?;
        let selected = dataset.select_features(&selected_names)?;

        let feature_report = render_feature_report(
            strategy.name,
            strategy.description,
            &ranking,
            top_n,
            &dataset_path,
        );
        write_markdown_report(&feature_report, &results_dir, strategy.report_file)?;
        selected.write_csv(std::path::Path::new(&results_dir).join(strategy.dataset_file))?;

        evaluations.push((
            strategy.key.to_string(),
            evaluate_method(strategy.name, &selected)?,
        ));
    }

    let best_key = evaluations
        .iter()
        .max_by(|(_, a), (_, b)| {
            a.result
                .accuracy
                .partial_cmp(&b.result.accuracy)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(key, _)| key.clone())
        .expect("at least one evaluated method");

    let results: Vec<(String, MethodResult)> = evaluations
        .iter()
        .map(|(key, eval)| (key.clone(), eval.result.clone()))
        .collect();
    let overfitting: Vec<OverfitSummary> = evaluations
        .iter()
        .map(|(_, eval)| eval.overfit.clone())
        .collect();
    let best_confusion = evaluations
        .iter()
        .find(|(key, _)| *key == best_key)
        .map(|(_, eval)| eval.confusion)
        .expect("best method present");

    write_results_csv(&results, &results_dir, "results.csv")?;

    let report = render_markdown_report(
        &results,
        &best_key,
        Some(&best_confusion),
        Some(&overfitting),
    );
    write_markdown_report(&report, &results_dir, "evaluation_report.md")?;

    let dir = std::path::Path::new(&results_dir);
    render_confusion_heatmap(&best_confusion, &CLASS_LABELS, dir.join("confusion_matrix.png"))?;
    render_comparison_bar_chart(
        &results,
        ComparisonMetric::Accuracy,
        dir.join("method_comparison.png"),
    )?;

    log::info!("Evaluation complete; artifacts in {}", results_dir);
    Ok(())
}
