//! PNG chart rendering: confusion-matrix heatmap and method comparison.

use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::metrics::ConfusionMatrix;
use crate::report::report::MethodResult;

/// Metric plotted by the comparison bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMetric {
    Accuracy,
    F1,
}

impl ComparisonMetric {
    fn label(&self) -> &'static str {
        match self {
            ComparisonMetric::Accuracy => "Accuracy",
            ComparisonMetric::F1 => "F1 score",
        }
    }

    fn value(&self, result: &MethodResult) -> f64 {
        match self {
            ComparisonMetric::Accuracy => result.accuracy,
            ComparisonMetric::F1 => result.f1,
        }
    }
}

/// Bar colors cycled across methods.
const BAR_COLORS: [RGBColor; 4] = [
    RGBColor(46, 204, 113),
    RGBColor(52, 152, 219),
    RGBColor(155, 89, 182),
    RGBColor(231, 76, 60),
];

/// Draw a 2x2 confusion-matrix heatmap. Cells are shaded by count and
/// annotated with the quadrant name and value; rows are actual classes,
/// columns predicted.
pub fn render_confusion_heatmap<P: AsRef<Path>>(
    cm: &ConfusionMatrix,
    class_labels: &[&str; 2],
    path: P,
) -> Result<()> {
    let width: i32 = 820;
    let height: i32 = 760;
    let margin_left: i32 = 180;
    let margin_top: i32 = 120;
    let margin_right: i32 = 40;
    let margin_bottom: i32 = 40;

    let root = BitMapBackend::new(path.as_ref(), (width as u32, height as u32))
        .into_drawing_area();
    root.fill(&WHITE)?;

    let centered = |size: i32| {
        ("sans-serif", size)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center))
    };

    root.draw(&Text::new(
        "Confusion Matrix",
        (width / 2, 40),
        centered(32),
    ))?;

    let grid_width = width - margin_left - margin_right;
    let grid_height = height - margin_top - margin_bottom;
    let cell_width = grid_width / 2;
    let cell_height = grid_height / 2;

    let counts = [cm.tn, cm.fp, cm.fn_, cm.tp];
    let quadrants = ["TN", "FP", "FN", "TP"];
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1) as f64;

    for (idx, (&count, &quadrant)) in counts.iter().zip(quadrants.iter()).enumerate() {
        let row = (idx / 2) as i32;
        let col = (idx % 2) as i32;
        let x0 = margin_left + col * cell_width;
        let y0 = margin_top + row * cell_height;
        let x1 = x0 + cell_width;
        let y1 = y0 + cell_height;

        let intensity = 0.1 + 0.75 * (count as f64 / max_count);
        root.draw(&Rectangle::new(
            [(x0, y0), (x1, y1)],
            BLUE.mix(intensity).filled(),
        ))?;
        root.draw(&Rectangle::new([(x0, y0), (x1, y1)], &BLACK))?;

        let cx = (x0 + x1) / 2;
        let cy = (y0 + y1) / 2;
        root.draw(&Text::new(quadrant, (cx, cy - 24), centered(26)))?;
        root.draw(&Text::new(count.to_string(), (cx, cy + 20), centered(36)))?;
    }

    // column headers (predicted) and row headers (actual)
    root.draw(&Text::new(
        "Predicted",
        (margin_left + grid_width / 2, margin_top - 70),
        centered(24),
    ))?;
    for (col, label) in class_labels.iter().enumerate() {
        root.draw(&Text::new(
            *label,
            (
                margin_left + col as i32 * cell_width + cell_width / 2,
                margin_top - 30,
            ),
            centered(20),
        ))?;
    }
    root.draw(&Text::new(
        "Actual",
        (60, margin_top + grid_height / 2),
        centered(24),
    ))?;
    for (row, label) in class_labels.iter().enumerate() {
        root.draw(&Text::new(
            *label,
            (
                margin_left - 70,
                margin_top + row as i32 * cell_height + cell_height / 2,
            ),
            centered(20),
        ))?;
    }

    root.present()?;
    log::info!("Confusion-matrix heatmap saved: {}", path.as_ref().display());
    Ok(())
}

/// Draw a bar chart comparing one metric across methods, with the value
/// printed above each bar.
pub fn render_comparison_bar_chart<P: AsRef<Path>>(
    results: &[(String, MethodResult)],
    metric: ComparisonMetric,
    path: P,
) -> Result<()> {
    let names: Vec<String> = results.iter().map(|(_, r)| r.name.clone()).collect();
    let values: Vec<f64> = results.iter().map(|(_, r)| metric.value(r)).collect();
    let n = values.len();
    anyhow::ensure!(n > 0, "no methods to plot");

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let y_lo = (min - 0.05).max(0.0);
    let y_hi = (max + 0.05).min(1.05);

    let root = BitMapBackend::new(path.as_ref(), (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let title = format!("Method Comparison - {}", metric.label());
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_lo..y_hi)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| {
            let idx = x.round();
            if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < names.len() {
                names[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .y_desc(metric.label())
        .label_style(("sans-serif", 16))
        .draw()?;

    chart.draw_series(values.iter().enumerate().map(|(i, &v)| {
        let color = BAR_COLORS[i % BAR_COLORS.len()];
        Rectangle::new([(i as f64 - 0.3, y_lo), (i as f64 + 0.3, v)], color.filled())
    }))?;

    let value_style = ("sans-serif", 16)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(values.iter().enumerate().map(|(i, &v)| {
        Text::new(format!("{:.4}", v), (i as f64, v), value_style.clone())
    }))?;

    root.present()?;
    log::info!("Comparison chart saved: {}", path.as_ref().display());
    Ok(())
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
                    accuracy: 0.65,
                    f1: 0.64,
                    training_secs: 0.7,
                    regularization_c: None,
                },
            ),
            (
                "filter_method".to_string(),
                MethodResult {
                    name: "Filter (Pearson)".to_string(),
                    feature_count: 15,
                    accuracy: 0.66,
                    f1: 0.66,
                    training_secs: 0.2,
                    regularization_c: Some(0.1),
                },
            ),
        ]
    }

    #[test]
    fn heatmap_writes_a_png_file() {
        let dir = std::env::temp_dir().join("newspop_plots_heatmap");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("confusion_matrix.png");

        let cm = ConfusionMatrix {
            tn: 40,
            fp: 10,
            fn_: 12,
            tp: 38,
        };
        render_confusion_heatmap(&cm, &["Not Popular (0)", "Popular (1)"], &path).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn bar_chart_writes_a_png_file() {
        let dir = std::env::temp_dir().join("newspop_plots_bars");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("method_comparison.png");

        render_comparison_bar_chart(&sample_results(), ComparisonMetric::Accuracy, &path)
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn bar_chart_rejects_empty_input() {
        let dir = std::env::temp_dir().join("newspop_plots_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("empty.png");
        assert!(render_comparison_bar_chart(&[], ComparisonMetric::F1, &path).is_err());
    }
}
