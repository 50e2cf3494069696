//! Classification metrics for binary 0/1 predictions.
//!
//! Precision, recall, and F1 are computed one-vs-rest per class and
//! combined weighted by class frequency. A class with no predicted (or no
//! true) members contributes 0 for the undefined metric, with a warning,
//! matching the usual zero-division convention.

use ndarray::Array1;

/// Scalar metrics bundle, all values in [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct Metrics {
    pub accuracy: f64,
    /// Class-frequency-weighted F1.
    pub f1: f64,
    /// Class-frequency-weighted precision.
    pub precision: f64,
    /// Class-frequency-weighted recall.
    pub recall: f64,
}

/// 2x2 confusion matrix. Rows are true classes, columns predicted,
/// class order [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }
}

/// Count TN/FP/FN/TP for 0/1 labels.
pub fn confusion_matrix(y_true: &Array1<i32>, y_pred: &Array1<i32>) -> ConfusionMatrix {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "prediction and truth lengths differ"
    );

    let mut cm = ConfusionMatrix {
        tn: 0,
        fp: 0,
        fn_: 0,
        tp: 0,
    };
    for (&truth, &pred) in y_true.iter().zip(y_pred.iter()) {
        match (truth, pred) {
            (0, 0) => cm.tn += 1,
            (0, 1) => cm.fp += 1,
            (1, 0) => cm.fn_ += 1,
            (1, 1) => cm.tp += 1,
            _ => panic!("labels must be 0 or 1, got ({}, {})", truth, pred),
        }
    }
    cm
}

struct ClassStats {
    precision: f64,
    recall: f64,
    f1: f64,
    support: usize,
}

fn per_class_stats(y_true: &Array1<i32>, y_pred: &Array1<i32>, class: i32) -> ClassStats {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    let mut support = 0usize;

    for (&truth, &pred) in y_true.iter().zip(y_pred.iter()) {
        if truth == class {
            support += 1;
            if pred == class {
                tp += 1;
            } else {
                fn_ += 1;
            }
        } else if pred == class {
            fp += 1;
        }
    }

    let precision = if tp + fp > 0 {
        tp as f64 / (tp + fp) as f64
    } else {
        log::warn!("no predictions for class {}; precision set to 0", class);
        0.0
    };
    let recall = if tp + fn_ > 0 {
        tp as f64 / (tp + fn_) as f64
    } else {
        log::warn!("no true samples for class {}; recall set to 0", class);
        0.0
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassStats {
        precision,
        recall,
        f1,
        support,
    }
}

/// Accuracy plus weighted F1/precision/recall over classes [0, 1].
pub fn compute_metrics(y_true: &Array1<i32>, y_pred: &Array1<i32>) -> Metrics {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "prediction and truth lengths differ"
    );
    assert!(!y_true.is_empty(), "cannot score an empty prediction set");

    let n = y_true.len() as f64;
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    let accuracy = correct as f64 / n;

    let mut precision = 0.0;
    let mut recall = 0.0;
    let mut f1 = 0.0;
    for class in [0, 1] {
        let stats = per_class_stats(y_true, y_pred, class);
        let weight = stats.support as f64 / n;
        precision += weight * stats.precision;
        recall += weight * stats.recall;
        f1 += weight * stats.f1;
    }

    Metrics {
        accuracy,
        f1,
        precision,
        recall,
    }
}

/// Per-class precision/recall/F1/support as a plain text block.
pub fn classification_report(
    y_true: &Array1<i32>,
    y_pred: &Array1<i32>,
    class_labels: &[&str; 2],
) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{:<18} {:>9} {:>9} {:>9} {:>9}",
        "", "precision", "recall", "f1-score", "support"
    ));

    for (class, label) in [0, 1].into_iter().zip(class_labels.iter()) {
        let stats = per_class_stats(y_true, y_pred, class);
        lines.push(format!(
            "{:<18} {:>9.4} {:>9.4} {:>9.4} {:>9}",
            label, stats.precision, stats.recall, stats.f1, stats.support
        ));
    }

    let metrics = compute_metrics(y_true, y_pred);
    lines.push(String::new());
    lines.push(format!(
        "{:<18} {:>9.4} ({} samples)",
        "accuracy",
        metrics.accuracy,
        y_true.len()
    ));

    lines.join("\n")
}
