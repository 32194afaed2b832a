// src/classifier/metrics.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision, recall, F1 and support over a held-out set. Ratios
/// with a zero denominator are reported as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ClassificationReport {
    /// Labels are the sorted union of both sides.
    pub fn from_predictions(truth: &[String], predicted: &[String]) -> Self {
        let labels: BTreeSet<&str> = truth
            .iter()
            .chain(predicted)
            .map(String::as_str)
            .collect();
        let pairs: Vec<(&str, &str)> = truth
            .iter()
            .map(String::as_str)
            .zip(predicted.iter().map(String::as_str))
            .collect();

        let classes: Vec<ClassMetrics> = labels
            .into_iter()
            .map(|label| {
                let tp = pairs.iter().filter(|(t, p)| *t == label && *p == label).count();
                let predicted_count = pairs.iter().filter(|(_, p)| *p == label).count();
                let support = pairs.iter().filter(|(t, _)| *t == label).count();

                let precision = ratio(tp, predicted_count);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let total = pairs.len();
        let correct = pairs.iter().filter(|(t, p)| t == p).count();
        let n = classes.len().max(1) as f64;

        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
            support: total,
        };
        let weighted = |metric: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes.iter().map(|c| metric(c) * c.support as f64).sum::<f64>() / total as f64
            }
        };
        let weighted_avg = AverageMetrics {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
            support: total,
        };

        Self {
            accuracy: ratio(correct, total),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn to_table(&self) -> String {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .max()
            .unwrap_or(0)
            .max("weighted avg".len());

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>width$}  {:>9}  {:>9}  {:>9}  {:>9}",
            "", "precision", "recall", "f1-score", "support"
        );
        for c in &self.classes {
            let _ = writeln!(
                out,
                "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:>width$}  {:>9}  {:>9}  {:>9.2}  {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        );
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            let _ = writeln!(
                out,
                "{:>width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
                name, avg.precision, avg.recall, avg.f1, avg.support
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_perfect_predictions() {
        let truth = labels(&["a", "b", "a"]);
        let report = ClassificationReport::from_predictions(&truth, &truth);
        assert_eq!(report.accuracy, 1.0);
        assert!(report.classes.iter().all(|c| c.f1 == 1.0));
        assert_eq!(report.macro_avg.support, 3);
    }

    #[test]
    fn test_mixed_predictions() {
        let truth = labels(&["a", "a", "b", "b"]);
        let predicted = labels(&["a", "b", "b", "b"]);
        let report = ClassificationReport::from_predictions(&truth, &predicted);

        let a = &report.classes[0];
        assert_eq!(a.label, "a");
        assert_eq!(a.precision, 1.0);
        assert_eq!(a.recall, 0.5);
        assert_eq!(a.support, 2);

        let b = &report.classes[1];
        assert!((b.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(b.recall, 1.0);
        assert_eq!(report.accuracy, 0.75);
        assert!((report.weighted_avg.recall - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_never_predicted_class_has_zero_precision() {
        let truth = labels(&["a", "b"]);
        let predicted = labels(&["a", "a"]);
        let report = ClassificationReport::from_predictions(&truth, &predicted);
        let b = report.classes.iter().find(|c| c.label == "b").unwrap();
        assert_eq!(b.precision, 0.0);
        assert_eq!(b.f1, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let report = ClassificationReport::from_predictions(&[], &[]);
        assert!(report.classes.is_empty());
        assert_eq!(report.accuracy, 0.0);
        assert!(report.to_table().contains("accuracy"));
    }
}
