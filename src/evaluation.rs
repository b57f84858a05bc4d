//! Model evaluation: accuracy, macro precision/recall, and the per-sample report

use crate::error::{DetectorError, Result};
use crate::training::Classifier;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gender label, fixed binary encoding: 1 = Female, 0 = Male
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl From<u8> for Gender {
    fn from(label: u8) -> Self {
        if label == 1 {
            Gender::Female
        } else {
            Gender::Male
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
        }
    }
}

/// Precision/recall for a single class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: Gender,
    pub precision: f64,
    pub recall: f64,
    /// Number of test samples with this actual label
    pub support: usize,
}

/// Actual vs. predicted outcome for one test sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleOutcome {
    pub filename: String,
    pub actual: Gender,
    pub predicted: Gender,
}

/// Structured evaluation result for a held-out partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Fraction of exact matches
    pub accuracy: f64,
    /// Macro-averaged precision (each class weighted equally)
    pub precision: f64,
    /// Macro-averaged recall (each class weighted equally)
    pub recall: f64,
    /// Per-class breakdown, Male then Female
    pub per_class: Vec<ClassMetrics>,
    /// One outcome per test sample, in test order
    pub samples: Vec<SampleOutcome>,
    /// Raw actual labels, in test order
    pub actual: Vec<u8>,
    /// Raw predicted labels, in test order
    pub predicted: Vec<u8>,
}

impl Evaluation {
    /// Compute metrics from parallel actual/predicted label vectors.
    ///
    /// Labels and predictions share the same `u8` encoding; no coercion
    /// happens on either side.
    pub fn compute(
        y_true: &Array1<u8>,
        y_pred: &Array1<u8>,
        filenames: &[String],
    ) -> Result<Self> {
        let n = y_true.len();
        if y_pred.len() != n || filenames.len() != n {
            return Err(DetectorError::ShapeError {
                expected: format!("{} predictions and {} filenames", n, n),
                actual: format!("{} predictions and {} filenames", y_pred.len(), filenames.len()),
            });
        }
        if n == 0 {
            return Err(DetectorError::ValidationError(
                "cannot evaluate an empty test partition".to_string(),
            ));
        }

        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| t == p)
            .count();
        let accuracy = correct as f64 / n as f64;

        let per_class: Vec<ClassMetrics> = [0u8, 1u8]
            .iter()
            .map(|&class| {
                let mut tp = 0usize;
                let mut fp = 0usize;
                let mut fn_ = 0usize;
                let mut support = 0usize;
                for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
                    if t == class {
                        support += 1;
                        if p == class {
                            tp += 1;
                        } else {
                            fn_ += 1;
                        }
                    } else if p == class {
                        fp += 1;
                    }
                }
                // Empty denominator contributes 0.0 to the macro average
                let precision = if tp + fp > 0 {
                    tp as f64 / (tp + fp) as f64
                } else {
                    0.0
                };
                let recall = if tp + fn_ > 0 {
                    tp as f64 / (tp + fn_) as f64
                } else {
                    0.0
                };
                ClassMetrics {
                    label: Gender::from(class),
                    precision,
                    recall,
                    support,
                }
            })
            .collect();

        let precision = per_class.iter().map(|c| c.precision).sum::<f64>() / per_class.len() as f64;
        let recall = per_class.iter().map(|c| c.recall).sum::<f64>() / per_class.len() as f64;

        let samples = filenames
            .iter()
            .zip(y_true.iter().zip(y_pred.iter()))
            .map(|(filename, (&actual, &predicted))| SampleOutcome {
                filename: filename.clone(),
                actual: Gender::from(actual),
                predicted: Gender::from(predicted),
            })
            .collect();

        Ok(Self {
            accuracy,
            precision,
            recall,
            per_class,
            samples,
            actual: y_true.to_vec(),
            predicted: y_pred.to_vec(),
        })
    }

    /// Render the human-readable diagnostic report
    pub fn report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("Actual labels: {:?}\n", self.actual));
        report.push_str(&format!("Predictions: {:?}\n", self.predicted));
        report.push_str(&format!("Accuracy:  {:.4}\n", self.accuracy));
        report.push_str(&format!("Precision: {:.4} (macro)\n", self.precision));
        report.push_str(&format!("Recall:    {:.4} (macro)\n", self.recall));
        for sample in &self.samples {
            report.push_str(&format!(
                "File: {}, Actual: {}, Predicted: {}\n",
                sample.filename, sample.actual, sample.predicted
            ));
        }
        report
    }
}

/// Evaluate a fitted classifier on a held-out partition.
///
/// Predicts via the [`Classifier`] trait and returns the structured
/// [`Evaluation`]; nothing is printed here.
pub fn evaluate_model<C: Classifier + ?Sized>(
    model: &C,
    x_test: &Array2<f64>,
    y_test: &Array1<u8>,
    filenames_test: &[String],
) -> Result<Evaluation> {
    let predictions = model.predict(x_test)?;
    Evaluation::compute(y_test, &predictions, filenames_test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Stub classifier that replays canned predictions
    struct StubModel {
        predictions: Vec<u8>,
    }

    impl Classifier for StubModel {
        fn predict(&self, _x: &Array2<f64>) -> Result<Array1<u8>> {
            Ok(Array1::from_vec(self.predictions.clone()))
        }
    }

    #[test]
    fn test_accuracy_exact_fraction() {
        let y_true = array![1, 0, 1, 1, 0, 1, 0, 0];
        let y_pred = array![1, 0, 1, 0, 0, 1, 1, 0];
        let filenames: Vec<String> = (0..8).map(|i| format!("f{}", i)).collect();

        let eval = Evaluation::compute(&y_true, &y_pred, &filenames).unwrap();
        assert!((eval.accuracy - 6.0 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_macro_metrics_are_unweighted_class_means() {
        let y_true = array![1, 0, 1];
        let y_pred = array![1, 0, 0];
        let filenames: Vec<String> = (0..3).map(|i| format!("f{}", i)).collect();

        let eval = Evaluation::compute(&y_true, &y_pred, &filenames).unwrap();

        // Male: tp=1 fp=1 -> p=0.5; tp=1 fn=0 -> r=1.0
        // Female: tp=1 fp=0 -> p=1.0; tp=1 fn=1 -> r=0.5
        assert!((eval.per_class[0].precision - 0.5).abs() < 1e-12);
        assert!((eval.per_class[0].recall - 1.0).abs() < 1e-12);
        assert!((eval.per_class[1].precision - 1.0).abs() < 1e-12);
        assert!((eval.per_class[1].recall - 0.5).abs() < 1e-12);
        assert!((eval.precision - 0.75).abs() < 1e-12);
        assert!((eval.recall - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_stub_model_report_lines() {
        let model = StubModel {
            predictions: vec![1, 0, 0],
        };
        let x = array![[0.0], [0.0], [0.0]];
        let y = array![1, 0, 1];
        let filenames = vec!["a.wav".to_string(), "b.wav".to_string(), "c.wav".to_string()];

        let eval = evaluate_model(&model, &x, &y, &filenames).unwrap();
        assert!((eval.accuracy - 2.0 / 3.0).abs() < 1e-12);

        let report = eval.report();
        assert!(report.contains("File: a.wav, Actual: Female, Predicted: Female"));
        assert!(report.contains("File: b.wav, Actual: Male, Predicted: Male"));
        assert!(report.contains("File: c.wav, Actual: Female, Predicted: Male"));
    }

    #[test]
    fn test_single_class_split_yields_zero_for_absent_class() {
        let y_true = array![1, 1, 1];
        let y_pred = array![1, 1, 1];
        let filenames: Vec<String> = (0..3).map(|i| format!("f{}", i)).collect();

        let eval = Evaluation::compute(&y_true, &y_pred, &filenames).unwrap();

        // No Male samples and no Male predictions: both denominators empty
        assert_eq!(eval.per_class[0].precision, 0.0);
        assert_eq!(eval.per_class[0].recall, 0.0);
        assert_eq!(eval.per_class[0].support, 0);
        assert!((eval.precision - 0.5).abs() < 1e-12);
        assert_eq!(eval.accuracy, 1.0);
    }

    #[test]
    fn test_gender_mapping() {
        assert_eq!(Gender::from(1).to_string(), "Female");
        assert_eq!(Gender::from(0).to_string(), "Male");
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let y_true = array![1, 0];
        let y_pred = array![1];
        let result = Evaluation::compute(&y_true, &y_pred, &["f0".to_string(), "f1".to_string()]);
        assert!(matches!(result, Err(DetectorError::ShapeError { .. })));
    }
}
