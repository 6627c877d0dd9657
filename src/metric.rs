//! Evaluation metrics
//!
//! Stateless functions over `(labels, predictions)`. Labels are reshaped to
//! the predictions' shape first, so `[N]` and `[N, 1]` label vectors both
//! work against a `[N, 1]` prediction column.
//!
//! Precision, recall and F1 are binary metrics: predictions are thresholded
//! at 0.5 and labels are expected to be 0/1.

use crate::error::{NetworkError, Result};
use crate::tensor;
use ndarray::{Array2, ArrayBase, Data, Dimension};
use std::fmt;
use std::str::FromStr;

/// Decision threshold for binary predictions.
pub const BINARY_THRESHOLD: f64 = 0.5;

/// Named metric, selectable from configuration or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Accuracy,
    Precision,
    Recall,
    F1,
    Mse,
    Mae,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Accuracy,
        Metric::Precision,
        Metric::Recall,
        Metric::F1,
        Metric::Mse,
        Metric::Mae,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::Precision => "precision",
            Metric::Recall => "recall",
            Metric::F1 => "f1",
            Metric::Mse => "mse",
            Metric::Mae => "mae",
        }
    }

    pub fn compute<S1, D1>(self, labels: &ArrayBase<S1, D1>, predictions: &Array2<f64>) -> Result<f64>
    where
        S1: Data<Elem = f64>,
        D1: Dimension,
    {
        match self {
            Metric::Accuracy => accuracy(labels, predictions),
            Metric::Precision => precision(labels, predictions),
            Metric::Recall => recall(labels, predictions),
            Metric::F1 => f1(labels, predictions),
            Metric::Mse => mse(labels, predictions),
            Metric::Mae => mae(labels, predictions),
        }
    }
}

impl FromStr for Metric {
    type Err = NetworkError;

    fn from_str(name: &str) -> Result<Self> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.name() == name)
            .ok_or_else(|| NetworkError::UnknownMetric(name.to_string()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reshape `labels` to the predictions' shape.
///
/// # Errors
///
/// `ShapeMismatch` when the element counts differ.
pub fn align_shapes<S, D>(labels: &ArrayBase<S, D>, predictions: &Array2<f64>) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    tensor::reshape_to(labels, predictions.dim())
}

/// Fraction of correct predictions.
///
/// A single output column is thresholded at 0.5 and compared with the
/// labels. With several columns, a row is correct when its argmax matches
/// the label row's argmax.
pub fn accuracy<S, D>(labels: &ArrayBase<S, D>, predictions: &Array2<f64>) -> Result<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let labels = align_shapes(labels, predictions)?;
    if predictions.nrows() == 0 {
        return Ok(0.0);
    }

    if predictions.ncols() == 1 {
        let predicted = tensor::greater(predictions, BINARY_THRESHOLD);
        let correct = predicted
            .iter()
            .zip(labels.iter())
            .filter(|(p, y)| (*p - *y).abs() <= 1e-8)
            .count();
        Ok(correct as f64 / predictions.len() as f64)
    } else {
        let predicted = tensor::argmax_rows(predictions);
        let expected = tensor::argmax_rows(&labels);
        let correct = predicted
            .iter()
            .zip(expected.iter())
            .filter(|(p, y)| p == y)
            .count();
        Ok(correct as f64 / predictions.nrows() as f64)
    }
}

/// `tp / (tp + fp)`, or 0 when nothing was predicted positive.
pub fn precision<S, D>(labels: &ArrayBase<S, D>, predictions: &Array2<f64>) -> Result<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let counts = BinaryCounts::new(labels, predictions)?;
    Ok(ratio(counts.true_positives, counts.predicted_positives))
}

/// `tp / (tp + fn)`, or 0 when there are no positive labels.
pub fn recall<S, D>(labels: &ArrayBase<S, D>, predictions: &Array2<f64>) -> Result<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let counts = BinaryCounts::new(labels, predictions)?;
    Ok(ratio(counts.true_positives, counts.actual_positives))
}

/// Harmonic mean of precision and recall, or 0 when both are 0.
pub fn f1<S, D>(labels: &ArrayBase<S, D>, predictions: &Array2<f64>) -> Result<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let p = precision(labels, predictions)?;
    let r = recall(labels, predictions)?;
    if p + r > 0.0 {
        Ok(2.0 * p * r / (p + r))
    } else {
        Ok(0.0)
    }
}

/// Mean squared error.
pub fn mse<S, D>(labels: &ArrayBase<S, D>, predictions: &Array2<f64>) -> Result<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let diff = align_shapes(labels, predictions)? - predictions;
    Ok(diff.mapv(|d| d * d).mean().unwrap_or(0.0))
}

/// Mean absolute error.
pub fn mae<S, D>(labels: &ArrayBase<S, D>, predictions: &Array2<f64>) -> Result<f64>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let diff = align_shapes(labels, predictions)? - predictions;
    Ok(diff.mapv(f64::abs).mean().unwrap_or(0.0))
}

/// One-hot encoding of each row's maximum.
pub fn argmax(values: &Array2<f64>) -> Array2<f64> {
    tensor::argmax_one_hot(values)
}

struct BinaryCounts {
    true_positives: f64,
    predicted_positives: f64,
    actual_positives: f64,
}

impl BinaryCounts {
    fn new<S, D>(labels: &ArrayBase<S, D>, predictions: &Array2<f64>) -> Result<Self>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let labels = align_shapes(labels, predictions)?;
        let predicted = tensor::greater(predictions, BINARY_THRESHOLD);
        Ok(Self {
            true_positives: (&predicted * &labels).sum(),
            predicted_positives: predicted.sum(),
            actual_positives: labels.sum(),
        })
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
