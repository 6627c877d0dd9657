//! Loss functions and output-gradient seeding
//!
//! Loss scalars reconcile shapes first: rank-1 labels or predictions become
//! `[N, 1]` columns, anything above rank 2 is rejected.
//!
//! The initial gradient handed to the output layer's backward pass depends on
//! the output activation, not on the loss kind:
//!
//! | output activation | seeded gradient | backward applies | valid with |
//! |---|---|---|---|
//! | `sigmoid` | `predictions - reshape(labels, predictions.shape)` | `σ'(z)` | binary cross-entropy |
//! | `softmax` | `predictions - labels` | nothing | categorical cross-entropy, one-hot labels |
//!
//! The sigmoid seed is the BCE gradient with respect to `z`, and the output
//! layer's backward pass multiplies it by `σ'(z)` once more. The resulting
//! weight gradient is `Xᵀ((p - y) ⊙ σ'(z)) / N`, a scaled-down descent
//! direction rather than the exact BCE gradient.
//!
//! The softmax seed is passed through unchanged. A softmax output trained with
//! any loss other than categorical cross-entropy receives a gradient that is
//! silently wrong; [`seed_gradient`] does not guard against that pairing.

use crate::error::{NetworkError, Result};
use crate::tensor;
use crate::utils::activations::Activation;
use ndarray::{Array2, ArrayBase, Axis, Data, Dimension};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clipping bound used before taking logarithms.
pub const LOG_EPSILON: f64 = 1e-12;

/// Supported loss functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossFunction {
    /// Mean squared error.
    #[serde(rename = "mse")]
    Mse,
    /// Binary cross-entropy.
    #[serde(rename = "bce")]
    #[default]
    BinaryCrossEntropy,
    /// Categorical cross-entropy over one-hot labels.
    #[serde(rename = "cce")]
    CategoricalCrossEntropy,
}

impl LossFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            LossFunction::Mse => "mse",
            LossFunction::BinaryCrossEntropy => "bce",
            LossFunction::CategoricalCrossEntropy => "cce",
        }
    }

    /// Scalar loss for `labels` against `predictions`.
    pub fn compute<S1, D1, S2, D2>(
        self,
        labels: &ArrayBase<S1, D1>,
        predictions: &ArrayBase<S2, D2>,
    ) -> Result<f64>
    where
        S1: Data<Elem = f64>,
        D1: Dimension,
        S2: Data<Elem = f64>,
        D2: Dimension,
    {
        match self {
            LossFunction::Mse => mse(labels, predictions),
            LossFunction::BinaryCrossEntropy => binary_cross_entropy(labels, predictions),
            LossFunction::CategoricalCrossEntropy => categorical_cross_entropy(labels, predictions),
        }
    }
}

impl FromStr for LossFunction {
    type Err = NetworkError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "mse" => Ok(LossFunction::Mse),
            "bce" => Ok(LossFunction::BinaryCrossEntropy),
            "cce" => Ok(LossFunction::CategoricalCrossEntropy),
            other => Err(NetworkError::UnknownLoss(other.to_string())),
        }
    }
}

impl fmt::Display for LossFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bring labels and predictions to matching rank-2 shapes.
pub fn reconcile_shapes<S1, D1, S2, D2>(
    labels: &ArrayBase<S1, D1>,
    predictions: &ArrayBase<S2, D2>,
) -> Result<(Array2<f64>, Array2<f64>)>
where
    S1: Data<Elem = f64>,
    D1: Dimension,
    S2: Data<Elem = f64>,
    D2: Dimension,
{
    let labels = tensor::to_column(labels, "labels")?;
    let predictions = tensor::to_column(predictions, "predictions")?;
    if labels.dim() != predictions.dim() {
        return Err(NetworkError::ShapeMismatch {
            context: "labels against predictions",
            expected: predictions.shape().to_vec(),
            actual: labels.shape().to_vec(),
        });
    }
    Ok((labels, predictions))
}

/// Mean of `(labels - predictions)²`.
pub fn mse<S1, D1, S2, D2>(
    labels: &ArrayBase<S1, D1>,
    predictions: &ArrayBase<S2, D2>,
) -> Result<f64>
where
    S1: Data<Elem = f64>,
    D1: Dimension,
    S2: Data<Elem = f64>,
    D2: Dimension,
{
    let (labels, predictions) = reconcile_shapes(labels, predictions)?;
    let diff = labels - predictions;
    Ok(mean(&diff.mapv(|d| d * d)))
}

/// `-mean(y·ln(p) + (1-y)·ln(1-p))` with `p` clipped to `[ε, 1-ε]`.
pub fn binary_cross_entropy<S1, D1, S2, D2>(
    labels: &ArrayBase<S1, D1>,
    predictions: &ArrayBase<S2, D2>,
) -> Result<f64>
where
    S1: Data<Elem = f64>,
    D1: Dimension,
    S2: Data<Elem = f64>,
    D2: Dimension,
{
    let (labels, predictions) = reconcile_shapes(labels, predictions)?;
    let p = clip(&predictions);
    let log_p = p.mapv(f64::ln);
    let log_one_minus_p = p.mapv(|v| (1.0 - v).max(LOG_EPSILON).ln());
    let terms = &labels * &log_p + &labels.mapv(|y| 1.0 - y) * &log_one_minus_p;
    Ok(-mean(&terms))
}

/// Mean over rows of `-Σ_j y_j·ln(p_j)` with `p` clipped to `[ε, 1-ε]`.
pub fn categorical_cross_entropy<S1, D1, S2, D2>(
    labels: &ArrayBase<S1, D1>,
    predictions: &ArrayBase<S2, D2>,
) -> Result<f64>
where
    S1: Data<Elem = f64>,
    D1: Dimension,
    S2: Data<Elem = f64>,
    D2: Dimension,
{
    let (labels, predictions) = reconcile_shapes(labels, predictions)?;
    let log_p = clip(&predictions).mapv(f64::ln);
    let sample_losses = (&labels * &log_p).sum_axis(Axis(1)).mapv(|v| -v);
    Ok(sample_losses.mean().unwrap_or(0.0))
}

/// Initial gradient for the output layer.
///
/// # Errors
///
/// `UnsupportedOutputActivation` for any output activation other than
/// sigmoid or softmax; `ShapeMismatch` if the labels cannot take the
/// predictions' shape.
pub fn seed_gradient<S, D>(
    output_activation: Activation,
    labels: &ArrayBase<S, D>,
    predictions: &Array2<f64>,
) -> Result<Array2<f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    match output_activation {
        Activation::Sigmoid => {
            let labels = tensor::reshape_to(labels, predictions.dim())?;
            Ok(predictions - &labels)
        }
        Activation::Softmax => {
            if labels.shape() != predictions.shape() {
                return Err(NetworkError::ShapeMismatch {
                    context: "one-hot labels",
                    expected: predictions.shape().to_vec(),
                    actual: labels.shape().to_vec(),
                });
            }
            let labels = tensor::to_column(labels, "labels")?;
            Ok(predictions - &labels)
        }
        other => Err(NetworkError::UnsupportedOutputActivation(other)),
    }
}

fn clip(values: &Array2<f64>) -> Array2<f64> {
    values.mapv(|v| v.clamp(LOG_EPSILON, 1.0 - LOG_EPSILON))
}

fn mean(values: &Array2<f64>) -> f64 {
    values.mean().unwrap_or(0.0)
}
