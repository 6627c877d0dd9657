//! Activation functions for neural networks
//!
//! This module maps an activation tag to its elementwise transform and its
//! derivative with respect to the pre-activation `z`:
//! - ReLU and Leaky ReLU (alpha = 0.01) for hidden layers
//! - Tanh and Sigmoid
//! - Softmax (row-wise) for multi-class output layers
//! - Linear (identity) for regression outputs
//!
//! Layers carry an [`Activation`] tag rather than one type per activation.
//! The string-keyed [`apply`] and [`derivative`] entry points parse the tag
//! first and fail with [`NetworkError::UnknownActivation`] on anything else.

use crate::error::{NetworkError, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Slope of Leaky ReLU for negative inputs.
pub const LEAKY_RELU_ALPHA: f64 = 0.01;

/// Activation tag attached to every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    LeakyRelu,
    Tanh,
    Sigmoid,
    Softmax,
    Linear,
}

impl Activation {
    /// Every supported activation, in tag order.
    pub const ALL: [Activation; 6] = [
        Activation::Relu,
        Activation::LeakyRelu,
        Activation::Tanh,
        Activation::Sigmoid,
        Activation::Softmax,
        Activation::Linear,
    ];

    /// The persisted string tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Activation::Relu => "relu",
            Activation::LeakyRelu => "leaky_relu",
            Activation::Tanh => "tanh",
            Activation::Sigmoid => "sigmoid",
            Activation::Softmax => "softmax",
            Activation::Linear => "linear",
        }
    }

    /// Apply the activation to a batch of pre-activations.
    pub fn apply(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| v.max(0.0)),
            Activation::LeakyRelu => z.mapv(|v| if v > 0.0 { v } else { LEAKY_RELU_ALPHA * v }),
            Activation::Tanh => z.mapv(f64::tanh),
            Activation::Sigmoid => z.mapv(sigmoid),
            Activation::Softmax => softmax_rows(z),
            Activation::Linear => z.clone(),
        }
    }

    /// Elementwise derivative of the activation, evaluated at `z`.
    ///
    /// For softmax this is the Jacobian diagonal `s * (1 - s)`. Layers never
    /// use it during backward; see [`crate::layers::DenseLayer::backward`].
    pub fn derivative(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::LeakyRelu => z.mapv(|v| if v > 0.0 { 1.0 } else { LEAKY_RELU_ALPHA }),
            Activation::Tanh => z.mapv(|v| {
                let t = v.tanh();
                1.0 - t * t
            }),
            Activation::Sigmoid => z.mapv(|v| {
                let s = sigmoid(v);
                s * (1.0 - s)
            }),
            Activation::Softmax => softmax_rows(z).mapv(|s| s * (1.0 - s)),
            Activation::Linear => Array2::ones(z.raw_dim()),
        }
    }
}

impl FromStr for Activation {
    type Err = NetworkError;

    fn from_str(tag: &str) -> Result<Self> {
        Activation::ALL
            .into_iter()
            .find(|activation| activation.as_str() == tag)
            .ok_or_else(|| NetworkError::UnknownActivation(tag.to_string()))
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply the activation named by `tag`.
pub fn apply(z: &Array2<f64>, tag: &str) -> Result<Array2<f64>> {
    Ok(tag.parse::<Activation>()?.apply(z))
}

/// Derivative of the activation named by `tag`, evaluated at `z`.
pub fn derivative(z: &Array2<f64>, tag: &str) -> Result<Array2<f64>> {
    Ok(tag.parse::<Activation>()?.derivative(z))
}

/// Logistic sigmoid: 1 / (1 + exp(-x)).
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Row-wise softmax.
///
/// Subtracts the row maximum before exponentiating so large logits do not
/// overflow.
pub fn softmax_rows(z: &Array2<f64>) -> Array2<f64> {
    let mut out = z.clone();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let max_value = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        row.mapv_inplace(|v| (v - max_value).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_sigmoid_zero() {
        assert!((sigmoid(0.0) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_sigmoid_derivative_at_zero() {
        let d = Activation::Sigmoid.derivative(&arr2(&[[0.0]]));
        assert!((d[[0, 0]] - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_relu_mixed() {
        let out = Activation::Relu.apply(&arr2(&[[-2.0, -1.0, 0.0, 1.0, 2.0]]));
        assert_eq!(out, arr2(&[[0.0, 0.0, 0.0, 1.0, 2.0]]));
    }

    #[test]
    fn test_leaky_relu_keeps_small_slope() {
        let out = Activation::LeakyRelu.apply(&arr2(&[[-2.0, 3.0]]));
        assert!((out[[0, 0]] + 0.02).abs() < EPSILON);
        assert_eq!(out[[0, 1]], 3.0);
    }

    #[test]
    fn test_linear_derivative_is_ones() {
        let z = arr2(&[[-5.0, 0.0], [2.5, 7.0]]);
        assert_eq!(Activation::Linear.derivative(&z), Array2::<f64>::ones((2, 2)));
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let out = softmax_rows(&arr2(&[[1.0, 2.0, 3.0], [1000.0, 1001.0, 1002.0]]));
        for row in out.outer_iter() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
            assert!(row.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_tag_roundtrip() {
        for activation in Activation::ALL {
            assert_eq!(activation.as_str().parse::<Activation>().unwrap(), activation);
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let z = arr2(&[[1.0]]);
        assert!(matches!(
            apply(&z, "swish"),
            Err(NetworkError::UnknownActivation(tag)) if tag == "swish"
        ));
        assert!(derivative(&z, "gelu").is_err());
    }
}
