//! Layer trait definitions
//!
//! `Layer` is the forward/backward contract the network drives. `Parameters`
//! is the narrower view the optimizer needs: a stable id, the current
//! (weights, bias) pair, and the gradients cached by the last backward pass.

use crate::error::Result;
use crate::utils::activations::Activation;
use ndarray::{Array1, Array2, ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable per-layer identifier, assigned positionally when a network is
/// assembled. Optimizer state is keyed by it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub usize);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trainable parameters of a layer, as seen by an optimizer.
pub trait Parameters {
    /// Identifier used to key per-layer optimizer state.
    fn id(&self) -> LayerId;

    /// Current weights `[input_size, output_size]` and bias `[output_size]`.
    fn params(&self) -> (&Array2<f64>, &Array1<f64>);

    /// Replace weights and bias as one pair.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if either shape differs from the current one.
    fn set_params(&mut self, weights: Array2<f64>, bias: Array1<f64>) -> Result<()>;

    /// Gradients `(dW, dB)` cached by the last backward pass, if any.
    fn gradients(&self) -> Option<(&Array2<f64>, &Array1<f64>)>;
}

/// Core trait for neural network layers.
///
/// # Caching contract
///
/// `forward` caches its input, pre-activation and output; `backward` consumes
/// those caches and must follow a `forward` on the same batch. Calling
/// `backward` twice without an intervening `forward` reuses stale caches and
/// is a caller error.
pub trait Layer: Parameters {
    /// Forward propagation for a batch `[N, input_size]` or a single sample
    /// `[input_size]` (treated as a batch of one). Returns `[N, output_size]`.
    fn forward<S, D>(&mut self, input: &ArrayBase<S, D>) -> Result<Array2<f64>>
    where
        S: Data<Elem = f64>,
        D: Dimension;

    /// Backward propagation given `dL/d(output)` of shape `[N, output_size]`.
    ///
    /// Caches `(dW, dB)` for the optimizer and returns `dL/d(input)` of shape
    /// `[N, input_size]`.
    fn backward(&mut self, grad_output: &Array2<f64>) -> Result<Array2<f64>>;

    /// Activation tag applied after the affine transform.
    fn activation(&self) -> Activation;

    /// Expected number of input features per sample.
    fn input_size(&self) -> usize;

    /// Number of output features per sample.
    fn output_size(&self) -> usize;

    /// Total count of weights and biases.
    fn parameter_count(&self) -> usize {
        self.input_size() * self.output_size() + self.output_size()
    }
}
