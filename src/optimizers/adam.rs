//! Adam (Adaptive Moment Estimation) optimizer implementation
//!
//! This module provides the Adam optimizer, which combines momentum and
//! adaptive learning rates with bias correction.

use crate::error::{NetworkError, Result};
use crate::layers::{LayerId, Parameters};
use crate::optimizers::Optimizer;
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// First and second moment estimates for one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Moments {
    pub m_weights: Array2<f64>,
    pub v_weights: Array2<f64>,
    pub m_bias: Array1<f64>,
    pub v_bias: Array1<f64>,
}

impl Moments {
    fn zeros_like(grad_weights: &Array2<f64>, grad_bias: &Array1<f64>) -> Self {
        Self {
            m_weights: Array2::zeros(grad_weights.raw_dim()),
            v_weights: Array2::zeros(grad_weights.raw_dim()),
            m_bias: Array1::zeros(grad_bias.raw_dim()),
            v_bias: Array1::zeros(grad_bias.raw_dim()),
        }
    }
}

/// Adam (Adaptive Moment Estimation) optimizer.
///
/// The update rule is:
///
/// ```text
/// m_t = β1 * m_{t-1} + (1 - β1) * gradient
/// v_t = β2 * v_{t-1} + (1 - β2) * gradient²
/// m_hat = m_t / (1 - β1^t)
/// v_hat = v_t / (1 - β2^t)
/// parameter = parameter - α * m_hat / (√v_hat + ε)
/// ```
///
/// # Step counter
///
/// One step counter `t` is shared by every layer this instance services and
/// is incremented once per [`Optimizer::update_layer`] call, not once per
/// epoch. Bias correction therefore stays consistent across layers only
/// while each layer is updated exactly once per training step, which is what
/// [`crate::network::NeuralNetwork::train`] does. Updating one layer several
/// times per step desynchronises the correction for the others.
///
/// # Example
///
/// ```
/// use mlp_trainer::optimizers::{Adam, Optimizer};
///
/// let optimizer = Adam::new(0.001);
/// assert_eq!(optimizer.learning_rate(), 0.001);
/// assert_eq!(optimizer.step(), 0);
/// ```
///
/// # Reference
///
/// Kingma, D. P., & Ba, J. (2014). Adam: A method for stochastic optimization.
/// arXiv preprint arXiv:1412.6980.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    moments: HashMap<LayerId, Moments>,
    t: u64,
}

impl Adam {
    pub const DEFAULT_BETA1: f64 = 0.9;
    pub const DEFAULT_BETA2: f64 = 0.999;
    pub const DEFAULT_EPSILON: f64 = 1e-8;

    /// Adam with β1 = 0.9, β2 = 0.999, ε = 1e-8.
    pub fn new(learning_rate: f64) -> Self {
        Self::with_hyperparameters(
            learning_rate,
            Self::DEFAULT_BETA1,
            Self::DEFAULT_BETA2,
            Self::DEFAULT_EPSILON,
        )
    }

    /// Adam with explicit hyperparameters.
    pub fn with_hyperparameters(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            moments: HashMap::new(),
            t: 0,
        }
    }

    /// Number of `update_layer` calls since creation or the last reset.
    pub fn step(&self) -> u64 {
        self.t
    }

    pub fn beta1(&self) -> f64 {
        self.beta1
    }

    pub fn beta2(&self) -> f64 {
        self.beta2
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Moment estimates for `layer`, once it has been updated at least once.
    pub fn moments(&self, layer: LayerId) -> Option<&Moments> {
        self.moments.get(&layer)
    }
}

impl Optimizer for Adam {
    fn update_layer(&mut self, layer: &mut dyn Parameters) -> Result<()> {
        let id = layer.id();
        let (grad_weights, grad_bias) = layer
            .gradients()
            .ok_or(NetworkError::MissingGradients { layer: id })?;
        let (weights, bias) = layer.params();

        self.t += 1;
        let (beta1, beta2) = (self.beta1, self.beta2);
        let step = self.t as f64;
        let correction1 = 1.0 - beta1.powf(step);
        let correction2 = 1.0 - beta2.powf(step);
        let (lr, eps) = (self.learning_rate, self.epsilon);

        let moments = self
            .moments
            .entry(id)
            .or_insert_with(|| Moments::zeros_like(grad_weights, grad_bias));

        moments.m_weights = &moments.m_weights * beta1 + grad_weights * (1.0 - beta1);
        moments.v_weights =
            &moments.v_weights * beta2 + &grad_weights.mapv(|g| g * g) * (1.0 - beta2);
        let m_hat = &moments.m_weights / correction1;
        let v_hat = &moments.v_weights / correction2;
        let new_weights = weights - &(m_hat * lr / (v_hat.mapv(f64::sqrt) + eps));

        moments.m_bias = &moments.m_bias * beta1 + grad_bias * (1.0 - beta1);
        moments.v_bias = &moments.v_bias * beta2 + &grad_bias.mapv(|g| g * g) * (1.0 - beta2);
        let m_hat = &moments.m_bias / correction1;
        let v_hat = &moments.v_bias / correction2;
        let new_bias = bias - &(m_hat * lr / (v_hat.mapv(f64::sqrt) + eps));

        layer.set_params(new_weights, new_bias)
    }

    fn reset(&mut self) {
        self.moments.clear();
        self.t = 0;
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.learning_rate = lr;
    }
}
