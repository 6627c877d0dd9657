//! Optimizer abstractions for neural network parameter updates
//!
//! Optimizers consume the gradients a layer cached during its backward pass
//! and write new parameters back through [`Parameters::set_params`].
//!
//! # Available Optimizers
//!
//! - Adam: adaptive moment estimation with bias correction
//!
//! # Example
//!
//! ```ignore
//! use mlp_trainer::optimizers::{Adam, Optimizer};
//!
//! let mut optimizer = Adam::new(0.001);
//!
//! // After layer.backward(...)
//! optimizer.update_layer(&mut layer)?;
//! ```

pub mod adam;

pub use adam::{Adam, Moments};

use crate::error::Result;
use crate::layers::Parameters;

/// Core trait for neural network optimizers.
///
/// # State Management
///
/// Stateful optimizers key their per-layer state by [`Parameters::id`], so
/// two layers sharing an id would share moment estimates.
pub trait Optimizer {
    /// Apply one update step to `layer` using its cached gradients.
    ///
    /// # Errors
    ///
    /// Returns `MissingGradients` if the layer has not run backward yet, or a
    /// shape error if the layer rejects the new parameters.
    fn update_layer(&mut self, layer: &mut dyn Parameters) -> Result<()>;

    /// Clear all accumulated state.
    fn reset(&mut self);

    /// Base learning rate.
    fn learning_rate(&self) -> f64;

    /// Set the base learning rate.
    fn set_learning_rate(&mut self, lr: f64);
}
