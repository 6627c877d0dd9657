//! Shared utilities for the training core
//!
//! Activation dispatch and the seedable random number generator used for
//! layer initialisation.

pub mod activations;
pub mod rng;

pub use activations::Activation;
pub use rng::SimpleRng;
