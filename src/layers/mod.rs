//! Layer abstractions for neural networks
//!
//! This module provides the `Layer` and `Parameters` traits and the fused
//! affine + activation `DenseLayer`.

mod r#trait;
pub mod dense;

// Re-export the traits for convenience
pub use dense::DenseLayer;
pub use r#trait::{Layer, LayerId, Parameters};
