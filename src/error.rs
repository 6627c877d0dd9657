//! Error type shared by every module of the crate.
//!
//! All failures are synchronous and surface to the caller of the in-progress
//! `train`, `predict`, `load` or metric call. Nothing in the crate retries.

use crate::layers::LayerId;
use crate::utils::activations::Activation;
use thiserror::Error;

/// Errors raised while building, training, persisting or evaluating a network.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Activation tag outside `relu`, `leaky_relu`, `tanh`, `sigmoid`, `softmax`, `linear`.
    #[error("unknown activation '{0}'")]
    UnknownActivation(String),

    /// Loss name outside `mse`, `bce`, `cce`.
    #[error("invalid loss function '{0}'; use 'mse', 'bce' or 'cce'")]
    UnknownLoss(String),

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    /// A tensor had a rank the operation cannot reconcile.
    #[error("{role} have invalid rank {rank}; expected 1 or 2")]
    InvalidRank { role: &'static str, rank: usize },

    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The output layer's activation has no defined initial gradient.
    #[error("no initial gradient defined for output activation '{0}'")]
    UnsupportedOutputActivation(Activation),

    #[error("backward called on layer {layer} before any forward pass")]
    BackwardBeforeForward { layer: LayerId },

    #[error("layer {layer} has no cached gradients; run backward first")]
    MissingGradients { layer: LayerId },

    #[error("network has no layers")]
    EmptyNetwork,

    #[error("invalid model format: {0}")]
    InvalidModel(String),

    #[error("missing parameters for layer {index}")]
    MissingLayerParams { index: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, NetworkError>;
