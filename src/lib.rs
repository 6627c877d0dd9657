//! Small feed-forward neural network library
//!
//! Dense layers with a fused activation, trained full-batch by Adam with
//! early stopping, plus JSON model persistence and evaluation metrics.
//!
//! # Modules
//!
//! - `layers`: Layer traits and the dense layer
//! - `optimizers`: Optimizer trait and Adam
//! - `loss`: Loss functions and output-gradient seeding
//! - `network`: Network assembly, prediction and the training loop
//! - `model_manager`: Save, load and evaluate
//! - `metric`: Accuracy, precision, recall, F1, MSE, MAE
//! - `tensor`: Shape helpers over `ndarray`
//! - `utils`: Activation functions and the seedable RNG
//! - `config`: Training configuration
//! - `architecture`: Architecture configuration and network building

pub mod architecture;
pub mod config;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metric;
pub mod model_manager;
pub mod network;
pub mod optimizers;
pub mod tensor;
pub mod utils;

pub use error::{NetworkError, Result};
pub use layers::{DenseLayer, Layer, LayerId, Parameters};
pub use loss::LossFunction;
pub use metric::Metric;
pub use model_manager::{LayerRecord, ModelManager};
pub use network::{NeuralNetwork, StopReason, TrainOptions, TrainingReport};
pub use optimizers::{Adam, Optimizer};
pub use utils::{Activation, SimpleRng};
