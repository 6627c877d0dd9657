//! Architecture configuration structures
//!
//! This module describes a network's layer stack in JSON so the layer sizes
//! and activations can change without touching code.

use crate::config::TrainingConfig;
use crate::error::{NetworkError, Result};
use crate::layers::DenseLayer;
use crate::network::NeuralNetwork;
use crate::utils::activations::Activation;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Configuration for a single dense layer.
///
/// # Example
///
/// ```json
/// {
///   "input_size": 2,
///   "output_size": 8,
///   "activation": "relu"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerConfig {
    pub input_size: usize,
    pub output_size: usize,
    /// One of "relu", "leaky_relu", "tanh", "sigmoid", "softmax", "linear"
    pub activation: String,
}

/// Configuration for the entire network.
///
/// Layers are applied in the order they appear in the configuration.
///
/// # Example
///
/// ```json
/// {
///   "layers": [
///     { "input_size": 2, "output_size": 8, "activation": "relu" },
///     { "input_size": 8, "output_size": 1, "activation": "sigmoid" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchitectureConfig {
    pub layers: Vec<LayerConfig>,
}

impl ArchitectureConfig {
    /// Parse and validate an architecture from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ArchitectureConfig = serde_json::from_str(json)?;
        validate_architecture(&config)?;
        Ok(config)
    }
}

/// Loads an architecture configuration from a JSON file.
///
/// # Examples
///
/// ```no_run
/// use mlp_trainer::architecture::load_architecture;
///
/// let arch = load_architecture("config/architectures/or_gate.json").unwrap();
/// assert!(!arch.layers.is_empty());
/// ```
pub fn load_architecture<P: AsRef<Path>>(path: P) -> Result<ArchitectureConfig> {
    let contents = fs::read_to_string(path)?;
    ArchitectureConfig::from_json(&contents)
}

/// Validates an architecture configuration.
///
/// Checks that:
/// - Architecture has at least one layer
/// - Every size is greater than 0 and every activation tag is known
/// - Output size of layer i matches input size of layer i+1
fn validate_architecture(config: &ArchitectureConfig) -> Result<()> {
    if config.layers.is_empty() {
        return Err(NetworkError::InvalidConfig(
            "Architecture must have at least one layer".to_string(),
        ));
    }

    for (i, layer) in config.layers.iter().enumerate() {
        validate_layer(layer, i)?;
    }

    for (i, pair) in config.layers.windows(2).enumerate() {
        if pair[0].output_size != pair[1].input_size {
            return Err(NetworkError::InvalidConfig(format!(
                "Layer connection mismatch: Layer {} output size ({}) does not match Layer {} input size ({})",
                i,
                pair[0].output_size,
                i + 1,
                pair[1].input_size
            )));
        }
    }

    Ok(())
}

fn validate_layer(layer: &LayerConfig, index: usize) -> Result<()> {
    if layer.input_size == 0 {
        return Err(NetworkError::InvalidConfig(format!(
            "Layer {}: input_size must be greater than 0",
            index
        )));
    }
    if layer.output_size == 0 {
        return Err(NetworkError::InvalidConfig(format!(
            "Layer {}: output_size must be greater than 0",
            index
        )));
    }
    if layer.activation.parse::<Activation>().is_err() {
        let valid: Vec<&str> = Activation::ALL.iter().map(|a| a.as_str()).collect();
        return Err(NetworkError::InvalidConfig(format!(
            "Layer {}: Invalid activation '{}'. Must be one of: {}",
            index,
            layer.activation,
            valid.join(", ")
        )));
    }
    Ok(())
}

/// Builds a network from an architecture and a training configuration.
///
/// Layers are initialised from `rng` in configuration order and the network
/// is trained by Adam with the training configuration's hyperparameters.
///
/// # Examples
///
/// ```
/// use mlp_trainer::architecture::{build_network, ArchitectureConfig};
/// use mlp_trainer::config::TrainingConfig;
/// use mlp_trainer::utils::SimpleRng;
///
/// let arch = ArchitectureConfig::from_json(
///     r#"{"layers": [{"input_size": 2, "output_size": 1, "activation": "sigmoid"}]}"#,
/// )
/// .unwrap();
/// let mut rng = SimpleRng::new(42);
/// let network = build_network(&arch, &TrainingConfig::default(), &mut rng).unwrap();
/// assert_eq!(network.layers().len(), 1);
/// ```
pub fn build_network<R: Rng + ?Sized>(
    architecture: &ArchitectureConfig,
    training: &TrainingConfig,
    rng: &mut R,
) -> Result<NeuralNetwork> {
    validate_architecture(architecture)?;

    let mut network =
        NeuralNetwork::with_optimizer(Box::new(training.build_optimizer()), training.patience);
    for layer in &architecture.layers {
        let activation: Activation = layer.activation.parse()?;
        network.add_layer(DenseLayer::new(
            layer.input_size,
            layer.output_size,
            activation,
            rng,
        ));
    }
    Ok(network)
}
