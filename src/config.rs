//! Configuration structures for training
//!
//! This module provides the JSON training configuration: optimizer
//! hyperparameters, the loss function and the early-stopping patience.

use crate::error::{NetworkError, Result};
use crate::loss::LossFunction;
use crate::network::{TrainOptions, DEFAULT_LEARNING_RATE, DEFAULT_PATIENCE};
use crate::optimizers::Adam;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Configuration for one training run.
///
/// Every field is optional in the JSON document. Missing Adam
/// hyperparameters fall back to β1 = 0.9, β2 = 0.999, ε = 1e-8.
///
/// # Example
///
/// ```json
/// {
///   "learning_rate": 0.1,
///   "epochs": 1000,
///   "patience": 500,
///   "loss": "bce",
///   "verbose": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Adam step size
    pub learning_rate: f64,

    /// Consecutive epochs without improvement tolerated before stopping
    pub patience: usize,

    /// Upper bound on the number of epochs
    pub epochs: usize,

    /// Loss function: "mse", "bce" or "cce"
    pub loss: String,

    /// Log progress every 100 epochs
    pub verbose: bool,

    pub beta1: Option<f64>,
    pub beta2: Option<f64>,
    pub epsilon: Option<f64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            patience: DEFAULT_PATIENCE,
            epochs: 1000,
            loss: LossFunction::BinaryCrossEntropy.as_str().to_string(),
            verbose: false,
            beta1: None,
            beta2: None,
            epsilon: None,
        }
    }
}

impl TrainingConfig {
    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TrainingConfig = serde_json::from_str(json)?;
        validate_config(&config)?;
        Ok(config)
    }

    pub fn loss_function(&self) -> Result<LossFunction> {
        self.loss.parse()
    }

    pub fn to_options(&self) -> Result<TrainOptions> {
        Ok(TrainOptions {
            epochs: self.epochs,
            loss: self.loss_function()?,
            verbose: self.verbose,
        })
    }

    /// Adam configured with this run's hyperparameters.
    pub fn build_optimizer(&self) -> Adam {
        Adam::with_hyperparameters(
            self.learning_rate,
            self.beta1.unwrap_or(Adam::DEFAULT_BETA1),
            self.beta2.unwrap_or(Adam::DEFAULT_BETA2),
            self.epsilon.unwrap_or(Adam::DEFAULT_EPSILON),
        )
    }
}

/// Loads a training configuration from a JSON file.
///
/// # Examples
///
/// ```no_run
/// use mlp_trainer::config::load_config;
///
/// let cfg = load_config("config/or_gate.json").unwrap();
/// assert_eq!(cfg.loss, "bce");
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TrainingConfig> {
    let contents = fs::read_to_string(path)?;
    TrainingConfig::from_json(&contents)
}

fn invalid(message: impl Into<String>) -> NetworkError {
    NetworkError::InvalidConfig(message.into())
}

fn validate_config(config: &TrainingConfig) -> Result<()> {
    if config.learning_rate.is_nan() || config.learning_rate < 0.0 {
        return Err(invalid("learning_rate must be non-negative"));
    }
    if config.epochs == 0 {
        return Err(invalid("epochs must be greater than 0"));
    }
    if config.patience == 0 {
        return Err(invalid("patience must be greater than 0"));
    }

    for (name, beta) in [("beta1", config.beta1), ("beta2", config.beta2)] {
        if let Some(beta) = beta {
            if !(0.0..1.0).contains(&beta) {
                return Err(invalid(format!("{} must be in range [0.0, 1.0)", name)));
            }
        }
    }

    if let Some(epsilon) = config.epsilon {
        if epsilon.is_nan() || epsilon <= 0.0 {
            return Err(invalid("epsilon must be positive"));
        }
    }

    if config.loss_function().is_err() {
        return Err(invalid(format!(
            "Invalid loss function '{}'. Must be one of: mse, bce, cce",
            config.loss
        )));
    }

    Ok(())
}
