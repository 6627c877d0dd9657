//! Model persistence and evaluation
//!
//! A saved model is a JSON array with one record per layer, in network
//! order:
//!
//! ```json
//! [
//!   { "weights": [[0.1, -0.3], [0.7, 0.2]], "bias": [0.0, 0.05], "activation": "relu" },
//!   { "weights": [[0.4], [-0.9]], "bias": [0.1], "activation": "sigmoid" }
//! ]
//! ```
//!
//! Loading is positional. The target network must already have the same
//! number of layers with matching shapes.

use crate::error::{NetworkError, Result};
use crate::layers::{DenseLayer, Layer, Parameters};
use crate::metric::Metric;
use crate::network::NeuralNetwork;
use crate::tensor;
use ndarray::{Array1, ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Persisted parameters of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    /// Nested `[input_size][output_size]` weight rows.
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: String,
}

impl LayerRecord {
    pub fn from_layer(layer: &DenseLayer) -> Self {
        let (weights, bias) = layer.params();
        Self {
            weights: tensor::to_nested(weights),
            bias: bias.to_vec(),
            activation: layer.activation().to_string(),
        }
    }
}

/// Save/load/evaluate entry points.
pub struct ModelManager;

impl ModelManager {
    /// One record per layer, in network order.
    pub fn records(network: &NeuralNetwork) -> Vec<LayerRecord> {
        network.layers().iter().map(LayerRecord::from_layer).collect()
    }

    pub fn to_json(network: &NeuralNetwork) -> Result<String> {
        Ok(serde_json::to_string(&Self::records(network))?)
    }

    /// Write the network's parameters to `path` as JSON.
    pub fn save<P: AsRef<Path>>(network: &NeuralNetwork, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, Self::to_json(network)?)?;
        info!(path = %path.display(), layers = network.layers().len(), "model saved");
        Ok(())
    }

    /// Replace the network's parameters with those stored in `json`.
    ///
    /// # Errors
    ///
    /// - `InvalidModel` if the document is not an array of layer records
    /// - `MissingLayerParams` naming the first layer index that has no
    ///   counterpart on the other side
    /// - `ShapeMismatch` if a record's shapes differ from the live layer's
    ///
    /// Parameters are only written once every record has been validated, so
    /// a failed load leaves the network untouched.
    pub fn from_json(network: &mut NeuralNetwork, json: &str) -> Result<()> {
        let document: Value = serde_json::from_str(json)?;
        if !document.is_array() {
            return Err(NetworkError::InvalidModel(
                "expected a JSON array of layer records".to_string(),
            ));
        }
        let records: Vec<LayerRecord> = serde_json::from_value(document)
            .map_err(|e| NetworkError::InvalidModel(e.to_string()))?;

        let live = network.layers().len();
        if records.len() != live {
            return Err(NetworkError::MissingLayerParams {
                index: records.len().min(live),
            });
        }

        let mut staged = Vec::with_capacity(records.len());
        for (index, (record, layer)) in records.iter().zip(network.layers()).enumerate() {
            let weights = tensor::from_nested(&record.weights)?;
            let bias = Array1::from_vec(record.bias.clone());
            let (live_weights, live_bias) = layer.params();
            if weights.dim() != live_weights.dim() || bias.len() != live_bias.len() {
                return Err(NetworkError::ShapeMismatch {
                    context: "stored layer parameters",
                    expected: vec![live_weights.nrows(), live_weights.ncols()],
                    actual: vec![weights.nrows(), weights.ncols()],
                });
            }
            if record.activation != layer.activation().as_str() {
                warn!(
                    index,
                    stored = %record.activation,
                    live = %layer.activation(),
                    "stored activation differs from the live layer; keeping the live activation"
                );
            }
            staged.push((weights, bias));
        }

        for (layer, (weights, bias)) in network.layers_mut().iter_mut().zip(staged) {
            layer.set_params(weights, bias)?;
        }
        Ok(())
    }

    /// Load parameters saved by [`ModelManager::save`] into `network`.
    pub fn load<P: AsRef<Path>>(network: &mut NeuralNetwork, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        Self::from_json(network, &json)?;
        info!(path = %path.display(), layers = network.layers().len(), "model loaded");
        Ok(())
    }

    /// Predict on `x` and score the predictions against `y`.
    pub fn evaluate<S1, D1, S2, D2>(
        network: &mut NeuralNetwork,
        x: &ArrayBase<S1, D1>,
        y: &ArrayBase<S2, D2>,
        metrics: &[Metric],
    ) -> Result<BTreeMap<&'static str, f64>>
    where
        S1: Data<Elem = f64>,
        D1: Dimension,
        S2: Data<Elem = f64>,
        D2: Dimension,
    {
        let predictions = network.predict(x)?;
        metrics
            .iter()
            .map(|metric| Ok((metric.name(), metric.compute(y, &predictions)?)))
            .collect()
    }
}
