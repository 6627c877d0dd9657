//! Feed-forward network assembly and the full-batch training loop
//!
//! A [`NeuralNetwork`] owns an ordered list of [`DenseLayer`]s and one
//! optimizer. Each training epoch runs:
//!
//! 1. forward through every layer in order
//! 2. the scalar loss
//! 3. the early-stopping check, which may end training before any update
//! 4. the output gradient seed (see [`crate::loss::seed_gradient`])
//! 5. backward in reverse order, updating each layer right after its
//!    backward step
//!
//! # Example
//!
//! ```
//! use mlp_trainer::layers::DenseLayer;
//! use mlp_trainer::network::{NeuralNetwork, TrainOptions};
//! use mlp_trainer::utils::{Activation, SimpleRng};
//! use ndarray::{arr1, arr2};
//!
//! let mut rng = SimpleRng::new(7);
//! let mut network = NeuralNetwork::new(0.1, 50);
//! network.add_layer(DenseLayer::new(2, 4, Activation::Relu, &mut rng));
//! network.add_layer(DenseLayer::new(4, 1, Activation::Sigmoid, &mut rng));
//!
//! let x = arr2(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
//! let y = arr1(&[0.0, 1.0, 1.0, 1.0]);
//! let report = network.train(&x, &y, &TrainOptions::default()).unwrap();
//! assert!(report.epochs_run > 0);
//! ```

use crate::error::{NetworkError, Result};
use crate::layers::{DenseLayer, Layer, LayerId};
use crate::loss::{self, LossFunction};
use crate::optimizers::{Adam, Optimizer};
use ndarray::{Array2, ArrayBase, Data, Dimension};
use tracing::{debug, info};

/// A loss must beat the best seen so far by more than this to count.
pub const IMPROVEMENT_THRESHOLD: f64 = 1e-6;

/// Default early-stopping patience in epochs.
pub const DEFAULT_PATIENCE: usize = 500;

/// Default Adam learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Epochs between verbose progress lines.
const LOG_INTERVAL: usize = 100;

/// Per-run training settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    pub epochs: usize,
    pub loss: LossFunction,
    /// Emit an `info` progress line every 100 epochs.
    pub verbose: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 1000,
            loss: LossFunction::BinaryCrossEntropy,
            verbose: false,
        }
    }
}

/// Why a training run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every configured epoch ran.
    EpochsExhausted,
    /// Patience ran out at `epoch` (zero-based), before that epoch's update.
    EarlyStop { epoch: usize },
}

/// Summary of one call to [`NeuralNetwork::train`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Epochs whose loss was computed, including a final early-stopped one.
    pub epochs_run: usize,
    /// Lowest loss seen; NaN when no epoch ran.
    pub best_loss: f64,
    /// Loss of the last epoch run; NaN when no epoch ran.
    pub final_loss: f64,
    pub stop_reason: StopReason,
    /// Loss of every epoch run, in order.
    pub history: Vec<f64>,
}

/// Outcome of feeding one epoch's loss to [`EarlyStopping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Loss beat the best by more than the threshold; the counter was reset.
    Improved,
    /// No sufficient improvement; holds the consecutive count so far.
    NoImprove(usize),
    /// The counter reached patience.
    Stop,
}

/// No-improvement counter driving early stopping.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    threshold: f64,
    best: f64,
    stale_epochs: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self::with_threshold(patience, IMPROVEMENT_THRESHOLD)
    }

    pub fn with_threshold(patience: usize, threshold: f64) -> Self {
        Self {
            patience,
            threshold,
            best: f64::MAX,
            stale_epochs: 0,
        }
    }

    /// Record one epoch's loss.
    pub fn observe(&mut self, loss: f64) -> Progress {
        if loss < self.best - self.threshold {
            self.best = loss;
            self.stale_epochs = 0;
            return Progress::Improved;
        }
        self.stale_epochs += 1;
        if self.stale_epochs >= self.patience {
            Progress::Stop
        } else {
            Progress::NoImprove(self.stale_epochs)
        }
    }

    /// Best loss observed, `f64::MAX` before the first observation.
    pub fn best(&self) -> f64 {
        self.best
    }

    pub fn stale_epochs(&self) -> usize {
        self.stale_epochs
    }
}

/// Ordered stack of dense layers trained with one optimizer.
pub struct NeuralNetwork {
    layers: Vec<DenseLayer>,
    optimizer: Box<dyn Optimizer>,
    patience: usize,
}

impl NeuralNetwork {
    /// Empty network trained by Adam at `learning_rate`.
    pub fn new(learning_rate: f64, patience: usize) -> Self {
        Self::with_optimizer(Box::new(Adam::new(learning_rate)), patience)
    }

    pub fn with_optimizer(optimizer: Box<dyn Optimizer>, patience: usize) -> Self {
        Self {
            layers: Vec::new(),
            optimizer,
            patience,
        }
    }

    /// Append a layer. Its id becomes its position in the stack.
    pub fn add_layer(&mut self, mut layer: DenseLayer) {
        layer.set_id(LayerId(self.layers.len()));
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    pub fn patience(&self) -> usize {
        self.patience
    }

    pub fn optimizer(&self) -> &dyn Optimizer {
        self.optimizer.as_ref()
    }

    /// Forward pass through every layer. Refreshes layer caches only.
    pub fn predict<S, D>(&mut self, x: &ArrayBase<S, D>) -> Result<Array2<f64>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let (first, rest) = self
            .layers
            .split_first_mut()
            .ok_or(NetworkError::EmptyNetwork)?;
        let mut output = first.forward(x)?;
        for layer in rest {
            output = layer.forward(&output)?;
        }
        Ok(output)
    }

    /// Scalar loss of `kind` for `labels` against `predictions`.
    pub fn loss<S1, D1, S2, D2>(
        labels: &ArrayBase<S1, D1>,
        predictions: &ArrayBase<S2, D2>,
        kind: LossFunction,
    ) -> Result<f64>
    where
        S1: Data<Elem = f64>,
        D1: Dimension,
        S2: Data<Elem = f64>,
        D2: Dimension,
    {
        kind.compute(labels, predictions)
    }

    /// Full-batch training on `x` against `y`.
    ///
    /// Stops early once the loss has failed to improve by more than
    /// [`IMPROVEMENT_THRESHOLD`] for `patience` consecutive epochs. The
    /// epoch that exhausts patience is not followed by an update.
    ///
    /// # Errors
    ///
    /// Fails on the first error from any step, leaving the parameters as the
    /// last completed update left them. The output layer must use sigmoid or
    /// softmax.
    pub fn train<S1, D1, S2, D2>(
        &mut self,
        x: &ArrayBase<S1, D1>,
        y: &ArrayBase<S2, D2>,
        options: &TrainOptions,
    ) -> Result<TrainingReport>
    where
        S1: Data<Elem = f64>,
        D1: Dimension,
        S2: Data<Elem = f64>,
        D2: Dimension,
    {
        let output_activation = self
            .layers
            .last()
            .map(|layer| layer.activation())
            .ok_or(NetworkError::EmptyNetwork)?;

        let mut stopping = EarlyStopping::new(self.patience);
        let mut history = Vec::with_capacity(options.epochs);
        let mut stop_reason = StopReason::EpochsExhausted;

        for epoch in 0..options.epochs {
            let predictions = self.predict(x)?;
            let loss = options.loss.compute(y, &predictions)?;
            history.push(loss);
            debug!(epoch, loss, "epoch complete");

            if options.verbose && epoch % LOG_INTERVAL == 0 {
                info!(epoch, loss, best = stopping.best().min(loss), "training progress");
            }

            if stopping.observe(loss) == Progress::Stop {
                info!(epoch, best_loss = stopping.best(), "early stopping");
                stop_reason = StopReason::EarlyStop { epoch };
                break;
            }

            let mut grad = loss::seed_gradient(output_activation, y, &predictions)?;
            for layer in self.layers.iter_mut().rev() {
                grad = layer.backward(&grad)?;
                self.optimizer.update_layer(layer)?;
            }
        }

        let (best_loss, final_loss) = match history.last() {
            Some(&last) => (stopping.best(), last),
            None => (f64::NAN, f64::NAN),
        };

        Ok(TrainingReport {
            epochs_run: history.len(),
            best_loss,
            final_loss,
            stop_reason,
            history,
        })
    }
}

impl Default for NeuralNetwork {
    fn default() -> Self {
        Self::new(DEFAULT_LEARNING_RATE, DEFAULT_PATIENCE)
    }
}
