//! Dense (fully connected) layer implementation
//!
//! `DenseLayer` fuses the affine transform and the activation:
//! `output = activation(input × weights + bias)`.

use crate::error::{NetworkError, Result};
use crate::layers::{Layer, LayerId, Parameters};
use crate::tensor;
use crate::utils::activations::Activation;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Dimension};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

/// Values cached by `forward` for the matching `backward`.
#[derive(Debug, Clone)]
struct ForwardCache {
    input: Array2<f64>,
    z: Array2<f64>,
    output: Array2<f64>,
}

/// Dense layer with weights, bias and an activation tag.
///
/// Performs `y = f(xW + b)` where x is the input (batch_size × input_size),
/// W is the weight matrix (input_size × output_size), b is the bias vector
/// (output_size) and f is the activation.
///
/// # Example
///
/// ```
/// use mlp_trainer::layers::{DenseLayer, Layer};
/// use mlp_trainer::utils::{Activation, SimpleRng};
///
/// let mut rng = SimpleRng::new(42);
/// let layer = DenseLayer::new(784, 512, Activation::Relu, &mut rng);
/// assert_eq!(layer.input_size(), 784);
/// assert_eq!(layer.output_size(), 512);
/// ```
#[derive(Debug, Clone)]
pub struct DenseLayer {
    id: LayerId,
    weights: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
    cache: Option<ForwardCache>,
    grad_weights: Option<Array2<f64>>,
    grad_bias: Option<Array1<f64>>,
}

impl DenseLayer {
    /// Create a new layer with random initialisation.
    ///
    /// Weights are drawn from `U(-1, 1)` and scaled by `sqrt(2 / input_size)`
    /// for ReLU, Leaky ReLU and Sigmoid layers, or `sqrt(2 / (input_size +
    /// output_size))` for Tanh, Softmax and Linear layers. Bias entries are
    /// drawn from `U(-0.1, 0.1)`.
    ///
    /// # Panics
    ///
    /// Panics if either size is zero.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        assert!(
            input_size > 0 && output_size > 0,
            "layer sizes must be greater than 0"
        );

        let scale = match activation {
            Activation::Relu | Activation::LeakyRelu | Activation::Sigmoid => {
                (2.0 / input_size as f64).sqrt()
            }
            Activation::Tanh | Activation::Softmax | Activation::Linear => {
                (2.0 / (input_size + output_size) as f64).sqrt()
            }
        };
        let weights =
            Array2::random_using((input_size, output_size), Uniform::new(-1.0, 1.0), rng) * scale;
        let bias = Array1::random_using(output_size, Uniform::new(-0.1, 0.1), rng);

        Self::from_params(weights, bias, activation)
    }

    /// Build a layer from explicit parameters.
    ///
    /// # Panics
    ///
    /// Panics if `bias.len()` differs from the weight matrix's column count.
    pub fn from_params(weights: Array2<f64>, bias: Array1<f64>, activation: Activation) -> Self {
        assert_eq!(
            weights.ncols(),
            bias.len(),
            "bias length must equal the weight matrix's output size"
        );
        Self {
            id: LayerId::default(),
            weights,
            bias,
            activation,
            cache: None,
            grad_weights: None,
            grad_bias: None,
        }
    }

    /// Override the identifier. Networks assign ids when layers are added.
    pub fn with_id(mut self, id: LayerId) -> Self {
        self.id = id;
        self
    }

    pub(crate) fn set_id(&mut self, id: LayerId) {
        self.id = id;
    }

    /// Input cached by the last forward pass (already promoted to a batch).
    pub fn last_input(&self) -> Option<&Array2<f64>> {
        self.cache.as_ref().map(|c| &c.input)
    }

    /// Pre-activation `Z` cached by the last forward pass.
    pub fn last_z(&self) -> Option<&Array2<f64>> {
        self.cache.as_ref().map(|c| &c.z)
    }

    /// Output cached by the last forward pass.
    pub fn last_output(&self) -> Option<&Array2<f64>> {
        self.cache.as_ref().map(|c| &c.output)
    }
}

impl Parameters for DenseLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn params(&self) -> (&Array2<f64>, &Array1<f64>) {
        (&self.weights, &self.bias)
    }

    fn set_params(&mut self, weights: Array2<f64>, bias: Array1<f64>) -> Result<()> {
        if weights.dim() != self.weights.dim() {
            return Err(NetworkError::ShapeMismatch {
                context: "layer weights",
                expected: self.weights.shape().to_vec(),
                actual: weights.shape().to_vec(),
            });
        }
        if bias.len() != self.bias.len() {
            return Err(NetworkError::ShapeMismatch {
                context: "layer bias",
                expected: vec![self.bias.len()],
                actual: vec![bias.len()],
            });
        }
        self.weights = weights;
        self.bias = bias;
        Ok(())
    }

    fn gradients(&self) -> Option<(&Array2<f64>, &Array1<f64>)> {
        self.grad_weights.as_ref().zip(self.grad_bias.as_ref())
    }
}

impl Layer for DenseLayer {
    fn forward<S, D>(&mut self, input: &ArrayBase<S, D>) -> Result<Array2<f64>>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let input = tensor::to_batch(input)?;
        if input.ncols() != self.input_size() {
            return Err(NetworkError::ShapeMismatch {
                context: "layer input",
                expected: vec![input.nrows(), self.input_size()],
                actual: input.shape().to_vec(),
            });
        }

        // Bias broadcasts over the batch dimension.
        let z = input.dot(&self.weights) + &self.bias;
        let output = self.activation.apply(&z);

        self.cache = Some(ForwardCache {
            input,
            z,
            output: output.clone(),
        });
        Ok(output)
    }

    /// Backward propagation through the fused transform.
    ///
    /// For Softmax layers `grad_output` is taken as `dZ` unchanged: the caller
    /// must already have folded the softmax Jacobian into the gradient, which
    /// holds for `predictions - labels` seeded from categorical cross-entropy.
    /// Every other activation multiplies by its derivative at the cached `Z`.
    fn backward(&mut self, grad_output: &Array2<f64>) -> Result<Array2<f64>> {
        let cache = self
            .cache
            .as_ref()
            .ok_or(NetworkError::BackwardBeforeForward { layer: self.id })?;

        if grad_output.dim() != cache.z.dim() {
            return Err(NetworkError::ShapeMismatch {
                context: "layer output gradient",
                expected: cache.z.shape().to_vec(),
                actual: grad_output.shape().to_vec(),
            });
        }

        if cache.input.nrows() == 0 {
            return Err(NetworkError::ShapeMismatch {
                context: "training batch",
                expected: vec![1, cache.input.ncols()],
                actual: cache.input.shape().to_vec(),
            });
        }

        let dz = match self.activation {
            Activation::Softmax => grad_output.clone(),
            activation => grad_output * &activation.derivative(&cache.z),
        };

        let batch_size = cache.input.nrows() as f64;
        let grad_weights = cache.input.t().dot(&dz) / batch_size;
        let grad_bias = dz.sum_axis(Axis(0)) / batch_size;
        let grad_input = dz.dot(&self.weights.t());

        self.grad_weights = Some(grad_weights);
        self.grad_bias = Some(grad_bias);
        Ok(grad_input)
    }

    fn activation(&self) -> Activation {
        self.activation
    }

    fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    fn output_size(&self) -> usize {
        self.weights.ncols()
    }
}
