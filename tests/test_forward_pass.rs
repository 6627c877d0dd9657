//! Tests for forward propagation: output shapes and known values.

use approx::assert_relative_eq;
use mlp_trainer::layers::{DenseLayer, Layer};
use mlp_trainer::network::NeuralNetwork;
use mlp_trainer::utils::{Activation, SimpleRng};
use mlp_trainer::NetworkError;
use ndarray::{arr1, arr2, Array2, Array3};

mod shape_tests {
    use super::*;

    #[test]
    fn test_forward_output_shape() {
        let mut rng = SimpleRng::new(42);
        for activation in Activation::ALL {
            let mut layer = DenseLayer::new(3, 4, activation, &mut rng);
            let output = layer.forward(&Array2::<f64>::ones((5, 3))).unwrap();
            assert_eq!(output.dim(), (5, 4), "{}", activation);
        }
    }

    #[test]
    fn test_single_sample_is_batch_of_one() {
        let mut rng = SimpleRng::new(42);
        let mut layer = DenseLayer::new(3, 2, Activation::Tanh, &mut rng);
        let output = layer.forward(&arr1(&[0.1, 0.2, 0.3])).unwrap();
        assert_eq!(output.dim(), (1, 2));
        assert_eq!(layer.last_input().unwrap().dim(), (1, 3));
    }

    #[test]
    fn test_network_chains_layers() {
        let mut rng = SimpleRng::new(1);
        let mut network = NeuralNetwork::default();
        network.add_layer(DenseLayer::new(4, 16, Activation::Relu, &mut rng));
        network.add_layer(DenseLayer::new(16, 8, Activation::LeakyRelu, &mut rng));
        network.add_layer(DenseLayer::new(8, 3, Activation::Softmax, &mut rng));

        let output = network.predict(&Array2::<f64>::zeros((7, 4))).unwrap();
        assert_eq!(output.dim(), (7, 3));
        for row in output.outer_iter() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rank_three_input_rejected() {
        let mut rng = SimpleRng::new(1);
        let mut layer = DenseLayer::new(2, 1, Activation::Sigmoid, &mut rng);
        assert!(matches!(
            layer.forward(&Array3::<f64>::zeros((1, 1, 2))),
            Err(NetworkError::InvalidRank { rank: 3, .. })
        ));
    }
}

mod value_tests {
    use super::*;
    use mlp_trainer::layers::Parameters;

    #[test]
    fn test_affine_then_activation() {
        let weights = arr2(&[[1.0, -1.0], [2.0, 0.5]]);
        let bias = arr1(&[0.5, -0.25]);
        let mut layer = DenseLayer::from_params(weights, bias, Activation::Relu);

        let output = layer.forward(&arr2(&[[1.0, 1.0], [-1.0, 0.0]])).unwrap();

        // z = [[3.5, -0.75], [-0.5, 0.75]]
        assert_eq!(output, arr2(&[[3.5, 0.0], [0.0, 0.75]]));
        assert_eq!(layer.last_z().unwrap(), &arr2(&[[3.5, -0.75], [-0.5, 0.75]]));
        assert_eq!(layer.last_output().unwrap(), &output);
    }

    #[test]
    fn test_sigmoid_output_range() {
        let mut rng = SimpleRng::new(9);
        let mut layer = DenseLayer::new(2, 3, Activation::Sigmoid, &mut rng);
        let output = layer.forward(&arr2(&[[100.0, -100.0], [0.0, 0.0]])).unwrap();
        assert!(output.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_predict_does_not_change_parameters() {
        let mut rng = SimpleRng::new(3);
        let mut network = NeuralNetwork::default();
        network.add_layer(DenseLayer::new(2, 2, Activation::Tanh, &mut rng));
        let before = network.layers()[0].clone();

        let first = network.predict(&arr2(&[[0.3, -0.7]])).unwrap();
        let second = network.predict(&arr2(&[[0.3, -0.7]])).unwrap();

        assert_eq!(first, second);
        assert_eq!(network.layers()[0].params(), before.params());
    }
}
