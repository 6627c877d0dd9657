//! Activation derivatives checked against central finite differences
//!
//! Every activation is evaluated on one row of sample points spanning
//! negative, near-zero and positive inputs. Each point is nudged on its own,
//! so for softmax the estimate is the Jacobian diagonal.

use approx::assert_relative_eq;
use mlp_trainer::utils::activations::{self, Activation};
use ndarray::{arr2, Array2};

const STEP: f64 = 1e-6;

// ReLU and Leaky ReLU are kinked at 0, so their points stay clear of it.
fn sample_points(activation: Activation) -> Array2<f64> {
    match activation {
        Activation::Relu | Activation::LeakyRelu => arr2(&[[-2.0, -0.5, -1e-3, 1e-3, 0.5, 2.0]]),
        _ => arr2(&[[-2.0, -0.5, 0.0, 0.3, 1.0, 2.5]]),
    }
}

fn numerical_derivative(activation: Activation, z: &Array2<f64>) -> Array2<f64> {
    let mut estimate = Array2::zeros(z.raw_dim());
    for col in 0..z.ncols() {
        let mut plus = z.clone();
        let mut minus = z.clone();
        plus[[0, col]] += STEP;
        minus[[0, col]] -= STEP;
        let f_plus = activation.apply(&plus);
        let f_minus = activation.apply(&minus);
        estimate[[0, col]] = (f_plus[[0, col]] - f_minus[[0, col]]) / (2.0 * STEP);
    }
    estimate
}

mod finite_difference_tests {
    use super::*;

    fn check(activation: Activation) {
        let z = sample_points(activation);
        assert!(z.ncols() >= 5);
        let analytic = activation.derivative(&z);
        let numeric = numerical_derivative(activation, &z);

        for (a, n) in analytic.iter().zip(numeric.iter()) {
            assert_relative_eq!(*a, *n, max_relative = 1e-4, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_relu_gradient() {
        check(Activation::Relu);
    }

    #[test]
    fn test_leaky_relu_gradient() {
        check(Activation::LeakyRelu);
    }

    #[test]
    fn test_tanh_gradient() {
        check(Activation::Tanh);
    }

    #[test]
    fn test_sigmoid_gradient() {
        check(Activation::Sigmoid);
    }

    #[test]
    fn test_softmax_gradient_diagonal() {
        check(Activation::Softmax);
    }

    #[test]
    fn test_linear_gradient() {
        check(Activation::Linear);
    }
}

mod dispatch_tests {
    use super::*;
    use mlp_trainer::NetworkError;

    #[test]
    fn test_string_dispatch_matches_enum() {
        let z = arr2(&[[-1.0, 0.0, 1.0]]);
        for activation in Activation::ALL {
            let by_tag = activations::apply(&z, activation.as_str()).unwrap();
            assert_eq!(by_tag, activation.apply(&z));
            let by_tag = activations::derivative(&z, activation.as_str()).unwrap();
            assert_eq!(by_tag, activation.derivative(&z));
        }
    }

    #[test]
    fn test_unknown_tag_fails() {
        let z = arr2(&[[0.0]]);
        assert!(matches!(
            activations::apply(&z, "swish"),
            Err(NetworkError::UnknownActivation(tag)) if tag == "swish"
        ));
        assert!(matches!(
            activations::derivative(&z, "elu"),
            Err(NetworkError::UnknownActivation(_))
        ));
    }

    #[test]
    fn test_linear_derivative_is_all_ones() {
        let z = arr2(&[[3.0, -7.0], [0.0, 1e6]]);
        assert_eq!(Activation::Linear.derivative(&z), Array2::<f64>::ones((2, 2)));
    }
}
