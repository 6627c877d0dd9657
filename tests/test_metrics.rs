//! Metric tests against hand-counted confusion matrices.

use approx::assert_relative_eq;
use mlp_trainer::metric::{self, Metric};
use mlp_trainer::NetworkError;
use ndarray::{arr1, arr2};

mod binary_tests {
    use super::*;

    #[test]
    fn test_column_and_vector_labels_agree() {
        let predictions = arr2(&[[0.8], [0.3], [0.55], [0.1], [0.9], [0.45]]);
        let as_vector = arr1(&[1.0, 0.0, 0.0, 0.0, 1.0, 1.0]);
        let as_column = arr2(&[[1.0], [0.0], [0.0], [0.0], [1.0], [1.0]]);

        for metric in Metric::ALL {
            let a = metric.compute(&as_vector, &predictions).unwrap();
            let b = metric.compute(&as_column, &predictions).unwrap();
            assert_eq!(a, b, "{}", metric);
        }
    }

    #[test]
    fn test_confusion_counts() {
        // tp = 2, fp = 1, fn = 1, tn = 2
        let predictions = arr2(&[[0.8], [0.3], [0.55], [0.1], [0.9], [0.45]]);
        let labels = arr1(&[1.0, 0.0, 0.0, 0.0, 1.0, 1.0]);

        assert_relative_eq!(metric::accuracy(&labels, &predictions).unwrap(), 4.0 / 6.0);
        assert_relative_eq!(metric::precision(&labels, &predictions).unwrap(), 2.0 / 3.0);
        assert_relative_eq!(metric::recall(&labels, &predictions).unwrap(), 2.0 / 3.0);
        assert_relative_eq!(metric::f1(&labels, &predictions).unwrap(), 2.0 / 3.0);
    }

    #[test]
    fn test_perfect_predictions() {
        let predictions = arr2(&[[0.99], [0.01], [0.7]]);
        let labels = arr1(&[1.0, 0.0, 1.0]);
        assert_eq!(metric::accuracy(&labels, &predictions).unwrap(), 1.0);
        assert_eq!(metric::precision(&labels, &predictions).unwrap(), 1.0);
        assert_eq!(metric::recall(&labels, &predictions).unwrap(), 1.0);
        assert_eq!(metric::f1(&labels, &predictions).unwrap(), 1.0);
    }
}

mod multiclass_tests {
    use super::*;

    #[test]
    fn test_row_argmax_accuracy() {
        let predictions = arr2(&[[0.2, 0.5, 0.3], [0.6, 0.3, 0.1], [0.1, 0.1, 0.8], [0.4, 0.4, 0.2]]);
        let labels = arr2(&[[0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]);
        // Row 3 ties between classes 0 and 1; the first maximum wins.
        assert_relative_eq!(metric::accuracy(&labels, &predictions).unwrap(), 0.75);
    }

    #[test]
    fn test_argmax_one_hot_rows() {
        let one_hot = metric::argmax(&arr2(&[[3.0, -1.0], [0.0, 2.0], [5.0, 5.0]]));
        assert_eq!(one_hot, arr2(&[[1.0, 0.0], [0.0, 1.0], [1.0, 0.0]]));
    }
}

mod regression_tests {
    use super::*;

    #[test]
    fn test_mse_and_mae() {
        let predictions = arr2(&[[2.5], [0.0], [2.0], [8.0]]);
        let labels = arr1(&[3.0, -0.5, 2.0, 7.0]);
        assert_relative_eq!(metric::mse(&labels, &predictions).unwrap(), 0.375);
        assert_relative_eq!(metric::mae(&labels, &predictions).unwrap(), 0.5);
    }

    #[test]
    fn test_length_mismatch() {
        let predictions = arr2(&[[1.0], [2.0]]);
        assert!(matches!(
            metric::mae(&arr1(&[1.0]), &predictions),
            Err(NetworkError::ShapeMismatch { .. })
        ));
    }
}
