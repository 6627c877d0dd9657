//! Tests for architecture parsing and building
//!
//! This file tests the architecture module including:
//! - Loading valid JSON architecture configs
//! - Building networks from configs
//! - Handling invalid JSON and missing files
//! - Validating layer connections

use mlp_trainer::architecture::{build_network, load_architecture, ArchitectureConfig};
use mlp_trainer::config::TrainingConfig;
use mlp_trainer::layers::{Layer, LayerId, Parameters};
use mlp_trainer::utils::{Activation, SimpleRng};
use mlp_trainer::NetworkError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    file
}

// ============================================================================
// Valid Architecture Loading Tests
// ============================================================================

mod valid_architecture_tests {
    use super::*;

    #[test]
    fn test_load_bundled_or_gate_architecture() {
        let arch = load_architecture("config/architectures/or_gate.json")
            .expect("Failed to load or_gate architecture");

        assert_eq!(arch.layers.len(), 2);
        assert_eq!(arch.layers[0].input_size, 2);
        assert_eq!(arch.layers[0].output_size, 8);
        assert_eq!(arch.layers[0].activation, "relu");
        assert_eq!(arch.layers[1].activation, "sigmoid");
    }

    #[test]
    fn test_build_network_assigns_ids_and_activations() {
        let arch = load_architecture("config/architectures/or_gate.json").unwrap();
        let mut rng = SimpleRng::new(42);
        let network = build_network(&arch, &TrainingConfig::default(), &mut rng).unwrap();

        assert_eq!(network.layers().len(), 2);
        for (index, layer) in network.layers().iter().enumerate() {
            assert_eq!(layer.id(), LayerId(index));
        }
        assert_eq!(network.layers()[0].activation(), Activation::Relu);
        assert_eq!(network.layers()[1].output_size(), 1);
        assert_eq!(network.layers()[0].parameter_count(), 2 * 8 + 8);
    }

    #[test]
    fn test_same_seed_same_network() {
        let arch = load_architecture("config/architectures/or_gate.json").unwrap();
        let a = build_network(&arch, &TrainingConfig::default(), &mut SimpleRng::new(7)).unwrap();
        let b = build_network(&arch, &TrainingConfig::default(), &mut SimpleRng::new(7)).unwrap();

        for (x, y) in a.layers().iter().zip(b.layers()) {
            assert_eq!(x.params(), y.params());
        }
    }

    #[test]
    fn test_single_layer_architecture() {
        let file = write_temp_config(
            r#"{"layers": [{"input_size": 4, "output_size": 3, "activation": "softmax"}]}"#,
        );
        let arch = load_architecture(file.path()).unwrap();
        assert_eq!(arch.layers.len(), 1);
    }
}

// ============================================================================
// Invalid Architecture Tests
// ============================================================================

mod invalid_architecture_tests {
    use super::*;

    #[test]
    fn test_invalid_json() {
        let file = write_temp_config(r#"{"layers": [ {"input_size": 2 "#);
        assert!(matches!(load_architecture(file.path()), Err(NetworkError::Json(_))));
    }

    #[test]
    fn test_missing_required_field() {
        let file = write_temp_config(r#"{"layers": [{"input_size": 2, "output_size": 1}]}"#);
        assert!(matches!(load_architecture(file.path()), Err(NetworkError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_architecture("config/architectures/missing.json"),
            Err(NetworkError::Io(_))
        ));
    }

    #[test]
    fn test_zero_sized_layer() {
        let file = write_temp_config(
            r#"{"layers": [{"input_size": 0, "output_size": 1, "activation": "sigmoid"}]}"#,
        );
        match load_architecture(file.path()) {
            Err(NetworkError::InvalidConfig(message)) => {
                assert!(message.contains("input_size must be greater than 0"))
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_connection_mismatch() {
        let json = r#"{"layers": [
            {"input_size": 2, "output_size": 8, "activation": "relu"},
            {"input_size": 8, "output_size": 4, "activation": "tanh"},
            {"input_size": 3, "output_size": 1, "activation": "sigmoid"}
        ]}"#;
        match ArchitectureConfig::from_json(json) {
            Err(NetworkError::InvalidConfig(message)) => {
                assert!(message.contains("Layer 1 output size (4)"));
                assert!(message.contains("Layer 2 input size (3)"));
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_build_rejects_unvalidated_config() {
        let arch = ArchitectureConfig { layers: Vec::new() };
        let mut rng = SimpleRng::new(1);
        assert!(matches!(
            build_network(&arch, &TrainingConfig::default(), &mut rng),
            Err(NetworkError::InvalidConfig(_))
        ));
    }
}
