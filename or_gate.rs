use mlp_trainer::architecture::{build_network, load_architecture, ArchitectureConfig};
use mlp_trainer::config::{load_config, TrainingConfig};
use mlp_trainer::metric::Metric;
use mlp_trainer::model_manager::ModelManager;
use mlp_trainer::utils::SimpleRng;
use mlp_trainer::Result;
use ndarray::{arr1, arr2, Array1, Array2};
use std::env;
use tracing_subscriber::EnvFilter;

// Learns logical OR with a 2-8-1 network (educational example).
const ARCHITECTURE: &str = r#"{
    "layers": [
        { "input_size": 2, "output_size": 8, "activation": "relu" },
        { "input_size": 8, "output_size": 1, "activation": "sigmoid" }
    ]
}"#;
const LEARNING_RATE: f64 = 0.1;
const EPOCHS: usize = 1000;
const MODEL_PATH: &str = "or_gate_model.json";

fn dataset() -> (Array2<f64>, Array1<f64>) {
    (
        arr2(&[[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]),
        arr1(&[0.0, 1.0, 1.0, 1.0]),
    )
}

fn default_training() -> TrainingConfig {
    TrainingConfig {
        learning_rate: LEARNING_RATE,
        epochs: EPOCHS,
        verbose: true,
        ..TrainingConfig::default()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Usage: or_gate [training.json] [architecture.json]
    let mut args = env::args().skip(1);
    let training = match args.next() {
        Some(path) => load_config(path)?,
        None => default_training(),
    };
    let architecture = match args.next() {
        Some(path) => load_architecture(path)?,
        None => ArchitectureConfig::from_json(ARCHITECTURE)?,
    };

    // Fixed seed for reproducibility.
    let mut rng = SimpleRng::new(42);
    let mut network = build_network(&architecture, &training, &mut rng)?;
    let (x, y) = dataset();

    let report = network.train(&x, &y, &training.to_options()?)?;
    println!(
        "Trained for {} epochs ({:?}), best loss {:.6}, final loss {:.6}",
        report.epochs_run, report.stop_reason, report.best_loss, report.final_loss
    );

    ModelManager::save(&network, MODEL_PATH)?;
    let mut restored = build_network(&architecture, &training, &mut SimpleRng::new(7))?;
    ModelManager::load(&mut restored, MODEL_PATH)?;

    println!("\nTesting the restored network:");
    let predictions = restored.predict(&x)?;
    for (input, (expected, predicted)) in x.outer_iter().zip(y.iter().zip(predictions.column(0))) {
        println!(
            "Input: {:.1}, {:.1}, Expected Output: {:.1}, Predicted Output: {:.3}",
            input[0], input[1], expected, predicted
        );
    }

    let scores = ModelManager::evaluate(&mut restored, &x, &y, &Metric::ALL)?;
    for (name, value) in scores {
        println!("{:>9}: {:.4}", name, value);
    }
    Ok(())
}
