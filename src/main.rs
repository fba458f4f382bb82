use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use cifar_convnet::cli::TrainArgs;
use cifar_convnet::data::cifar::{self, CLASS_NAMES};
use cifar_convnet::network::{InputType, ModelMetadata};
use cifar_convnet::{train_loop, ConvNet, ConvNetLearner, ConvNetSpec, Device, TrainConfig};

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = TrainArgs::parse().into_config();

    println!();
    println!("{}", config);

    if let Device::Accelerator(id) = config.device {
        warn!("no accelerator backend is built in; device {} ignored, training on the host", id);
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!("# loading CIFAR-10 dataset");
    info!("reading batches from {}", config.data_dir.display());
    let dataset = cifar::load_cifar10(&config.data_dir)
        .with_context(|| format!("failed to load CIFAR-10 from {}", config.data_dir.display()))?;
    println!("- number of training data: {}", dataset.train.len());
    println!("- number of test data: {}", dataset.test.len());
    println!("done.");

    let spec = ConvNetSpec::cifar10();
    ensure!(
        dataset.train.sample_size() == spec.input_size() && dataset.test.sample_size() == spec.input_size(),
        "dataset samples hold {} values, the network expects {}",
        dataset.train.sample_size(),
        spec.input_size()
    );
    let mut network = ConvNet::new(spec.clone(), &mut rng);
    network.metadata = ModelMetadata {
        description: Some("CIFAR-10 convolutional classifier".to_owned()),
        input_type: Some(InputType::ImageRgbPlanar { width: spec.width as u32, height: spec.height as u32 }),
        output_labels: Some(CLASS_NAMES.iter().map(|s| s.to_string()).collect()),
    };
    info!("network has {} parameters", network.parameter_count());

    let mut learner = ConvNetLearner::new(network, config.optimizer.build());
    info!("optimizer: {}", learner.optimizer_name());
    let train_config = TrainConfig::new(config.epochs, config.batch_size, config.output.clone());

    println!();
    println!("start learning");
    let history = train_loop(&mut learner, &dataset, &train_config, &mut rng).context("training failed")?;

    if let Some(last) = history.last() {
        info!(
            "finished {} epochs: test accuracy {:.4}",
            history.len(),
            last.test_accuracy
        );
    }
    Ok(())
}
