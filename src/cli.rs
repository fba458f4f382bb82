use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{Device, RunConfig};
use crate::optim::OptimizerKind;

/// Command line options of the training binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cifar-convnet",
    version,
    about = "CIFAR-10 Convolutional Neural Network Training",
    allow_negative_numbers = true
)]
pub struct TrainArgs {
    /// GPU ID (negative value indicates CPU).
    #[arg(short = 'g', long, default_value_t = -1)]
    pub gpu: i32,
    /// Number of epochs for training.
    #[arg(short = 'e', long, default_value_t = 20)]
    pub epoch: usize,
    /// Learning minibatch size.
    #[arg(short = 'b', long, default_value_t = 100)]
    pub batchsize: usize,
    /// Optimizer (adam or momentumsgd).
    #[arg(short = 'o', long, value_enum, default_value_t = OptimizerChoice::Adam)]
    pub optimizer: OptimizerChoice,
    /// Learning rate (momentum SGD only).
    #[arg(long, default_value_t = 0.01)]
    pub learningrate: f32,
    /// Alpha value (Adam only).
    #[arg(long, default_value_t = 0.001)]
    pub alpha: f32,
    /// Directory holding the CIFAR-10 binary batches.
    #[arg(long, default_value = "cifar-10-batches-bin")]
    pub data_dir: PathBuf,
    /// File the trained model is written to.
    #[arg(short = 'O', long, default_value = "output.model")]
    pub output: PathBuf,
    /// Seed for weight initialization and shuffling.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerChoice {
    Adam,
    #[value(name = "momentumsgd")]
    MomentumSgd,
}

impl TrainArgs {
    /// Resolves the options into the immutable run configuration. Only the
    /// hyperparameter of the chosen optimizer is carried over.
    pub fn into_config(self) -> RunConfig {
        let optimizer = match self.optimizer {
            OptimizerChoice::Adam => OptimizerKind::Adam { alpha: self.alpha },
            OptimizerChoice::MomentumSgd => OptimizerKind::MomentumSgd { learning_rate: self.learningrate },
        };
        RunConfig {
            device: Device::from_id(self.gpu),
            epochs: self.epoch,
            batch_size: self.batchsize,
            optimizer,
            data_dir: self.data_dir,
            output: self.output,
            seed: self.seed,
        }
    }
}
