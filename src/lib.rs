pub mod activation;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use config::{Device, RunConfig};
pub use data::{Dataset, ImageSet};
pub use error::{Error, Result};
pub use network::{ConvNet, ConvNetSpec};
pub use optim::{Optimizer, OptimizerKind};
pub use train::{train_loop, ConvNetLearner, EpochStats, Learner, StepOutput, TrainConfig};
