pub mod epoch_stats;
pub mod learner;
pub mod loop_fn;
pub mod metrics;
pub mod train_config;

pub use epoch_stats::EpochStats;
pub use learner::{ConvNetLearner, Learner, StepOutput};
pub use loop_fn::{batch_ranges, train_loop};
pub use metrics::WeightedMean;
pub use train_config::TrainConfig;
