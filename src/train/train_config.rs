use std::path::PathBuf;
use std::sync::mpsc;

use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`      : total number of full passes over the training data
/// - `batch_size`  : samples per minibatch; the last batch of a pass may be
///                   shorter
/// - `output`      : where the trained model is saved after the last epoch
/// - `progress_tx` : optional channel sender; one `EpochStats` is sent per
///                   completed epoch. A dropped receiver is ignored.
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub output: PathBuf,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` with no progress channel.
    pub fn new(epochs: usize, batch_size: usize, output: impl Into<PathBuf>) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            output: output.into(),
            progress_tx: None,
        }
    }
}
