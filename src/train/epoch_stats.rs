use serde::{Deserialize, Serialize};

/// Per-epoch statistics produced by `train_loop`.
///
/// One value is returned per completed epoch and, when a `progress_tx`
/// channel is configured in `TrainConfig`, also sent on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Sample-weighted mean training loss.
    pub train_loss: f64,
    /// Sample-weighted mean training accuracy in [0, 1].
    pub train_accuracy: f64,
    /// Training images processed per second over the whole epoch.
    pub throughput: f64,
    /// Wall-clock duration of the training pass in milliseconds.
    pub elapsed_ms: u64,
    pub test_loss: f64,
    pub test_accuracy: f64,
}
