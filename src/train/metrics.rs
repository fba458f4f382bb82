use crate::train::learner::StepOutput;

/// Running sums of per-batch loss and accuracy, each weighted by the
/// number of samples in its batch.
///
/// Dividing by the sample count gives the true per-sample mean even when the
/// last batch is short.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedMean {
    pub sum_loss: f64,
    pub sum_accuracy: f64,
    pub samples: usize,
}

impl WeightedMean {
    pub fn add(&mut self, step: StepOutput, batch_len: usize) {
        self.sum_loss += step.loss as f64 * batch_len as f64;
        self.sum_accuracy += step.accuracy as f64 * batch_len as f64;
        self.samples += batch_len;
    }

    pub fn mean_loss(&self) -> f64 {
        self.sum_loss / self.samples as f64
    }

    pub fn mean_accuracy(&self) -> f64 {
        self.sum_accuracy / self.samples as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_last_batch_is_weighted_by_its_length() {
        let mut acc = WeightedMean::default();
        acc.add(StepOutput { loss: 1.0, accuracy: 0.5 }, 100);
        acc.add(StepOutput { loss: 2.0, accuracy: 0.25 }, 100);
        acc.add(StepOutput { loss: 4.0, accuracy: 1.0 }, 50);

        assert_eq!(acc.samples, 250);
        assert!((acc.mean_loss() - (100.0 + 200.0 + 200.0) / 250.0).abs() < 1e-12);
        assert!((acc.mean_accuracy() - (50.0 + 25.0 + 50.0) / 250.0).abs() < 1e-12);
        // The unweighted mean of batch means would be 7/3.
        assert!((acc.mean_loss() - 7.0 / 3.0).abs() > 0.1);
    }
}
