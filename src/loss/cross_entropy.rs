use crate::math::{argmax, softmax_rows};

/// Small epsilon added inside ln() to prevent ln(0) = -inf.
const EPS: f32 = 1e-12;

/// Softmax followed by categorical cross-entropy against integer class labels.
pub struct SoftmaxCrossEntropy;

/// Batch-level result of [`SoftmaxCrossEntropy::forward`].
#[derive(Debug, Clone)]
pub struct LossOutput {
    /// Mean cross-entropy over the batch.
    pub loss: f32,
    /// Fraction of rows whose argmax equals the label.
    pub accuracy: f32,
    /// Softmax probabilities, same shape as the logits.
    pub probs: Vec<f32>,
}

impl SoftmaxCrossEntropy {
    /// `logits` is `labels.len() × classes`, row-major.
    pub fn forward(logits: &[f32], labels: &[u8], classes: usize) -> LossOutput {
        let mut probs = logits.to_vec();
        softmax_rows(&mut probs, classes);

        let mut total = 0.0f32;
        let mut correct = 0usize;
        for (row, &label) in probs.chunks_exact(classes).zip(labels.iter()) {
            let y = label as usize;
            total -= (row[y] + EPS).ln();
            if argmax(row) == y {
                correct += 1;
            }
        }

        let n = labels.len().max(1) as f32;
        LossOutput { loss: total / n, accuracy: correct as f32 / n, probs }
    }

    /// Gradient of the mean loss w.r.t. the logits: (p − onehot) / batch.
    pub fn backward(probs: &[f32], labels: &[u8], classes: usize) -> Vec<f32> {
        let scale = 1.0 / labels.len().max(1) as f32;
        let mut grad = probs.to_vec();
        for (row, &label) in grad.chunks_exact_mut(classes).zip(labels.iter()) {
            row[label as usize] -= 1.0;
            for g in row.iter_mut() {
                *g *= scale;
            }
        }
        grad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_logits_give_ln_classes() {
        let out = SoftmaxCrossEntropy::forward(&[0.0; 20], &[0, 3], 10);
        assert!((out.loss - (10.0f32).ln()).abs() < 1e-5);
    }

    #[test]
    fn accuracy_counts_argmax_hits() {
        let logits = [5.0, 0.0, 0.0, 5.0, 5.0, 0.0];
        let out = SoftmaxCrossEntropy::forward(&logits, &[0, 1, 1], 2);
        assert!((out.accuracy - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn gradient_rows_sum_to_zero() {
        let logits = [1.0, -2.0, 0.5, 0.0, 0.0, 3.0];
        let out = SoftmaxCrossEntropy::forward(&logits, &[2, 0], 3);
        let grad = SoftmaxCrossEntropy::backward(&out.probs, &[2, 0], 3);
        for row in grad.chunks(3) {
            assert!(row.iter().sum::<f32>().abs() < 1e-6);
        }
        assert!(grad[2] < 0.0 && grad[3] < 0.0);
    }
}
