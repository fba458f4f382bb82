use std::path::Path;

use crate::error::{Error, Result};
use crate::loss::SoftmaxCrossEntropy;
use crate::network::ConvNet;
use crate::optim::Optimizer;

/// Loss and accuracy of one batch, both from the same forward pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutput {
    pub loss: f32,
    pub accuracy: f32,
}

/// What the training loop needs from a model/optimizer pair.
///
/// `images` holds `labels.len()` samples back to back.
pub trait Learner {
    /// Forward, backward and one parameter update on a batch.
    fn train_step(&mut self, images: &[f32], labels: &[u8]) -> Result<StepOutput>;

    /// Forward only; parameters are left untouched.
    fn eval_step(&self, images: &[f32], labels: &[u8]) -> Result<StepOutput>;

    /// Writes the full parameter state to `path`.
    fn save(&self, path: &Path) -> Result<()>;
}

/// A [`ConvNet`] trained with softmax cross-entropy and a boxed optimizer.
pub struct ConvNetLearner {
    pub network: ConvNet,
    optimizer: Box<dyn Optimizer>,
}

impl ConvNetLearner {
    pub fn new(network: ConvNet, optimizer: Box<dyn Optimizer>) -> ConvNetLearner {
        ConvNetLearner { network, optimizer }
    }

    pub fn optimizer_name(&self) -> &'static str {
        self.optimizer.name()
    }

    fn check_batch(&self, images: &[f32], labels: &[u8]) -> Result<()> {
        let expected = labels.len() * self.network.spec.input_size();
        if images.len() != expected {
            return Err(Error::Shape { expected, actual: images.len() });
        }
        Ok(())
    }
}

impl Learner for ConvNetLearner {
    fn train_step(&mut self, images: &[f32], labels: &[u8]) -> Result<StepOutput> {
        self.check_batch(images, labels)?;
        let batch = labels.len();
        let classes = self.network.spec.classes;

        let acts = self.network.forward(images, batch);
        let out = SoftmaxCrossEntropy::forward(&acts.logits, labels, classes);
        let grad_logits = SoftmaxCrossEntropy::backward(&out.probs, labels, classes);
        let grads = self.network.backward(images, &acts, &grad_logits, batch);

        let mut params = self.network.parameters_mut();
        self.optimizer.step(&mut params, &grads);

        Ok(StepOutput { loss: out.loss, accuracy: out.accuracy })
    }

    fn eval_step(&self, images: &[f32], labels: &[u8]) -> Result<StepOutput> {
        self.check_batch(images, labels)?;
        let acts = self.network.forward(images, labels.len());
        let out = SoftmaxCrossEntropy::forward(&acts.logits, labels, self.network.spec.classes);
        Ok(StepOutput { loss: out.loss, accuracy: out.accuracy })
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.network.save_json(path)
    }
}
