use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::layers::{Conv2d, Dense, MaxPool2d};
use crate::math::softmax_rows;
use crate::network::metadata::{InputType, ModelMetadata};
use crate::network::spec::ConvNetSpec;

const POOL: usize = 2;

/// Convolutional classifier: conv + ReLU → max-pool → dense + ReLU → dense.
///
/// Layers never mutate themselves during a pass; everything the backward pass
/// needs is returned in [`Activations`]. Parameters change only through
/// [`ConvNet::parameters_mut`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvNet {
    pub spec: ConvNetSpec,
    pub conv: Conv2d,
    pub pool: MaxPool2d,
    pub hidden: Dense,
    pub output: Dense,
    #[serde(default)]
    pub metadata: ModelMetadata,
}

/// Intermediate values of one forward pass over a batch.
pub struct Activations {
    pub conv: Vec<f32>,
    pub pooled: Vec<f32>,
    pub switches: Vec<usize>,
    pub hidden: Vec<f32>,
    pub logits: Vec<f32>,
}

impl ConvNet {
    pub fn new<R: Rng + ?Sized>(spec: ConvNetSpec, rng: &mut R) -> ConvNet {
        let conv = Conv2d::new(
            spec.channels,
            spec.filters,
            spec.kernel,
            spec.kernel / 2,
            1,
            spec.height,
            spec.width,
            ActivationFunction::ReLU,
            rng,
        );
        let pool = MaxPool2d::new(spec.filters, conv.output_height(), conv.output_width(), POOL);
        let hidden = Dense::new(pool.output_size(), spec.hidden, ActivationFunction::ReLU, rng);
        let output = Dense::new(spec.hidden, spec.classes, ActivationFunction::Identity, rng);

        ConvNet { spec, conv, pool, hidden, output, metadata: ModelMetadata::default() }
    }

    pub fn parameter_count(&self) -> usize {
        self.conv.parameter_count() + self.hidden.parameter_count() + self.output.parameter_count()
    }

    pub fn forward(&self, images: &[f32], batch: usize) -> Activations {
        let conv = self.conv.forward(images, batch);
        let (pooled, switches) = self.pool.forward(&conv, batch);
        let hidden = self.hidden.forward(&pooled, batch);
        let logits = self.output.forward(&hidden, batch);
        Activations { conv, pooled, switches, hidden, logits }
    }

    /// Backpropagates ∂L/∂logits through the network.
    ///
    /// Returns one gradient per parameter tensor, in the same order as
    /// [`ConvNet::parameters_mut`].
    pub fn backward(
        &self,
        images: &[f32],
        acts: &Activations,
        grad_logits: &[f32],
        batch: usize,
    ) -> Vec<Vec<f32>> {
        let out = self.output.backward(&acts.hidden, &acts.logits, grad_logits, batch, true);
        let hid = self.hidden.backward(&acts.pooled, &acts.hidden, &out.input, batch, true);
        let grad_conv = self.pool.backward(&hid.input, &acts.switches, batch);
        let conv = self.conv.backward(images, &acts.conv, &grad_conv, batch, false);

        vec![conv.weights, conv.biases, hid.weights, hid.biases, out.weights, out.biases]
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut [f32]> {
        vec![
            self.conv.weights.as_mut_slice(),
            self.conv.biases.as_mut_slice(),
            self.hidden.weights.as_mut_slice(),
            self.hidden.biases.as_mut_slice(),
            self.output.weights.as_mut_slice(),
            self.output.biases.as_mut_slice(),
        ]
    }

    /// Class probabilities for a batch of images.
    pub fn predict(&self, images: &[f32], batch: usize) -> Vec<f32> {
        let mut probs = self.forward(images, batch).logits;
        softmax_rows(&mut probs, self.spec.classes);
        probs
    }

    /// Serializes the whole network to a pretty-printed JSON file, replacing
    /// any existing file at `path`.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|source| Error::Json { path: path.to_path_buf(), source })
    }

    /// Deserializes a network previously written by `save_json` and checks
    /// that its layers fit together.
    pub fn load_json(path: &Path) -> Result<ConvNet> {
        let file = File::open(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        let reader = BufReader::new(file);
        let network: ConvNet =
            serde_json::from_reader(reader).map_err(|source| Error::Json { path: path.to_path_buf(), source })?;
        network.validate()?;
        Ok(network)
    }

    /// Checks every layer's geometry and buffer lengths against `spec` and
    /// against the neighbouring layers.
    pub fn validate(&self) -> Result<()> {
        let spec = &self.spec;
        let (conv, pool, hidden, output) = (&self.conv, &self.pool, &self.hidden, &self.output);
        if spec.width == 0 || spec.height == 0 {
            return Err(Error::Format(format!("model has an empty input size {}x{}", spec.width, spec.height)));
        }

        // Geometry first: the derived sizes below divide by these.
        check_all(&[
            (spec.channels, conv.in_channels),
            (spec.filters, conv.out_channels),
            (spec.kernel, conv.kernel_size),
            (spec.kernel / 2, conv.padding),
            (1, conv.stride),
            (spec.height, conv.input_height),
            (spec.width, conv.input_width),
            (spec.filters, pool.channels),
            (POOL, pool.size),
        ])?;
        check_all(&[
            (conv.output_height(), pool.input_height),
            (conv.output_width(), pool.input_width),
            (conv.out_channels * conv.in_channels * conv.kernel_size * conv.kernel_size, conv.weights.len()),
            (conv.out_channels, conv.biases.len()),
            (pool.output_size(), hidden.input_size),
            (spec.hidden, hidden.output_size),
            (hidden.input_size * hidden.output_size, hidden.weights.len()),
            (spec.hidden, hidden.biases.len()),
            (spec.hidden, output.input_size),
            (spec.classes, output.output_size),
            (spec.hidden * spec.classes, output.weights.len()),
            (spec.classes, output.biases.len()),
        ])?;

        if let Some(InputType::ImageRgbPlanar { width, height }) = self.metadata.input_type {
            check_all(&[(spec.width, width as usize), (spec.height, height as usize)])?;
        }
        Ok(())
    }

    /// Width and height images are resized to before `predict`: the size
    /// recorded in the metadata, or the architecture's input size.
    pub fn image_size(&self) -> (u32, u32) {
        match self.metadata.input_type {
            Some(InputType::ImageRgbPlanar { width, height }) => (width, height),
            None => (self.spec.width as u32, self.spec.height as u32),
        }
    }
}

fn check_all(pairs: &[(usize, usize)]) -> Result<()> {
    match pairs.iter().find(|(expected, actual)| expected != actual) {
        Some(&(expected, actual)) => Err(Error::Shape { expected, actual }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiny_spec() -> ConvNetSpec {
        ConvNetSpec { width: 4, height: 4, channels: 2, filters: 3, hidden: 5, classes: 4, kernel: 3 }
    }

    #[test]
    fn cifar_network_layer_sizes() {
        let net = ConvNet::new(ConvNetSpec::cifar10(), &mut StdRng::seed_from_u64(0));
        assert_eq!(net.conv.output_size(), 32 * 32 * 32);
        assert_eq!(net.pool.output_size(), 32 * 16 * 16);
        assert_eq!(net.hidden.input_size, 8192);
        assert_eq!(net.output.output_size, 10);
        assert_eq!(
            net.parameter_count(),
            (32 * 27 + 32) + (8192 * 512 + 512) + (512 * 10 + 10)
        );
    }

    #[test]
    fn gradients_line_up_with_parameters() {
        let mut net = ConvNet::new(tiny_spec(), &mut StdRng::seed_from_u64(1));
        let images = vec![0.3; 2 * tiny_spec().input_size()];
        let acts = net.forward(&images, 2);
        assert_eq!(acts.logits.len(), 2 * 4);

        let grads = net.backward(&images, &acts, &vec![0.1; 8], 2);
        let shapes: Vec<usize> = net.parameters_mut().iter().map(|p| p.len()).collect();
        let grad_shapes: Vec<usize> = grads.iter().map(|g| g.len()).collect();
        assert_eq!(shapes, grad_shapes);
    }

    #[test]
    fn fresh_network_validates() {
        assert!(ConvNet::new(ConvNetSpec::cifar10(), &mut StdRng::seed_from_u64(3)).validate().is_ok());
        assert!(ConvNet::new(tiny_spec(), &mut StdRng::seed_from_u64(3)).validate().is_ok());
    }

    #[test]
    fn validate_rejects_mismatched_layers() {
        let net = ConvNet::new(tiny_spec(), &mut StdRng::seed_from_u64(4));

        let mut short_bias = net.clone();
        short_bias.output.biases.pop();
        assert!(matches!(short_bias.validate(), Err(Error::Shape { expected: 4, actual: 3 })));

        let mut wide_hidden = net.clone();
        wide_hidden.hidden.input_size += 1;
        assert!(matches!(wide_hidden.validate(), Err(Error::Shape { .. })));

        let mut zero_pool = net.clone();
        zero_pool.pool.size = 0;
        assert!(matches!(zero_pool.validate(), Err(Error::Shape { expected: POOL, actual: 0 })));

        let mut resized = net;
        resized.metadata.input_type = Some(InputType::ImageRgbPlanar { width: 8, height: 4 });
        assert!(matches!(resized.validate(), Err(Error::Shape { expected: 4, actual: 8 })));
    }

    #[test]
    fn image_size_prefers_metadata() {
        let mut net = ConvNet::new(tiny_spec(), &mut StdRng::seed_from_u64(5));
        assert_eq!(net.image_size(), (4, 4));

        net.spec.width = 6;
        net.metadata.input_type = Some(InputType::ImageRgbPlanar { width: 6, height: 4 });
        assert_eq!(net.image_size(), (6, 4));
    }

    #[test]
    fn predict_returns_distributions() {
        let net = ConvNet::new(tiny_spec(), &mut StdRng::seed_from_u64(2));
        let probs = net.predict(&vec![0.5; 3 * tiny_spec().input_size()], 3);
        for row in probs.chunks(4) {
            assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        }
    }
}
