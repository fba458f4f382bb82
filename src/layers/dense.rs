use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::ActivationFunction;
use crate::layers::Gradients;
use crate::math::{he_normal, lecun_normal};

/// Fully connected layer over a batch of flat row vectors.
///
/// `weights` is stored input-major: the weight from input `i` to output `j`
/// lives at `i * output_size + j`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dense {
    pub input_size: usize,
    pub output_size: usize,
    pub weights: Vec<f32>,
    pub biases: Vec<f32>,
    pub activator: ActivationFunction,
}

impl Dense {
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Dense {
        let len = input_size * output_size;
        let weights = match activation {
            ActivationFunction::ReLU => he_normal(len, input_size, rng),
            ActivationFunction::Identity => lecun_normal(len, input_size, rng),
        };
        Dense {
            input_size,
            output_size,
            weights,
            biases: vec![0.0; output_size],
            activator: activation,
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// y = σ(xW + b) for each of the `batch` rows of `input`.
    pub fn forward(&self, input: &[f32], batch: usize) -> Vec<f32> {
        let mut output = Vec::with_capacity(batch * self.output_size);
        for _ in 0..batch {
            output.extend_from_slice(&self.biases);
        }

        for b in 0..batch {
            let x = &input[b * self.input_size..(b + 1) * self.input_size];
            let y = &mut output[b * self.output_size..(b + 1) * self.output_size];
            for (i, &xi) in x.iter().enumerate() {
                // Post-ReLU inputs are mostly zero.
                if xi == 0.0 {
                    continue;
                }
                let row = &self.weights[i * self.output_size..(i + 1) * self.output_size];
                for (yj, &w) in y.iter_mut().zip(row.iter()) {
                    *yj += xi * w;
                }
            }
        }

        self.activator.apply_inplace(&mut output);
        output
    }

    /// Backward pass. `output` is what `forward` returned for `input`;
    /// `grad_output` is ∂L/∂y in activation space.
    pub fn backward(
        &self,
        input: &[f32],
        output: &[f32],
        grad_output: &[f32],
        batch: usize,
        need_input_grad: bool,
    ) -> Gradients {
        let mut delta = grad_output.to_vec();
        self.activator.backprop_inplace(&mut delta, output);

        let mut grad_w = vec![0.0f32; self.weights.len()];
        let mut grad_b = vec![0.0f32; self.output_size];
        let mut grad_in = vec![0.0f32; if need_input_grad { batch * self.input_size } else { 0 }];

        for b in 0..batch {
            let x = &input[b * self.input_size..(b + 1) * self.input_size];
            let d = &delta[b * self.output_size..(b + 1) * self.output_size];

            for (gb, &dj) in grad_b.iter_mut().zip(d.iter()) {
                *gb += dj;
            }

            for (i, &xi) in x.iter().enumerate() {
                let range = i * self.output_size..(i + 1) * self.output_size;
                if xi != 0.0 {
                    for (gw, &dj) in grad_w[range.clone()].iter_mut().zip(d.iter()) {
                        *gw += xi * dj;
                    }
                }
                if need_input_grad {
                    grad_in[b * self.input_size + i] = self.weights[range]
                        .iter()
                        .zip(d.iter())
                        .map(|(w, dj)| w * dj)
                        .sum();
                }
            }
        }

        Gradients { weights: grad_w, biases: grad_b, input: grad_in }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed_layer() -> Dense {
        Dense {
            input_size: 2,
            output_size: 3,
            weights: vec![1.0, 0.0, -1.0, 2.0, 1.0, 0.5],
            biases: vec![0.1, 0.2, 0.3],
            activator: ActivationFunction::Identity,
        }
    }

    #[test]
    fn forward_computes_affine_map_per_row() {
        let layer = fixed_layer();
        let out = layer.forward(&[1.0, 1.0, 0.0, 2.0], 2);
        let expected = [3.1, 1.2, -0.2, 4.1, 2.2, 1.3];
        for (o, e) in out.iter().zip(expected.iter()) {
            assert!((o - e).abs() < 1e-6, "{} vs {}", o, e);
        }
    }

    #[test]
    fn backward_matches_hand_computed_gradients() {
        let layer = fixed_layer();
        let input = [1.0, 2.0];
        let output = layer.forward(&input, 1);
        let grads = layer.backward(&input, &output, &[1.0, 0.0, -1.0], 1, true);

        assert_eq!(grads.biases, vec![1.0, 0.0, -1.0]);
        assert_eq!(grads.weights, vec![1.0, 0.0, -1.0, 2.0, 0.0, -2.0]);
        // dx_i = sum_j w_ij * d_j
        assert_eq!(grads.input, vec![2.0, 1.5]);
    }

    #[test]
    fn relu_layer_shapes() {
        let mut rng = StdRng::seed_from_u64(1);
        let layer = Dense::new(8, 4, ActivationFunction::ReLU, &mut rng);
        assert_eq!(layer.parameter_count(), 8 * 4 + 4);
        let out = layer.forward(&vec![0.5; 3 * 8], 3);
        assert_eq!(out.len(), 12);
        assert!(out.iter().all(|&v| v >= 0.0));
    }
}
