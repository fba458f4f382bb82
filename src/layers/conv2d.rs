//! 2D convolution over channel-first image batches.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::ActivationFunction;
use crate::layers::Gradients;
use crate::math::he_normal;

/// Convolutional layer with square kernels, symmetric zero padding and a
/// fixed stride.
///
/// Tensors are flat `f32` buffers in `(batch, channel, row, col)` order.
/// `weights` holds `out_channels × in_channels × kernel × kernel` values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conv2d {
    pub in_channels: usize,
    pub out_channels: usize,
    pub kernel_size: usize,
    pub padding: usize,
    pub stride: usize,
    pub input_height: usize,
    pub input_width: usize,
    pub weights: Vec<f32>,
    pub biases: Vec<f32>,
    pub activator: ActivationFunction,
}

impl Conv2d {
    /// Creates a layer with He-normal filters and zero biases.
    #[allow(clippy::too_many_arguments)]
    pub fn new<R: Rng + ?Sized>(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        padding: usize,
        stride: usize,
        input_height: usize,
        input_width: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Conv2d {
        let fan_in = in_channels * kernel_size * kernel_size;
        Conv2d {
            in_channels,
            out_channels,
            kernel_size,
            padding,
            stride,
            input_height,
            input_width,
            weights: he_normal(out_channels * fan_in, fan_in, rng),
            biases: vec![0.0; out_channels],
            activator: activation,
        }
    }

    /// (input_height + 2·padding − kernel) / stride + 1
    pub fn output_height(&self) -> usize {
        (self.input_height + 2 * self.padding - self.kernel_size) / self.stride + 1
    }

    /// (input_width + 2·padding − kernel) / stride + 1
    pub fn output_width(&self) -> usize {
        (self.input_width + 2 * self.padding - self.kernel_size) / self.stride + 1
    }

    pub fn input_size(&self) -> usize {
        self.in_channels * self.input_height * self.input_width
    }

    pub fn output_size(&self) -> usize {
        self.out_channels * self.output_height() * self.output_width()
    }

    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    fn weight_index(&self, oc: usize, ic: usize, ky: usize, kx: usize) -> usize {
        ((oc * self.in_channels + ic) * self.kernel_size + ky) * self.kernel_size + kx
    }

    /// Input coordinate read by output position `o` at kernel offset `k`,
    /// or `None` when it falls in the zero padding.
    fn tap(&self, o: usize, k: usize, extent: usize) -> Option<usize> {
        (o * self.stride + k)
            .checked_sub(self.padding)
            .filter(|&i| i < extent)
    }

    pub fn forward(&self, input: &[f32], batch: usize) -> Vec<f32> {
        let (out_h, out_w) = (self.output_height(), self.output_width());
        let out_spatial = out_h * out_w;
        let in_spatial = self.input_height * self.input_width;
        let in_len = self.input_size();
        let out_len = self.out_channels * out_spatial;

        let mut output = vec![0.0f32; batch * out_len];

        for b in 0..batch {
            let x = &input[b * in_len..(b + 1) * in_len];
            let y = &mut output[b * out_len..(b + 1) * out_len];

            for oc in 0..self.out_channels {
                let plane = &mut y[oc * out_spatial..(oc + 1) * out_spatial];
                plane.fill(self.biases[oc]);

                for ic in 0..self.in_channels {
                    let channel = &x[ic * in_spatial..(ic + 1) * in_spatial];
                    for ky in 0..self.kernel_size {
                        for kx in 0..self.kernel_size {
                            let w = self.weights[self.weight_index(oc, ic, ky, kx)];
                            for oy in 0..out_h {
                                let Some(iy) = self.tap(oy, ky, self.input_height) else {
                                    continue;
                                };
                                let row = &channel[iy * self.input_width..(iy + 1) * self.input_width];
                                for ox in 0..out_w {
                                    if let Some(ix) = self.tap(ox, kx, self.input_width) {
                                        plane[oy * out_w + ox] += w * row[ix];
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        self.activator.apply_inplace(&mut output);
        output
    }

    /// Backward pass. `output` is what `forward` returned for `input`.
    pub fn backward(
        &self,
        input: &[f32],
        output: &[f32],
        grad_output: &[f32],
        batch: usize,
        need_input_grad: bool,
    ) -> Gradients {
        let (out_h, out_w) = (self.output_height(), self.output_width());
        let out_spatial = out_h * out_w;
        let in_spatial = self.input_height * self.input_width;
        let in_len = self.input_size();
        let out_len = self.out_channels * out_spatial;

        let mut delta = grad_output.to_vec();
        self.activator.backprop_inplace(&mut delta, output);

        let mut grad_w = vec![0.0f32; self.weights.len()];
        let mut grad_b = vec![0.0f32; self.out_channels];
        let mut grad_in = vec![0.0f32; if need_input_grad { batch * in_len } else { 0 }];

        for b in 0..batch {
            let x = &input[b * in_len..(b + 1) * in_len];
            let d = &delta[b * out_len..(b + 1) * out_len];

            for oc in 0..self.out_channels {
                let d_plane = &d[oc * out_spatial..(oc + 1) * out_spatial];
                grad_b[oc] += d_plane.iter().sum::<f32>();

                for ic in 0..self.in_channels {
                    let channel = &x[ic * in_spatial..(ic + 1) * in_spatial];
                    for ky in 0..self.kernel_size {
                        for kx in 0..self.kernel_size {
                            let w_idx = self.weight_index(oc, ic, ky, kx);
                            let w = self.weights[w_idx];
                            let mut acc = 0.0f32;

                            for oy in 0..out_h {
                                let Some(iy) = self.tap(oy, ky, self.input_height) else {
                                    continue;
                                };
                                for ox in 0..out_w {
                                    let Some(ix) = self.tap(ox, kx, self.input_width) else {
                                        continue;
                                    };
                                    let g = d_plane[oy * out_w + ox];
                                    let in_idx = iy * self.input_width + ix;
                                    acc += g * channel[in_idx];
                                    if need_input_grad {
                                        grad_in[b * in_len + ic * in_spatial + in_idx] += g * w;
                                    }
                                }
                            }

                            grad_w[w_idx] += acc;
                        }
                    }
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

    fn identity_conv(padding: usize) -> Conv2d {
        // One 3x3 filter that copies the centre pixel.
        let mut weights = vec![0.0; 9];
        weights[4] = 1.0;
        Conv2d {
            in_channels: 1,
            out_channels: 1,
            kernel_size: 3,
            padding,
            stride: 1,
            input_height: 4,
            input_width: 4,
            weights,
            biases: vec![0.5],
            activator: ActivationFunction::Identity,
        }
    }

    #[test]
    fn output_dimensions() {
        let mut rng = StdRng::seed_from_u64(42);
        let same = Conv2d::new(3, 32, 3, 1, 1, 32, 32, ActivationFunction::ReLU, &mut rng);
        assert_eq!((same.output_height(), same.output_width()), (32, 32));
        assert_eq!(same.parameter_count(), 32 * 3 * 9 + 32);

        let valid = Conv2d::new(1, 8, 3, 0, 1, 28, 28, ActivationFunction::ReLU, &mut rng);
        assert_eq!((valid.output_height(), valid.output_width()), (26, 26));
    }

    #[test]
    fn centre_tap_filter_copies_input() {
        let conv = identity_conv(1);
        let input: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let out = conv.forward(&input, 1);
        let expected: Vec<f32> = input.iter().map(|v| v + 0.5).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn backward_of_centre_tap_routes_gradient_back() {
        let conv = identity_conv(0);
        let input: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let out = conv.forward(&input, 1);
        assert_eq!(out, vec![5.5, 6.5, 9.5, 10.5]);

        let grads = conv.backward(&input, &out, &[1.0, 1.0, 1.0, 1.0], 1, true);
        assert_eq!(grads.biases, vec![4.0]);
        // Centre weight sees the four inner pixels 5, 6, 9, 10.
        assert_eq!(grads.weights[4], 30.0);
        // Top-left weight sees 0, 1, 4, 5.
        assert_eq!(grads.weights[0], 10.0);

        let gi = grads.input;
        assert_eq!(gi[5], 1.0);
        assert_eq!(gi[0], 0.0);
    }
}
