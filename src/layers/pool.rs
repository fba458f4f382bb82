use serde::{Deserialize, Serialize};

/// Non-overlapping max pooling (window = stride = `size`) over channel-first
/// batches. Trailing rows/columns that do not fill a window are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxPool2d {
    pub channels: usize,
    pub input_height: usize,
    pub input_width: usize,
    pub size: usize,
}

impl MaxPool2d {
    pub fn new(channels: usize, input_height: usize, input_width: usize, size: usize) -> MaxPool2d {
        MaxPool2d { channels, input_height, input_width, size }
    }

    pub fn output_height(&self) -> usize {
        self.input_height / self.size
    }

    pub fn output_width(&self) -> usize {
        self.input_width / self.size
    }

    pub fn input_size(&self) -> usize {
        self.channels * self.input_height * self.input_width
    }

    pub fn output_size(&self) -> usize {
        self.channels * self.output_height() * self.output_width()
    }

    /// Returns the pooled values and, for each of them, the flat index into
    /// `input` of the element that won the window (used to route gradients).
    pub fn forward(&self, input: &[f32], batch: usize) -> (Vec<f32>, Vec<usize>) {
        let (out_h, out_w) = (self.output_height(), self.output_width());
        let in_spatial = self.input_height * self.input_width;
        let total = batch * self.output_size();

        let mut output = Vec::with_capacity(total);
        let mut switches = Vec::with_capacity(total);

        for plane in 0..batch * self.channels {
            let base = plane * in_spatial;
            for py in 0..out_h {
                for px in 0..out_w {
                    let mut best = f32::NEG_INFINITY;
                    let mut best_idx = base + py * self.size * self.input_width + px * self.size;
                    for dy in 0..self.size {
                        for dx in 0..self.size {
                            let idx = base
                                + (py * self.size + dy) * self.input_width
                                + px * self.size
                                + dx;
                            if input[idx] > best {
                                best = input[idx];
                                best_idx = idx;
                            }
                        }
                    }
                    output.push(best);
                    switches.push(best_idx);
                }
            }
        }

        (output, switches)
    }

    /// Scatters `grad_output` back onto the winning input positions.
    pub fn backward(&self, grad_output: &[f32], switches: &[usize], batch: usize) -> Vec<f32> {
        let mut grad_input = vec![0.0f32; batch * self.input_size()];
        for (&g, &idx) in grad_output.iter().zip(switches.iter()) {
            grad_input[idx] += g;
        }
        grad_input
    }
}
