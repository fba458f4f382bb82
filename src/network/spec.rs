use serde::{Deserialize, Serialize};

/// Architecture of the convolutional classifier:
///
/// ```text
/// conv(channels → filters, kernel×kernel, same padding) + ReLU
/// → max-pool 2×2
/// → dense(filters·(h/2)·(w/2) → hidden) + ReLU
/// → dense(hidden → classes)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvNetSpec {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub filters: usize,
    pub hidden: usize,
    pub classes: usize,
    pub kernel: usize,
}

impl ConvNetSpec {
    /// The CIFAR-10 network: 32×32 RGB input, 32 filters, 512 hidden units,
    /// 10 classes.
    pub fn cifar10() -> ConvNetSpec {
        ConvNetSpec { width: 32, height: 32, channels: 3, filters: 32, hidden: 512, classes: 10, kernel: 3 }
    }

    /// Number of `f32` values in one input image.
    pub fn input_size(&self) -> usize {
        self.channels * self.height * self.width
    }
}
