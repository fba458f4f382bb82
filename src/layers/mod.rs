pub mod conv2d;
pub mod dense;
pub mod pool;

pub use conv2d::Conv2d;
pub use dense::Dense;
pub use pool::MaxPool2d;

/// Gradients produced by one layer's backward pass.
///
/// `input` is ∂L/∂x for the layer below; it is left empty when the caller
/// asked the layer not to compute it (first layer of the network).
#[derive(Debug, Clone)]
pub struct Gradients {
    pub weights: Vec<f32>,
    pub biases: Vec<f32>,
    pub input: Vec<f32>,
}
