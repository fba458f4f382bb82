pub mod metadata;
pub mod network;
pub mod spec;

pub use metadata::{InputType, ModelMetadata};
pub use network::{Activations, ConvNet};
pub use spec::ConvNetSpec;
