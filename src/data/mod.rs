pub mod cifar;
pub mod image_input;
pub mod image_set;

pub use cifar::{load_cifar10, parse_records, Dataset};
pub use image_input::load_rgb_planar;
pub use image_set::ImageSet;
