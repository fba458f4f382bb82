pub mod init;
pub mod ops;

pub use init::{he_normal, lecun_normal};
pub use ops::{argmax, softmax_rows};
