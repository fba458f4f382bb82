use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("image decode error at {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("malformed data: {0}")]
    Format(String),
    #[error("shape mismatch: expected {expected}, got {actual}")]
    Shape { expected: usize, actual: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("training diverged in epoch {epoch}: loss = {loss}")]
    Diverged { epoch: usize, loss: f32 },
}
