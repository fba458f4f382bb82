use serde::{Deserialize, Serialize};

/// Describes how to interpret the input fed to a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputType {
    /// RGB image resized to width×height, normalized to [0, 1], stored
    /// channel-first (all R, then all G, then all B).
    ImageRgbPlanar { width: u32, height: u32 },
}

/// Optional annotations saved alongside the weights.
/// All fields are `Option<>` so models without metadata still deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub description: Option<String>,
    pub input_type: Option<InputType>,
    /// Human-readable class labels for the output layer.
    pub output_labels: Option<Vec<String>>,
}

impl ModelMetadata {
    /// Label for class `index`, falling back to the index itself.
    pub fn label(&self, index: usize) -> String {
        self.output_labels
            .as_ref()
            .and_then(|labels| labels.get(index).cloned())
            .unwrap_or_else(|| index.to_string())
    }
}
