use std::fmt;
use std::path::PathBuf;

use crate::optim::OptimizerKind;

/// Compute device requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Host,
    Accelerator(u32),
}

impl Device {
    /// Non-negative ids select an accelerator, negative ones the host.
    pub fn from_id(id: i32) -> Device {
        if id >= 0 {
            Device::Accelerator(id as u32)
        } else {
            Device::Host
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Device::Host => -1,
            Device::Accelerator(id) => *id as i32,
        }
    }
}

/// Settings for one training run, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub device: Device,
    pub epochs: usize,
    pub batch_size: usize,
    pub optimizer: OptimizerKind,
    pub data_dir: PathBuf,
    pub output: PathBuf,
    pub seed: Option<u64>,
}

impl fmt::Display for RunConfig {
    /// The `[settings]` block printed before training starts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[settings]")?;
        writeln!(f, "- GPU: {}", self.device.id())?;
        writeln!(f, "- minibatch-size: {}", self.batch_size)?;
        writeln!(f, "- epoch: {}", self.epochs)?;
        write!(f, "{}", self.optimizer)
    }
}
