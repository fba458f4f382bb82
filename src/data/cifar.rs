//! Reader for the CIFAR-10 binary distribution (`cifar-10-batches-bin`).
//!
//! # Record layout
//! ```text
//! byte  0:          label (class index 0-9)
//! bytes 1-1024:     red channel, 32×32, row-major
//! bytes 1025-2048:  green channel
//! bytes 2049-3072:  blue channel
//! ```
//! Each batch file is a plain concatenation of 3073-byte records (10 000 per
//! file in the official release). The pixel block already is channel-first,
//! so an image maps onto a `(3, 32, 32)` tensor without reordering.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::data::image_set::ImageSet;
use crate::error::{Error, Result};

pub const CHANNELS: usize = 3;
pub const HEIGHT: usize = 32;
pub const WIDTH: usize = 32;
pub const SAMPLE_SIZE: usize = CHANNELS * HEIGHT * WIDTH;
pub const RECORD_SIZE: usize = SAMPLE_SIZE + 1;
pub const NUM_CLASSES: usize = 10;

pub const TRAIN_FILES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];
pub const TEST_FILE: &str = "test_batch.bin";

pub const CLASS_NAMES: [&str; NUM_CLASSES] = [
    "airplane", "automobile", "bird", "cat", "deer", "dog", "frog", "horse", "ship", "truck",
];

/// Training and test sets, loaded once and held for the whole run.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub train: ImageSet,
    pub test: ImageSet,
}

/// Parses a buffer of CIFAR-10 records, dividing every pixel by 255 so
/// values lie in `[0.0, 1.0]`.
pub fn parse_records(bytes: &[u8]) -> Result<ImageSet> {
    if bytes.is_empty() {
        return Err(Error::Format("CIFAR-10 batch is empty.".to_owned()));
    }
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(Error::Format(format!(
            "CIFAR-10 batch is {} bytes, which is not a whole number of {}-byte records.",
            bytes.len(),
            RECORD_SIZE
        )));
    }

    let n_items = bytes.len() / RECORD_SIZE;
    let mut images = Vec::with_capacity(n_items * SAMPLE_SIZE);
    let mut labels = Vec::with_capacity(n_items);

    for record in bytes.chunks_exact(RECORD_SIZE) {
        labels.push(record[0]);
        images.extend(record[1..].iter().map(|&px| px as f32 / 255.0));
    }

    ImageSet::new(images, labels, SAMPLE_SIZE, NUM_CLASSES)
}

fn read_batch(path: &Path) -> Result<ImageSet> {
    let bytes = fs::read(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    let set = parse_records(&bytes).map_err(|e| match e {
        Error::Format(msg) => Error::Format(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;
    debug!("read {} images from {}", set.len(), path.display());
    Ok(set)
}

/// Loads the five training batches and the test batch from `dir`.
pub fn load_cifar10(dir: &Path) -> Result<Dataset> {
    let paths: Vec<PathBuf> = TRAIN_FILES.iter().map(|f| dir.join(f)).collect();

    let mut train = read_batch(&paths[0])?;
    for path in &paths[1..] {
        train.extend(read_batch(path)?)?;
    }
    let test = read_batch(&dir.join(TEST_FILE))?;

    Ok(Dataset { train, test })
}
