//! Loading CIFAR-10 batch files from a directory.

use std::fs;
use std::path::Path;

use cifar_convnet::data::cifar::{load_cifar10, RECORD_SIZE, SAMPLE_SIZE, TEST_FILE, TRAIN_FILES};
use cifar_convnet::Error;
use tempfile::tempdir;

/// Writes `count` records whose label is `first_label + i` (mod 10) and whose
/// pixels are all equal to the label.
fn write_batch(path: &Path, count: usize, first_label: u8) {
    let mut bytes = Vec::with_capacity(count * RECORD_SIZE);
    for i in 0..count {
        let label = (first_label as usize + i) as u8 % 10;
        bytes.push(label);
        bytes.extend(std::iter::repeat(label).take(SAMPLE_SIZE));
    }
    fs::write(path, bytes).unwrap();
}

fn write_dataset(dir: &Path) {
    for (i, name) in TRAIN_FILES.iter().enumerate() {
        write_batch(&dir.join(name), 3, i as u8);
    }
    write_batch(&dir.join(TEST_FILE), 4, 7);
}

#[test]
fn concatenates_training_batches_in_order() {
    let dir = tempdir().unwrap();
    write_dataset(dir.path());

    let data = load_cifar10(dir.path()).unwrap();

    assert_eq!(data.train.len(), 15);
    assert_eq!(data.test.len(), 4);
    assert_eq!(data.train.sample_size(), SAMPLE_SIZE);
    assert_eq!(data.test.sample_size(), SAMPLE_SIZE);
    assert_eq!(&data.train.labels()[..6], &[0, 1, 2, 1, 2, 3]);
    assert_eq!(data.test.labels(), &[7, 8, 9, 0]);

    // Pixel value equals the label byte, scaled into [0, 1].
    let image = data.train.image(2);
    assert_eq!(image.len(), SAMPLE_SIZE);
    assert!(image.iter().all(|&p| (p - 2.0 / 255.0).abs() < 1e-7));
}

#[test]
fn missing_batch_names_the_file() {
    let dir = tempdir().unwrap();
    write_dataset(dir.path());
    fs::remove_file(dir.path().join(TEST_FILE)).unwrap();

    match load_cifar10(dir.path()) {
        Err(Error::Io { path, .. }) => assert!(path.ends_with(TEST_FILE)),
        other => panic!("expected io error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn truncated_batch_is_a_format_error() {
    let dir = tempdir().unwrap();
    write_dataset(dir.path());
    let path = dir.path().join(TRAIN_FILES[2]);
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 10]).unwrap();

    match load_cifar10(dir.path()) {
        Err(Error::Format(msg)) => assert!(msg.contains(TRAIN_FILES[2])),
        other => panic!("expected format error, got {:?}", other.map(|_| ())),
    }
}
