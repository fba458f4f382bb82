use std::ops::Range;

use crate::error::{Error, Result};

/// A labeled set of equally-sized images held as flat buffers.
///
/// Image `i` occupies `images[i * sample_size..(i + 1) * sample_size]` and is
/// labeled `labels[i]`.
#[derive(Debug, Clone)]
pub struct ImageSet {
    images: Vec<f32>,
    labels: Vec<u8>,
    sample_size: usize,
}

impl ImageSet {
    /// Checks that the buffers agree in length and every label is a valid
    /// class index.
    pub fn new(images: Vec<f32>, labels: Vec<u8>, sample_size: usize, num_classes: usize) -> Result<ImageSet> {
        let expected = labels.len() * sample_size;
        if images.len() != expected {
            return Err(Error::Shape { expected, actual: images.len() });
        }
        if let Some((i, &label)) = labels.iter().enumerate().find(|(_, &l)| l as usize >= num_classes) {
            return Err(Error::Format(format!(
                "label at index {} is {}, out of range for {} classes",
                i, label, num_classes
            )));
        }
        Ok(ImageSet { images, labels, sample_size })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn image(&self, index: usize) -> &[f32] {
        &self.images[index * self.sample_size..(index + 1) * self.sample_size]
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Contiguous samples `range`, in stored order.
    pub fn slice(&self, range: Range<usize>) -> (&[f32], &[u8]) {
        let pixels = range.start * self.sample_size..range.end * self.sample_size;
        (&self.images[pixels], &self.labels[range])
    }

    /// Copies the samples named by `indices` into fresh contiguous buffers,
    /// keeping each image next to its own label.
    pub fn gather(&self, indices: &[usize]) -> (Vec<f32>, Vec<u8>) {
        let mut images = Vec::with_capacity(indices.len() * self.sample_size);
        let mut labels = Vec::with_capacity(indices.len());
        for &idx in indices {
            images.extend_from_slice(self.image(idx));
            labels.push(self.labels[idx]);
        }
        (images, labels)
    }

    /// Appends another set with the same sample size.
    pub fn extend(&mut self, other: ImageSet) -> Result<()> {
        if other.sample_size != self.sample_size {
            return Err(Error::Shape { expected: self.sample_size, actual: other.sample_size });
        }
        self.images.extend(other.images);
        self.labels.extend(other.labels);
        Ok(())
    }
}
