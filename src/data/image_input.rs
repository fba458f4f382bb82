use std::path::Path;

use crate::error::{Error, Result};

/// Decodes an image file (PNG/JPEG/BMP/GIF), resizes it to `width × height`
/// and returns it channel-first (all R, then all G, then all B) with pixels
/// normalized to [0, 1]: the layout the network was trained on.
pub fn load_rgb_planar(path: &Path, width: u32, height: u32) -> Result<Vec<f32>> {
    let img = image::open(path).map_err(|source| Error::Image { path: path.to_path_buf(), source })?;
    let resized = img.resize_exact(width, height, image::imageops::FilterType::Lanczos3);
    let rgb = resized.to_rgb8();

    let plane = (width * height) as usize;
    let mut out = vec![0.0f32; 3 * plane];
    for (i, pixel) in rgb.pixels().enumerate() {
        for (c, &value) in pixel.0.iter().enumerate() {
            out[c * plane + i] = value as f32 / 255.0;
        }
    }
    Ok(out)
}
