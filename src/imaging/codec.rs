//! Decoding and encoding rasters through the `image` crate.

use super::{Raster, CHANNELS};
use image::ImageResult;
use std::path::Path;

/// Reads an image file (format picked from its contents/extension) into a BGR raster.
pub fn decode_file(path: impl AsRef<Path>) -> ImageResult<Raster> {
    let mut rgb = image::open(path.as_ref())?.to_rgb8();
    swap_red_blue(&mut rgb);
    Ok(Raster::from_buffer(rgb))
}

/// Writes a raster to `path`; the format follows the file extension.
pub fn encode_file(raster: &Raster, path: impl AsRef<Path>) -> ImageResult<()> {
    let mut rgb = raster.to_buffer();
    swap_red_blue(&mut rgb);
    rgb.save(path.as_ref())
}

fn swap_red_blue(data: &mut [u8]) {
    for px in data.chunks_exact_mut(CHANNELS) {
        px.swap(0, 2);
    }
}
