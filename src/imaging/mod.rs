//! Raster storage and the pixel primitives the graph's transform nodes are built on.
//!
//! Every primitive takes a borrowed [`Raster`] and returns a freshly allocated one.
//! Pixel data is shared behind an [`Arc`], so cloning a raster (or a [`crate::Value`]
//! holding one) never copies bytes, and nothing here writes into a buffer it did not
//! allocate itself.
//!
//! Channels are stored interleaved in **BGR** order, three bytes per pixel.

pub mod codec;
pub mod font;
pub mod ops;
pub mod warp;

use image::{ImageBuffer, Rgb, RgbImage};
use std::fmt;
use std::sync::Arc;

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 3;

/// Floating point working buffer for filters that must not truncate between passes.
pub(crate) type FloatImage = ImageBuffer<Rgb<f32>, Vec<f32>>;

/// An immutable three-channel 8-bit image.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Arc<Vec<u8>>,
}

impl Raster {
    /// Wraps an interleaved BGR buffer. Returns `None` when the buffer length does not
    /// match `width * height * 3`.
    pub fn from_bgr(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * CHANNELS {
            return None;
        }
        Some(Self {
            width,
            height,
            data: Arc::new(data),
        })
    }

    /// Creates a raster where every pixel is `bgr`.
    pub fn filled(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&bgr);
        }
        Self {
            width,
            height,
            data: Arc::new(data),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw interleaved BGR bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the BGR triple at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// True when the two rasters share the same backing buffer.
    pub fn shares_storage(&self, other: &Raster) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Builds a raster of the same size by mapping every byte of this one.
    pub(crate) fn map_bytes(&self, f: impl Fn(u8) -> u8) -> Raster {
        let data = self.data.iter().map(|&b| f(b)).collect();
        Raster {
            width: self.width,
            height: self.height,
            data: Arc::new(data),
        }
    }

    /// Builds a raster of the same size by mapping every BGR pixel of this one.
    pub(crate) fn map_pixels(&self, f: impl Fn([u8; 3]) -> [u8; 3]) -> Raster {
        let mut data = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(CHANNELS) {
            data.extend_from_slice(&f([px[0], px[1], px[2]]));
        }
        Raster {
            width: self.width,
            height: self.height,
            data: Arc::new(data),
        }
    }

    /// Copies the pixels into a buffer the caller may draw into.
    pub(crate) fn to_vec(&self) -> Vec<u8> {
        self.data.as_ref().clone()
    }

    pub(crate) fn from_parts(width: u32, height: u32, data: Vec<u8>) -> Raster {
        debug_assert_eq!(data.len(), width as usize * height as usize * CHANNELS);
        Raster {
            width,
            height,
            data: Arc::new(data),
        }
    }

    /// Copies the pixels into an `image` buffer. Bytes keep their stored order, so the
    /// buffer's "red" channel is blue.
    pub(crate) fn to_buffer(&self) -> RgbImage {
        RgbImage::from_raw(self.width, self.height, self.to_vec())
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }

    pub(crate) fn from_buffer(buffer: RgbImage) -> Raster {
        let (width, height) = buffer.dimensions();
        Raster::from_parts(width, height, buffer.into_raw())
    }

    pub(crate) fn to_float(&self) -> FloatImage {
        let data = self.data.iter().map(|&b| f32::from(b)).collect();
        FloatImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| FloatImage::new(self.width, self.height))
    }

    /// Rounds a working buffer back to bytes with [`saturate`].
    pub(crate) fn from_float(buffer: &FloatImage) -> Raster {
        let (width, height) = buffer.dimensions();
        let data = buffer.as_raw().iter().map(|&v| saturate(f64::from(v))).collect();
        Raster::from_parts(width, height, data)
    }
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Rounds to the nearest integer, ties to even, and clamps into the byte range.
pub(crate) fn saturate(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round_ties_even().clamp(0.0, 255.0) as u8
}
