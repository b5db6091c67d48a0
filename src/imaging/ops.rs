//! Per-pixel and neighbourhood primitives.

use super::{saturate, Raster};
use image::imageops::{self, FilterType};
use imageproc::filter::separable_filter_equal;

/// Coefficients of the classic sepia tone, rows producing B, G, R from a BGR triple.
pub const SEPIA: [[f64; 3]; 3] = [
    [0.272, 0.534, 0.131],
    [0.349, 0.686, 0.168],
    [0.393, 0.769, 0.189],
];

/// Largest kernel side accepted by [`gaussian_blur`].
pub const MAX_KERNEL: u32 = 100;

/// Largest side [`resize`] will produce.
pub const MAX_DIMENSION: u32 = 16_384;

/// Applies a 3x3 matrix to every channel triple: `out[i] = sum_j m[i][j] * in[j]`.
pub fn linear_color_transform(src: &Raster, m: &[[f64; 3]; 3]) -> Raster {
    src.map_pixels(|px| {
        let v = [px[0] as f64, px[1] as f64, px[2] as f64];
        let mut out = [0u8; 3];
        for (i, row) in m.iter().enumerate() {
            out[i] = saturate(row[0] * v[0] + row[1] * v[1] + row[2] * v[2]);
        }
        out
    })
}

/// Bitwise complement of every byte.
pub fn bitwise_not(src: &Raster) -> Raster {
    src.map_bytes(|b| !b)
}

/// Luminance (`0.299 R + 0.587 G + 0.114 B`) replicated into all three channels.
pub fn to_grey(src: &Raster) -> Raster {
    src.map_pixels(|[b, g, r]| {
        let y = saturate(0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64);
        [y, y, y]
    })
}

/// `saturate(alpha * p + beta)` for every byte.
pub fn scale_shift(src: &Raster, alpha: f64, beta: f64) -> Raster {
    src.map_bytes(|b| saturate(alpha * b as f64 + beta))
}

/// Gaussian blur with a square odd kernel of side `ksize`; sigma is derived from the
/// kernel size. Edges are padded by replicating the border pixel. Returns `None` for an
/// even, zero or oversized kernel.
pub fn gaussian_blur(src: &Raster, ksize: u32) -> Option<Raster> {
    if ksize == 0 || ksize % 2 == 0 || ksize > MAX_KERNEL {
        return None;
    }
    if src.width() == 0 || src.height() == 0 {
        return Some(src.map_bytes(|b| b));
    }
    let kernel: Vec<f32> = gaussian_kernel(ksize).into_iter().map(|k| k as f32).collect();
    let blurred = separable_filter_equal(&src.to_float(), &kernel);
    Some(Raster::from_float(&blurred))
}

fn gaussian_kernel(ksize: u32) -> Vec<f64> {
    let sigma = 0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (ksize / 2) as f64;
    let mut kernel: Vec<f64> = (0..ksize)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Bilinear resize to exactly `width x height`.
/// Returns `None` if either target dimension is zero or above [`MAX_DIMENSION`].
pub fn resize(src: &Raster, width: u32, height: u32) -> Option<Raster> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return None;
    }
    if src.width() == 0 || src.height() == 0 {
        return Some(Raster::filled(width, height, [0, 0, 0]));
    }
    let resized = imageops::resize(&src.to_buffer(), width, height, FilterType::Triangle);
    Some(Raster::from_buffer(resized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::CHANNELS;

    #[test]
    fn test_sepia_on_white_saturates() {
        let out = linear_color_transform(&Raster::filled(1, 1, [255, 255, 255]), &SEPIA);
        // rows sum to 0.937, 1.203, 1.351
        assert_eq!(out.pixel(0, 0), Some([239, 255, 255]));
    }

    #[test]
    fn test_sepia_reads_bgr_order() {
        // pure blue in BGR
        let out = linear_color_transform(&Raster::filled(1, 1, [100, 0, 0]), &SEPIA);
        assert_eq!(out.pixel(0, 0), Some([27, 35, 39]));
    }

    #[test]
    fn test_bitwise_not() {
        let out = bitwise_not(&Raster::from_bgr(1, 1, vec![0, 128, 255]).unwrap());
        assert_eq!(out.pixel(0, 0), Some([255, 127, 0]));
    }

    #[test]
    fn test_grey_replicates_luminance() {
        // red in BGR
        let out = to_grey(&Raster::filled(2, 2, [0, 0, 255]));
        assert_eq!(out.pixel(1, 1), Some([76, 76, 76]));
    }

    #[test]
    fn test_scale_shift_saturates_both_ways() {
        let up = scale_shift(&Raster::filled(2, 2, [0, 0, 0]), 1.0, 300.0);
        assert!(up.as_bytes().iter().all(|&b| b == 255));
        let down = scale_shift(&Raster::filled(2, 2, [255, 255, 255]), 1.0, -300.0);
        assert!(down.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_gaussian_kernel_is_normalised_and_symmetric() {
        let k = gaussian_kernel(7);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((k[0] - k[6]).abs() < 1e-12);
        assert!(k[3] > k[2]);
    }

    #[test]
    fn test_gaussian_blur_rejects_bad_kernels() {
        let r = Raster::filled(4, 4, [1, 2, 3]);
        assert!(gaussian_blur(&r, 0).is_none());
        assert!(gaussian_blur(&r, 4).is_none());
        assert!(gaussian_blur(&r, 101).is_none());
        assert!(gaussian_blur(&r, 99).is_some());
    }

    #[test]
    fn test_gaussian_blur_keeps_uniform_image() {
        let r = Raster::filled(5, 3, [40, 80, 120]);
        assert_eq!(gaussian_blur(&r, 5).unwrap(), r);
    }

    #[test]
    fn test_gaussian_blur_spreads_a_point() {
        let mut data = vec![0u8; 5 * 5 * CHANNELS];
        let centre = (2 * 5 + 2) * CHANNELS;
        data[centre] = 255;
        let r = Raster::from_bgr(5, 5, data).unwrap();
        let out = gaussian_blur(&r, 3).unwrap();
        assert!(out.pixel(2, 2).unwrap()[0] < 255);
        assert!(out.pixel(1, 2).unwrap()[0] > 0);
    }

    #[test]
    fn test_gaussian_blur_replicates_edges() {
        // a bright left column bleeds right but never wraps to the far side
        let mut data = vec![0u8; 6 * 3 * CHANNELS];
        for y in 0..3 {
            let i = y * 6 * CHANNELS;
            data[i..i + CHANNELS].copy_from_slice(&[200, 200, 200]);
        }
        let out = gaussian_blur(&Raster::from_bgr(6, 3, data).unwrap(), 5).unwrap();
        let left = out.pixel(0, 1).unwrap()[0];
        assert!(left > 0 && left < 200);
        assert!(out.pixel(1, 1).unwrap()[0] > 0);
        assert!(out.pixel(1, 1).unwrap()[0] < left);
        assert_eq!(out.pixel(5, 1), Some([0, 0, 0]));
    }

    #[test]
    fn test_resize_halves_a_gradient_smoothly() {
        let r = Raster::from_bgr(4, 1, vec![0, 0, 0, 100, 100, 100, 200, 200, 200, 250, 250, 250])
            .unwrap();
        let out = resize(&r, 2, 1).unwrap();
        let (a, b) = (out.pixel(0, 0).unwrap()[0], out.pixel(1, 0).unwrap()[0]);
        assert!(a > 0 && a < 200, "{a}");
        assert!(b > a && b < 250, "{b}");
    }

    #[test]
    fn test_resize_dimensions_and_uniformity() {
        let r = Raster::filled(4, 2, [5, 6, 7]);
        let out = resize(&r, 7, 3).unwrap();
        assert_eq!((out.width(), out.height()), (7, 3));
        assert!(out.as_bytes().chunks(3).all(|p| p == [5, 6, 7]));
        assert!(resize(&r, 0, 3).is_none());
        assert!(resize(&r, MAX_DIMENSION + 1, 3).is_none());
    }
}
