//! Affine warping.

use super::{FloatImage, Raster};
use image::imageops;
use image::Rgb;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

/// A 2x3 forward affine map `[x', y'] = M * [x, y, 1]`.
pub type Affine = [[f64; 3]; 2];

/// Pure translation by `(dx, dy)`.
pub fn translation(dx: f64, dy: f64) -> Affine {
    [[1.0, 0.0, dx], [0.0, 1.0, dy]]
}

/// Rotation by `degrees` (counter-clockwise on screen) about `(cx, cy)` with uniform `scale`.
pub fn rotation_matrix(cx: f64, cy: f64, degrees: f64, scale: f64) -> Affine {
    let radians = degrees.to_radians();
    let alpha = scale * radians.cos();
    let beta = scale * radians.sin();
    [
        [alpha, beta, (1.0 - alpha) * cx - beta * cy],
        [-beta, alpha, beta * cx + (1.0 - alpha) * cy],
    ]
}

/// Warps `src` by the forward map `m` onto a `width x height` canvas. Destination pixels are
/// sampled bilinearly from the inverse-mapped source position; samples falling outside the
/// source read as black. A singular map yields an all-black canvas.
pub fn warp_affine(src: &Raster, m: &Affine, width: u32, height: u32) -> Raster {
    let [[a, b, c], [d, e, f]] = *m;
    let forward = [a, b, c, d, e, f, 0.0, 0.0, 1.0].map(|v| v as f32);
    let projection = match Projection::from_matrix(forward) {
        Some(p) if forward.iter().all(|v| v.is_finite()) => p,
        _ => return Raster::filled(width, height, [0, 0, 0]),
    };

    // A one pixel black frame lets the last row and column interpolate like the rest.
    let mut framed = FloatImage::new(src.width() + 2, src.height() + 2);
    imageops::replace(&mut framed, &src.to_float(), 1, 1);
    let projection = Projection::translate(-1.0, -1.0).and_then(projection);

    let mut out = FloatImage::new(width, height);
    warp_into(
        &framed,
        &projection,
        Interpolation::Bilinear,
        Rgb([0.0; 3]),
        &mut out,
    );
    Raster::from_float(&out)
}
