//! Text rasterisation with the bundled DejaVu Sans Mono face.
//!
//! Glyph outlines come from `ab_glyph` and are rasterised by `imageproc`. Coverage is
//! accumulated in a float mask first, so strokes widened by `thickness` blend once against
//! the source instead of once per pass.

use super::{saturate, Raster, CHANNELS};
use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::{ImageBuffer, Luma};
use imageproc::drawing::draw_text_mut;
use std::sync::OnceLock;

static FACE_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSansMono.ttf");

/// Em size in pixels at `scale == 1.0`. Capitals come out roughly 22 pixels tall.
const EM_PIXELS: f64 = 30.0;

const OFF_CANVAS: f64 = (1 << 24) as f64;

type Mask = ImageBuffer<Luma<f32>, Vec<f32>>;

fn face() -> Option<&'static FontRef<'static>> {
    static FACE: OnceLock<Option<FontRef<'static>>> = OnceLock::new();
    FACE.get_or_init(|| match FontRef::try_from_slice(FACE_BYTES) {
        Ok(font) => Some(font),
        Err(err) => {
            log::error!("bundled font failed to parse: {err}");
            None
        }
    })
    .as_ref()
}

/// Draws `text` onto a copy of `src`. `origin` is the left end of the baseline, `scale`
/// multiplies the glyph size and `thickness` widens each stroke by `thickness - 1` pixels.
/// A non-positive or non-finite scale draws nothing.
pub fn put_text(
    src: &Raster,
    text: &str,
    origin: (f64, f64),
    scale: f64,
    color: [u8; 3],
    thickness: i32,
) -> Raster {
    let em = scale * EM_PIXELS;
    let drawable = em > 0.0 && em.is_finite() && origin.0.is_finite() && origin.1.is_finite();
    let font = match face() {
        Some(font) if drawable && !text.is_empty() => font,
        _ => return src.map_bytes(|b| b),
    };

    let px = PxScale::from(em as f32);
    let ascent = f64::from(font.as_scaled(px).ascent());
    // far enough off any canvas while leaving room for glyph offsets
    let pixel = |v: f64| v.round().clamp(-OFF_CANVAS, OFF_CANVAS) as i32;
    let (left, top) = (pixel(origin.0), pixel(origin.1 - ascent));

    let mut mask = Mask::new(src.width(), src.height());
    let grow = thickness.max(1) - 1;
    let (lo, hi) = (-(grow / 2), grow - grow / 2);
    for dy in lo..=hi {
        for dx in lo..=hi {
            draw_text_mut(&mut mask, Luma([1.0]), left + dx, top + dy, px, font, text);
        }
    }

    let mut data = src.to_vec();
    for (pixel, coverage) in data.chunks_exact_mut(CHANNELS).zip(mask.as_raw()) {
        let a = f64::from(coverage.clamp(0.0, 1.0));
        if a == 0.0 {
            continue;
        }
        for (channel, &ink) in pixel.iter_mut().zip(&color) {
            *channel = saturate(f64::from(*channel) * (1.0 - a) + f64::from(ink) * a);
        }
    }
    Raster::from_parts(src.width(), src.height(), data)
}
