//! Pull evaluation.
//!
//! [`Evaluator::evaluate`] walks the upstream subgraph of a node on every call: there is no
//! caching, so the result always reflects the current literals, loaded images and wiring.
//! Inputs are resolved left to right and the first absent one short-circuits the node to
//! [`Value::Absent`] before any pixel work happens. Link creation refuses cycles, so the
//! recursion always terminates.

use crate::core::graph::Graph;
use crate::core::node::{NodeId, Operator};
use crate::core::port::InputPort;
use crate::core::value::{Value, ValueKind};
use crate::imaging::ops::{self, SEPIA};
use crate::imaging::{font, warp, Raster};

/// Colour every text overlay is drawn in.
pub const TEXT_COLOR: [u8; 3] = [255, 255, 255];
/// Stroke thickness of the percent-positioned text overlay.
pub const PERCENT_TEXT_THICKNESS: i32 = 2;
/// Kernel sides outside `1..=MAX_KERNEL` make a blur node unresolvable.
pub const MAX_KERNEL: i64 = ops::MAX_KERNEL as i64;

/// Resolves node values against a borrowed graph.
pub struct Evaluator<'g> {
    graph: &'g Graph,
}

impl<'g> Evaluator<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Computes the current output of `id`. Unknown ids evaluate to `Absent`.
    pub fn evaluate(&self, id: &NodeId) -> Value {
        let Some(node) = self.graph.node(id) else {
            return Value::Absent;
        };

        match node.operator() {
            Operator::IntLiteral(text) => Value::parse_literal(ValueKind::Int, text),
            Operator::FloatLiteral(text) => Value::parse_literal(ValueKind::Float, text),
            Operator::TextLiteral(text) => Value::parse_literal(ValueKind::Text, text),
            Operator::ImageSource(src) => src.raster.clone().into(),
            op => {
                let mut args = Vec::with_capacity(node.inputs().len());
                for port in node.inputs() {
                    let value = self.resolve_input(port);
                    if value.is_absent() {
                        log::debug!("{} ({}): input {} unresolved", id, node.kind(), port.slot);
                        return Value::Absent;
                    }
                    args.push(value);
                }
                let out = apply(op, &args);
                if out.is_absent() {
                    log::debug!("{} ({}): parameters out of range", id, node.kind());
                }
                out
            }
        }
    }

    /// True when `id` currently evaluates to a value.
    pub fn is_resolvable(&self, id: &NodeId) -> bool {
        !self.evaluate(id).is_absent()
    }

    fn resolve_input(&self, port: &InputPort) -> Value {
        let Some(link) = port.link.as_ref().and_then(|l| self.graph.link(l)) else {
            return Value::Absent;
        };
        let value = self.evaluate(&link.source);
        if value.kind() == Some(port.kind) {
            value
        } else {
            Value::Absent
        }
    }
}

/// Runs one transform on fully resolved arguments.
fn apply(op: &Operator, args: &[Value]) -> Value {
    use Value::{Float, Image, Int, Text};

    match (op, args) {
        (Operator::Sepia, [Image(img)]) => Image(ops::linear_color_transform(img, &SEPIA)),
        (Operator::Invert, [Image(img)]) => Image(ops::bitwise_not(img)),
        (Operator::Grey, [Image(img)]) => Image(ops::to_grey(img)),
        (Operator::Brightness, [Image(img), Float(beta)]) => {
            Image(ops::scale_shift(img, 1.0, *beta))
        }
        (Operator::GaussianBlur, [Image(img), Int(k)]) => match blur_kernel(*k) {
            Some(ksize) => ops::gaussian_blur(img, ksize).into(),
            None => Value::Absent,
        },
        (Operator::ScalePixel, [Image(img), Int(w), Int(h)]) => {
            match (u32::try_from(*w), u32::try_from(*h)) {
                (Ok(w), Ok(h)) => ops::resize(img, w, h).into(),
                _ => Value::Absent,
            }
        }
        (Operator::ScalePercent, [Image(img), Float(px), Float(py)]) => {
            let (w, h) = percent_of(img, *px, *py);
            match (dimension(w), dimension(h)) {
                (Some(w), Some(h)) => ops::resize(img, w, h).into(),
                _ => Value::Absent,
            }
        }
        (Operator::MovePixel, [Image(img), Int(x), Int(y)]) => {
            translate(img, *x as f64, *y as f64)
        }
        (Operator::MovePercent, [Image(img), Float(px), Float(py)]) => {
            let (x, y) = percent_of(img, *px, *py);
            translate(img, x, y)
        }
        (Operator::Rotate, [Image(img), Float(degrees)]) => {
            let (cx, cy) = (img.width() as f64 / 2.0, img.height() as f64 / 2.0);
            let m = warp::rotation_matrix(cx, cy, *degrees, 1.0);
            Image(warp::warp_affine(img, &m, img.width(), img.height()))
        }
        (Operator::AddTextPixel, [Image(img), Int(x), Int(y), Text(text), Float(scale)]) => {
            let origin = (*x as f64, *y as f64);
            // saturating cast: an absurd scale draws nothing anyway
            let thickness = scale.trunc() as i32;
            Image(font::put_text(img, text, origin, *scale, TEXT_COLOR, thickness))
        }
        (
            Operator::AddTextPercent,
            [Image(img), Float(px), Float(py), Text(text), Float(scale)],
        ) => {
            let origin = percent_of(img, *px, *py);
            Image(font::put_text(
                img,
                text,
                origin,
                *scale,
                TEXT_COLOR,
                PERCENT_TEXT_THICKNESS,
            ))
        }
        (Operator::Sink, [Image(img)]) => Image(img.clone()),
        _ => Value::Absent,
    }
}

/// Kernel side `2k + 1`, if it lies in `1..=MAX_KERNEL`.
fn blur_kernel(k: i64) -> Option<u32> {
    let ksize = k.checked_mul(2)?.checked_add(1)?;
    if ksize <= 0 || ksize > MAX_KERNEL {
        return None;
    }
    u32::try_from(ksize).ok()
}

fn percent_of(img: &Raster, px: f64, py: f64) -> (f64, f64) {
    (
        img.width() as f64 * px / 100.0,
        img.height() as f64 * py / 100.0,
    )
}

/// Truncates a computed size toward zero; non-positive or non-finite sizes are rejected.
fn dimension(v: f64) -> Option<u32> {
    if !v.is_finite() {
        return None;
    }
    let v = v.trunc();
    if v < 1.0 || v > u32::MAX as f64 {
        return None;
    }
    Some(v as u32)
}

fn translate(img: &Raster, dx: f64, dy: f64) -> Value {
    let m = warp::translation(dx, dy);
    Value::Image(warp::warp_affine(img, &m, img.width(), img.height()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_kernel_bounds() {
        assert_eq!(blur_kernel(0), Some(1));
        assert_eq!(blur_kernel(3), Some(7));
        assert_eq!(blur_kernel(49), Some(99));
        assert_eq!(blur_kernel(50), None);
        assert_eq!(blur_kernel(-1), None);
        assert_eq!(blur_kernel(i64::MAX), None);
    }

    #[test]
    fn test_dimension_truncates() {
        assert_eq!(dimension(10.9), Some(10));
        assert_eq!(dimension(0.99), None);
        assert_eq!(dimension(-3.0), None);
        assert_eq!(dimension(f64::NAN), None);
    }

    #[test]
    fn test_apply_rejects_mismatched_arguments() {
        let img = Value::Image(Raster::filled(2, 2, [0, 0, 0]));
        assert!(apply(&Operator::Brightness, &[img.clone(), Value::Int(3)]).is_absent());
        assert!(apply(&Operator::Sepia, &[]).is_absent());
        assert!(!apply(&Operator::Sepia, &[img]).is_absent());
    }

    #[test]
    fn test_scale_percent_sizes() {
        let img = Value::Image(Raster::filled(10, 20, [1, 1, 1]));
        let out = apply(
            &Operator::ScalePercent,
            &[img.clone(), Value::Float(50.0), Value::Float(25.0)],
        );
        let out = out.as_image().unwrap();
        assert_eq!((out.width(), out.height()), (5, 5));

        let tiny = apply(
            &Operator::ScalePercent,
            &[img, Value::Float(5.0), Value::Float(100.0)],
        );
        assert!(tiny.is_absent());
    }

    #[test]
    fn test_scale_pixel_rejects_non_positive() {
        let img = Value::Image(Raster::filled(4, 4, [1, 1, 1]));
        let args = |w, h| [img.clone(), Value::Int(w), Value::Int(h)];
        assert!(apply(&Operator::ScalePixel, &args(0, 3)).is_absent());
        assert!(apply(&Operator::ScalePixel, &args(3, -1)).is_absent());
        let ok = apply(&Operator::ScalePixel, &args(8, 2));
        assert_eq!(ok.as_image().map(|r| (r.width(), r.height())), Some((8, 2)));
    }
}
