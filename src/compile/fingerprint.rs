use kurbo::PathEl;

use crate::{
    eval::evaluator::{EvaluatedFrame, EvaluatedVisual},
    foundation::core::{Affine, Color, Point},
    foundation::math::Fnv1a64,
    scene::model::Style,
};

/// Stable per-frame fingerprint used by static-frame elision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FrameFingerprint(pub(crate) u64);

/// Hash everything that affects the pixels of an evaluated frame.
///
/// The frame index is not hashed, so a still stretch of the timeline maps to
/// one fingerprint.
pub(crate) fn fingerprint_eval(eval: &EvaluatedFrame) -> FrameFingerprint {
    let mut h = Fnv1a64::new_default();
    h.write_u64(eval.nodes.len() as u64);
    for node in &eval.nodes {
        h.write_bytes(node.element_id.as_bytes());
        h.write_u8(0);
        h.write_u64(node.z as u64);
        write_affine(&mut h, node.transform);
        h.write_f64(node.opacity);
        h.write_f64(node.reveal);
        match &node.visual {
            EvaluatedVisual::Path { path, style } => {
                h.write_u8(b'P');
                h.write_u64(path.elements().len() as u64);
                for el in path.elements() {
                    write_path_el(&mut h, *el);
                }
                write_style(&mut h, *style);
            }
            EvaluatedVisual::Image {
                asset,
                center,
                height,
                quarter_turns,
            } => {
                h.write_u8(b'I');
                h.write_bytes(asset.as_bytes());
                write_point(&mut h, *center);
                h.write_f64(*height);
                h.write_u8(*quarter_turns);
            }
            EvaluatedVisual::Label {
                asset,
                position,
                anchor,
            } => {
                h.write_u8(b'L');
                h.write_bytes(asset.as_bytes());
                write_point(&mut h, *position);
                h.write_f64(anchor.x);
                h.write_f64(anchor.y);
            }
            EvaluatedVisual::Spin(spin) => {
                h.write_u8(b'S');
                write_point(&mut h, spin.center);
                for v in spin.orientation.iter().chain(spin.side.iter()) {
                    h.write_f64(*v);
                }
                h.write_f64(spin.length);
                write_color(&mut h, spin.color);
            }
        }
    }
    FrameFingerprint(h.finish())
}

fn write_affine(h: &mut Fnv1a64, a: Affine) {
    for c in a.as_coeffs() {
        h.write_f64(c);
    }
}

fn write_point(h: &mut Fnv1a64, p: Point) {
    h.write_f64(p.x);
    h.write_f64(p.y);
}

fn write_color(h: &mut Fnv1a64, c: Color) {
    h.write_bytes(&[c.r, c.g, c.b, c.a]);
}

fn write_style(h: &mut Fnv1a64, style: Style) {
    match style.stroke {
        Some(s) => {
            h.write_u8(1);
            write_color(h, s.color);
            h.write_f64(s.width);
        }
        None => h.write_u8(0),
    }
    match style.fill {
        Some(c) => {
            h.write_u8(1);
            write_color(h, c);
        }
        None => h.write_u8(0),
    }
}

fn write_path_el(h: &mut Fnv1a64, el: PathEl) {
    match el {
        PathEl::MoveTo(p) => {
            h.write_u8(0);
            write_point(h, p);
        }
        PathEl::LineTo(p) => {
            h.write_u8(1);
            write_point(h, p);
        }
        PathEl::QuadTo(a, b) => {
            h.write_u8(2);
            write_point(h, a);
            write_point(h, b);
        }
        PathEl::CurveTo(a, b, c) => {
            h.write_u8(3);
            write_point(h, a);
            write_point(h, b);
            write_point(h, c);
        }
        PathEl::ClosePath => h.write_u8(4),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/fingerprint.rs"]
mod tests;
