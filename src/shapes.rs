//! Primitive geometry in scene units.
//!
//! Every builder returns plain `kurbo` paths; styling and the mapping to
//! pixels happen when a frame is compiled.

use std::f64::consts::TAU;

use kurbo::{
    Arc, Circle, CubicBez, Line as KLine, ParamCurve, ParamCurveArclen, PathEl, PathSeg, QuadBez,
    Shape,
};

use crate::foundation::core::{BezPath, Line, Point, Rect, Vec2};
use crate::physics::axes::AxisMapping;

/// Flattening tolerance for circles and arcs, in scene units.
pub const SHAPE_TOLERANCE: f64 = 1e-3;
/// Default dot radius.
pub const DOT_RADIUS: f64 = 0.08;
/// Default arrow tip length.
pub const ARROW_TIP_LENGTH: f64 = 0.35;
/// Default gap between an arrow and its endpoints.
pub const ARROW_BUFF: f64 = 0.25;
/// Depth of a brace from its baseline to its tip.
pub const BRACE_DEPTH: f64 = 0.2;
/// Default gap between a brace and the span it marks.
pub const BRACE_BUFF: f64 = 0.2;
const ARC_ACCURACY: f64 = 1e-4;

/// Convert a width in the 1/100 scene-unit convention of the scene scripts.
pub fn stroke_units(width: f64) -> f64 {
    width * 0.01
}

/// Straight segment.
pub fn line(a: Point, b: Point) -> BezPath {
    polyline(&[a, b])
}

/// Open polyline through `points`.
pub fn polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    for (i, &p) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path
}

/// Segment from `a` to `b` broken into dashes of `dash_length` separated by equal gaps.
pub fn dashed_line(a: Point, b: Point, dash_length: f64) -> BezPath {
    let len = (b - a).hypot();
    if len <= 0.0 || dash_length <= 0.0 {
        return line(a, b);
    }
    let count = (len / (2.0 * dash_length)).ceil().max(1.0) as usize;
    let period = 1.0 / count as f64;
    let mut path = BezPath::new();
    for i in 0..count {
        let t0 = i as f64 * period;
        let t1 = t0 + period * 0.5;
        path.move_to(a.lerp(b, t0));
        path.line_to(a.lerp(b, t1));
    }
    path
}

/// Closed rectangle outline.
pub fn rectangle(rect: Rect) -> BezPath {
    rect.to_path(SHAPE_TOLERANCE)
}

/// Closed circle outline.
pub fn circle(center: Point, radius: f64) -> BezPath {
    Circle::new(center, radius).to_path(SHAPE_TOLERANCE)
}

/// Filled dot of [`DOT_RADIUS`].
pub fn dot(center: Point) -> BezPath {
    circle(center, DOT_RADIUS)
}

/// Filled triangular tip with its apex at `apex`, pointing along `dir`.
pub fn arrow_tip(apex: Point, dir: Vec2, length: f64, width: f64) -> BezPath {
    let u = dir.normalize();
    let n = Vec2::new(-u.y, u.x);
    let base = apex - u * length;
    let mut path = BezPath::new();
    path.move_to(apex);
    path.line_to(base + n * (width / 2.0));
    path.line_to(base - n * (width / 2.0));
    path.close_path();
    path
}

#[derive(Clone, Debug, PartialEq)]
/// Arrow geometry: a stroked shaft and a filled tip.
pub struct ArrowShape {
    /// Shaft, to be stroked.
    pub shaft: BezPath,
    /// Tip triangle, to be filled.
    pub tip: BezPath,
    /// Shaft start after `buff`.
    pub start: Point,
    /// Tip apex after `buff`.
    pub end: Point,
}

/// Straight arrow pulled in by `buff` at both ends.
///
/// The tip is at most a quarter of the arrow's length.
pub fn arrow(start: Point, end: Point, buff: f64) -> ArrowShape {
    let delta = end - start;
    let len = delta.hypot();
    let u = if len > 0.0 { delta / len } else { Vec2::new(1.0, 0.0) };
    let buff = buff.min(len / 2.0);
    let s = start + u * buff;
    let e = end - u * buff;
    let tip_len = ARROW_TIP_LENGTH.min(0.25 * (len - 2.0 * buff));
    ArrowShape {
        shaft: line(s, e - u * tip_len),
        tip: arrow_tip(e, u, tip_len, tip_len),
        start: s,
        end: e,
    }
}

/// Counter-clockwise arc from `start` to `end` sweeping `angle`, with a tip at `end`.
pub fn curved_arrow(start: Point, end: Point, angle: f64) -> ArrowShape {
    let chord = end - start;
    let half = chord.hypot() / 2.0;
    if half <= 0.0 || angle.abs() < 1e-9 {
        return arrow(start, end, 0.0);
    }
    let radius = half / (angle / 2.0).sin().abs();
    let left = Vec2::new(-chord.y, chord.x).normalize();
    let center = start.midpoint(end) + left * (radius * (angle / 2.0).cos()) * angle.signum();
    let start_angle = (start - center).atan2();
    let arc = Arc {
        center,
        radii: Vec2::new(radius, radius),
        start_angle,
        sweep_angle: angle,
        x_rotation: 0.0,
    };

    let radial = end - center;
    let tangent = Vec2::new(-radial.y, radial.x).normalize() * angle.signum();
    let tip_len = ARROW_TIP_LENGTH.min(0.25 * radius * angle.abs());
    ArrowShape {
        shaft: arc.to_path(SHAPE_TOLERANCE),
        tip: arrow_tip(end, tangent, tip_len, tip_len),
        start,
        end,
    }
}

/// Default sweep of [`curved_arrow`].
pub const CURVED_ARROW_ANGLE: f64 = TAU / 4.0;

#[derive(Clone, Debug, PartialEq)]
/// Curly brace marking a span.
pub struct BraceShape {
    /// Brace outline, to be stroked.
    pub path: BezPath,
    /// Tip of the brace, where labels attach.
    pub tip: Point,
    /// Unit vector from the span toward the tip.
    pub direction: Vec2,
}

/// Brace along `a..b`, offset by `buff` toward `direction`.
pub fn brace_between(a: Point, b: Point, direction: Vec2, buff: f64) -> BraceShape {
    let span = b - a;
    let u = if span.hypot() > 0.0 {
        span.normalize()
    } else {
        Vec2::new(1.0, 0.0)
    };
    // Normal on the requested side.
    let mut n = Vec2::new(-u.y, u.x);
    if n.dot(direction) < 0.0 {
        n = -n;
    }
    let h = BRACE_DEPTH;
    let p0 = a + n * buff;
    let p4 = b + n * buff;
    let m = p0.midpoint(p4);
    let shoulder = n * (h / 2.0);
    let curl = u * (h / 2.0).min(span.hypot() / 4.0);

    let mut path = BezPath::new();
    path.move_to(p0);
    path.quad_to(p0 + shoulder, p0 + curl + shoulder);
    path.line_to(m - curl + shoulder);
    path.quad_to(m + shoulder, m + n * h);
    path.quad_to(m + shoulder, m + curl + shoulder);
    path.line_to(p4 - curl + shoulder);
    path.quad_to(p4 + shoulder, p4);
    BraceShape {
        path,
        tip: m + n * h,
        direction: n,
    }
}

/// Cubic Bezier curve through every point, with Catmull-Rom tangents.
pub fn smooth_curve(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some(&first) = points.first() else {
        return path;
    };
    path.move_to(first);
    let n = points.len();
    for i in 0..n.saturating_sub(1) {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];
        let c1 = p1 + (p2 - p0) / 6.0;
        let c2 = p2 - (p3 - p1) / 6.0;
        path.curve_to(c1, c2, p2);
    }
    path
}

/// Polyline through `f` sampled every `step` over `[t0, t1]` on `mapping`.
pub fn plot(mapping: &AxisMapping, f: impl Fn(f64) -> f64, t0: f64, t1: f64, step: f64) -> BezPath {
    polyline(&sample(mapping, &f, t0, t1, step))
}

/// Closed region between `f` and the zero baseline over `[t0, t1]`.
pub fn area_under(
    mapping: &AxisMapping,
    f: impl Fn(f64) -> f64,
    t0: f64,
    t1: f64,
    step: f64,
) -> BezPath {
    let mut points = vec![mapping.c2p(t0, 0.0)];
    points.extend(sample(mapping, &f, t0, t1, step));
    points.push(mapping.c2p(t1, 0.0));
    let mut path = polyline(&points);
    path.close_path();
    path
}

fn sample(mapping: &AxisMapping, f: &impl Fn(f64) -> f64, t0: f64, t1: f64, step: f64) -> Vec<Point> {
    let count = if step > 0.0 {
        ((t1 - t0) / step).round().max(1.0) as usize
    } else {
        1
    };
    (0..=count)
        .map(|i| {
            let t = if i == count {
                t1
            } else {
                t0 + (t1 - t0) * (i as f64) / (count as f64)
            };
            mapping.c2p(t, f(t))
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Which parts of an axes pair to draw.
pub struct AxesStyle {
    /// Arrow tips at the positive ends.
    pub tips: bool,
    /// Tick marks on the x axis.
    pub x_ticks: bool,
    /// Draw the y axis line.
    pub show_y: bool,
}

#[derive(Clone, Debug, PartialEq)]
/// Axes geometry for an [`AxisMapping`].
pub struct AxesShape {
    /// Axis lines and ticks, to be stroked.
    pub lines: BezPath,
    /// Tip triangles, to be filled.
    pub tips: BezPath,
    /// Positive end of the x axis.
    pub x_end: Point,
    /// Positive end of the y axis.
    pub y_end: Point,
}

/// Tick half-length.
pub const TICK_SIZE: f64 = 0.1;
/// Tip length used on axes.
pub const AXIS_TIP_LENGTH: f64 = 0.2;

/// Axis lines crossing at [`AxisMapping::axis_cross`].
pub fn axes(mapping: &AxisMapping, style: AxesStyle) -> AxesShape {
    let cross = mapping.axis_cross();
    let x0 = mapping.c2p(mapping.x_range.min, 0.0).x;
    let x1 = mapping.c2p(mapping.x_range.max, 0.0).x;
    let y0 = mapping.c2p(0.0, mapping.y_range.min).y;
    let y1 = mapping.c2p(0.0, mapping.y_range.max).y;

    let mut lines = BezPath::new();
    let mut tips = BezPath::new();
    let tip = if style.tips { AXIS_TIP_LENGTH } else { 0.0 };

    let x_end = Point::new(x1 + tip, cross.y);
    append(&mut lines, &line(Point::new(x0, cross.y), Point::new(x1, cross.y)));
    if style.tips {
        append(&mut tips, &arrow_tip(x_end, Vec2::new(1.0, 0.0), tip, tip));
    }
    if style.x_ticks {
        for t in mapping.x_range.ticks() {
            let x = mapping.c2p(t, 0.0).x;
            append(
                &mut lines,
                &line(
                    Point::new(x, cross.y - TICK_SIZE),
                    Point::new(x, cross.y + TICK_SIZE),
                ),
            );
        }
    }

    let y_end = Point::new(cross.x, y1 + tip);
    if style.show_y {
        append(&mut lines, &line(Point::new(cross.x, y0), Point::new(cross.x, y1)));
        if style.tips {
            append(&mut tips, &arrow_tip(y_end, Vec2::new(0.0, 1.0), tip, tip));
        }
    }

    AxesShape {
        lines,
        tips,
        x_end,
        y_end,
    }
}

/// Append every element of `other` to `path`.
pub fn append(path: &mut BezPath, other: &BezPath) {
    path.extend(other.elements().iter().copied());
}

/// Short radial lines around a circle, as drawn by a flash highlight.
pub fn flash_lines(center: Point, radius: f64, count: usize, length: f64) -> Vec<Line> {
    (0..count)
        .map(|i| {
            let a = TAU * (i as f64) / (count.max(1) as f64);
            let u = Vec2::from_angle(a);
            Line::new(center + u * radius, center + u * (radius + length))
        })
        .collect()
}

/// Leading part of `path` by arc length, `fraction` in `0..=1`.
///
/// Subpaths are visited in order; a trailing partial segment is cut with
/// `inv_arclen`. Closed subpaths count their closing edge.
pub fn partial_path(path: &BezPath, fraction: f64) -> BezPath {
    let fraction = fraction.clamp(0.0, 1.0);
    if fraction >= 1.0 {
        return path.clone();
    }
    let total: f64 = path.segments().map(|s| s.arclen(ARC_ACCURACY)).sum();
    let mut remaining = total * fraction;
    let mut out = BezPath::new();
    if remaining <= 0.0 {
        return out;
    }

    let mut start = Point::ORIGIN;
    let mut current = Point::ORIGIN;
    let mut pending_move: Option<Point> = None;
    for el in path.elements() {
        let seg = match *el {
            PathEl::MoveTo(p) => {
                start = p;
                current = p;
                pending_move = Some(p);
                continue;
            }
            PathEl::LineTo(p) => PathSeg::Line(KLine::new(current, p)),
            PathEl::QuadTo(p1, p2) => PathSeg::Quad(QuadBez::new(current, p1, p2)),
            PathEl::CurveTo(p1, p2, p3) => PathSeg::Cubic(CubicBez::new(current, p1, p2, p3)),
            PathEl::ClosePath => PathSeg::Line(KLine::new(current, start)),
        };
        if let Some(p) = pending_move.take() {
            out.move_to(p);
        }
        let len = seg.arclen(ARC_ACCURACY);
        if len <= remaining {
            match *el {
                PathEl::ClosePath => out.close_path(),
                other => out.push(other),
            }
            remaining -= len;
            current = seg.end();
            if matches!(el, PathEl::ClosePath) {
                current = start;
            }
            continue;
        }
        let t = seg.inv_arclen(remaining, ARC_ACCURACY);
        out.push(seg.subsegment(0.0..t).as_path_el());
        break;
    }
    out
}

#[cfg(test)]
#[path = "../tests/unit/shapes.rs"]
mod tests;
