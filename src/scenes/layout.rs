//! Placement helpers shared by the scene scripts.
//!
//! Sizes follow the point-based conventions of the presentation: labels are
//! given in points and strokes in 1/100 scene units.

use crate::{
    foundation::core::{BezPath, Color, Point, Rect},
    foundation::error::LarmorResult,
    physics::axes::{AxisMapping, AxisRange},
    physics::kspace::Trajectory,
    physics::markers::time_markers,
    physics::pulse::GradientPulse,
    physics::spins::{EllipticalMask, SpinGlyph, SpinGrid},
    scene::builder::{ElementId, SceneBuilder},
    scene::model::{Anchor, LabelAsset, SpinVisual, Style, Visual, em_for_font_size},
    scenes::catalog::SceneContext,
    shapes::{self, ArrowShape, AxesStyle},
};

/// Default label size in points.
pub(crate) const FONT_SIZE: f64 = 48.0;
/// Gap left between a label and the thing it annotates.
pub(crate) const NEXT_TO_BUFF: f64 = 0.25;
/// Stroke width of arrows.
pub(crate) const ARROW_STROKE: f64 = 6.0;

/// Single-color math label at `points`.
pub(crate) fn tex(source: &str, color: Color, points: f64) -> LabelAsset {
    LabelAsset::math(source, color, em_for_font_size(points))
}

/// Multi-color math label at `points`.
pub(crate) fn tex_parts(parts: &[(&str, Color)], points: f64) -> LabelAsset {
    LabelAsset::colored(parts, em_for_font_size(points))
}

/// Plain text label at `points`.
pub(crate) fn plain(source: &str, color: Color, points: f64) -> LabelAsset {
    LabelAsset::text(source, color, em_for_font_size(points))
}

/// Shaft and tip of an arrow as one path, drawn in order.
pub(crate) fn arrow_path(shape: &ArrowShape) -> BezPath {
    let mut path = shape.shaft.clone();
    shapes::append(&mut path, &shape.tip);
    path
}

/// Register an arrow stroked `width` wide with a filled tip.
pub(crate) fn insert_arrow(
    b: &mut SceneBuilder,
    name: &str,
    shape: &ArrowShape,
    color: Color,
    width: f64,
) -> ElementId {
    b.insert_path(
        name,
        arrow_path(shape),
        Style::stroke(color, shapes::stroke_units(width)).with_fill(color),
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Image fitted to an on-screen height, with its rotated footprint.
pub(crate) struct PlacedImage {
    /// Path under the assets directory.
    pub source: &'static str,
    /// Center in scene units.
    pub center: Point,
    /// On-screen width after rotation.
    pub width: f64,
    /// On-screen height after rotation.
    pub height: f64,
    /// Counter-clockwise quarter turns.
    pub quarter_turns: u8,
}

impl PlacedImage {
    /// Rotate `source`, then scale it so its on-screen height is `height`.
    pub(crate) fn fit_height(
        ctx: &SceneContext,
        source: &'static str,
        height: f64,
        quarter_turns: u8,
        center: Point,
    ) -> LarmorResult<Self> {
        let (w, h) = ctx.image_size(source)?;
        let (w, h) = if quarter_turns % 2 == 1 { (h, w) } else { (w, h) };
        Ok(Self {
            source,
            center,
            width: height * w / h,
            height,
            quarter_turns,
        })
    }

    /// Footprint on screen.
    pub(crate) fn rect(&self) -> Rect {
        Rect::from_center_size(self.center, (self.width, self.height))
    }

    /// Same image moved so its top edge sits at `y`.
    pub(crate) fn with_top(self, y: f64) -> Self {
        Self {
            center: Point::new(self.center.x, y - self.height / 2.0),
            ..self
        }
    }

    /// Register the image element.
    pub(crate) fn insert(&self, b: &mut SceneBuilder, name: &str) -> ElementId {
        // Image heights are measured before rotation.
        let height = if self.quarter_turns % 2 == 1 {
            self.width
        } else {
            self.height
        };
        b.insert_image(name, self.source, self.center, height, self.quarter_turns)
    }

    /// Translucent black rectangle over the image.
    pub(crate) fn insert_overlay(&self, b: &mut SceneBuilder) -> ElementId {
        b.insert_path(
            "overlay",
            shapes::rectangle(self.rect()),
            Style::fill(Color::BLACK.with_opacity(0.2)),
        )
    }

    /// Elliptical mask with radii as fractions of the image size.
    pub(crate) fn mask(&self, rx: f64, ry: f64) -> LarmorResult<EllipticalMask> {
        EllipticalMask::new(self.center, self.width, self.height, rx, ry)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Size and colors of a spin glyph.
pub(crate) struct SpinLook {
    pub length: f64,
    pub tip_length: f64,
    pub stroke_width: f64,
    pub dot_radius: f64,
    pub color: Color,
    pub dot_color: Color,
}

impl SpinLook {
    /// Arrow of half-length 0.25 through a white dot of radius 0.1.
    pub(crate) fn standard(color: Color) -> Self {
        Self {
            length: 0.5,
            tip_length: 0.1,
            stroke_width: shapes::stroke_units(5.0),
            dot_radius: 0.1,
            color,
            dot_color: Color::WHITE,
        }
    }

    /// Smaller glyph for interleaved rows, scaled by `factor`.
    pub(crate) fn small(color: Color, factor: f64) -> Self {
        Self {
            length: 0.5 * factor,
            tip_length: 0.1 * factor,
            stroke_width: shapes::stroke_units(4.0 * factor),
            dot_radius: 0.08 * factor,
            color,
            dot_color: Color::WHITE,
        }
    }

    /// Spin visual at the glyph's position and current rotation.
    pub(crate) fn visual(&self, glyph: &SpinGlyph) -> Visual {
        Visual::Spin(SpinVisual {
            center: glyph.position,
            length: self.length,
            tip_length: self.tip_length,
            stroke_width: self.stroke_width,
            dot_radius: self.dot_radius,
            orientation: glyph.orientation,
            side: glyph.side,
            rotations: Vec::new(),
            color: self.color,
            dot_color: self.dot_color,
        })
    }
}

/// Register one spin element per glyph, in grid order.
pub(crate) fn insert_spins(
    b: &mut SceneBuilder,
    grid: &SpinGrid,
    look: impl Fn(&SpinGlyph) -> SpinLook,
) -> Vec<(ElementId, SpinGlyph)> {
    grid.glyphs
        .iter()
        .map(|g| (b.insert("spin", look(g).visual(g)), *g))
        .collect()
}

/// Width of a pulse-sequence track.
pub(crate) const TRACK_WIDTH: f64 = 12.0;
/// Height of a pulse-sequence track.
pub(crate) const TRACK_HEIGHT: f64 = 1.5;
/// Vertical gap between tracks.
pub(crate) const TRACK_SPACING: f64 = 0.75;
/// Horizontal center of the tracks; labels take the space on the left.
pub(crate) const TRACK_CENTER_X: f64 = 1.0;

/// Time mappings of `count` stacked tracks over `t` in `0..10`, top first.
pub(crate) fn track_stack(count: usize) -> LarmorResult<Vec<AxisMapping>> {
    let x = AxisRange::new(0.0, 10.0, 1.0)?;
    let y = AxisRange::new(-1.0, 1.0, 0.5)?;
    let total = count as f64 * TRACK_HEIGHT + count.saturating_sub(1) as f64 * TRACK_SPACING;
    (0..count)
        .map(|i| {
            let cy = total / 2.0 - TRACK_HEIGHT / 2.0 - i as f64 * (TRACK_HEIGHT + TRACK_SPACING);
            Ok(AxisMapping::new(x, y, TRACK_WIDTH, TRACK_HEIGHT)?
                .centered_at(Point::new(TRACK_CENTER_X, cy)))
        })
        .collect()
}

#[derive(Clone, Copy, Debug)]
/// Name of a sequence track, with an optional caption below it.
pub(crate) struct TrackLabel<'a> {
    pub name: &'a str,
    pub caption: Option<&'a str>,
    pub color: Color,
}

/// Time axis without a y axis, labelled on the left.
pub(crate) fn insert_track(
    b: &mut SceneBuilder,
    mapping: &AxisMapping,
    label: TrackLabel<'_>,
    axis_color: Color,
) -> Vec<ElementId> {
    let shape = shapes::axes(
        mapping,
        AxesStyle {
            tips: false,
            x_ticks: true,
            show_y: false,
        },
    );
    let mut ids = vec![b.insert_path(
        "track-axis",
        shape.lines,
        Style::stroke(axis_color, shapes::stroke_units(2.0)),
    )];

    let origin = mapping.origin();
    let right = origin.x - 0.2;
    match label.caption {
        Some(caption) => {
            ids.push(b.insert_label(
                "track-label",
                tex(label.name, label.color, FONT_SIZE),
                Point::new(right, origin.y + 0.05),
                Anchor { x: 1.0, y: 0.0 },
            ));
            ids.push(b.insert_label(
                "track-caption",
                plain(caption, label.color, FONT_SIZE * 0.5),
                Point::new(right, origin.y - 0.25),
                Anchor::TOP_RIGHT,
            ));
        }
        None => ids.push(b.insert_label(
            "track-label",
            tex(label.name, label.color, FONT_SIZE),
            Point::new(right, origin.y),
            Anchor::RIGHT,
        )),
    }
    ids
}

/// Gradient lobe filled with its color and outlined in `outline`.
pub(crate) fn insert_gradient(
    b: &mut SceneBuilder,
    pulse: &GradientPulse,
    mapping: &AxisMapping,
    outline: Color,
) -> ElementId {
    b.insert_path(
        "gradient",
        shapes::rectangle(pulse.rect(mapping)),
        Style::stroke(outline, shapes::stroke_units(1.5))
            .with_fill(pulse.color.with_opacity(pulse.fill_opacity)),
    )
}

/// Dashed time markers spanning the whole stack.
pub(crate) fn insert_markers(
    b: &mut SceneBuilder,
    times: &[f64],
    stack: &[AxisMapping],
    color: Color,
) -> LarmorResult<Vec<ElementId>> {
    Ok(time_markers(times, stack)?
        .into_iter()
        .map(|l| {
            b.insert_path(
                "time-marker",
                shapes::dashed_line(l.p0, l.p1, 0.1),
                Style::stroke(color, shapes::stroke_units(1.0)),
            )
        })
        .collect())
}

/// k-space trace stroked in `color` at `opacity`.
pub(crate) fn insert_trace(
    b: &mut SceneBuilder,
    trace: &Trajectory,
    mapping: &AxisMapping,
    color: Color,
    opacity: f64,
) -> ElementId {
    b.insert_path(
        "k-trace",
        trace.path(mapping),
        Style::stroke(color.with_opacity(opacity), shapes::stroke_units(2.0)),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/scenes/layout.rs"]
mod tests;
