use std::collections::BTreeMap;

use crate::{
    animation::anim::Anim,
    foundation::core::{Affine, BezPath, Canvas, Color, Fps, FrameIndex, FrameRange, Point, Transform2D},
    foundation::error::{LarmorError, LarmorResult},
    physics::spins::RotationAxis,
};

/// Scene units per font point: a 48 pt label has an em of about 0.71 units.
pub const EM_PER_POINT: f64 = 0.0148;

/// Label size in scene units for a font size in points.
pub fn em_for_font_size(points: f64) -> f64 {
    points * EM_PER_POINT
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Visible region of the scene, centered on the origin with y pointing up.
pub struct Camera {
    /// Visible width in scene units.
    pub frame_width: f64,
    /// Visible height in scene units.
    pub frame_height: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            frame_width: 16.0,
            frame_height: 9.0,
        }
    }
}

impl Camera {
    /// Pixels per scene unit; the frame is fit inside the canvas without distortion.
    pub fn px_per_unit(&self, canvas: Canvas) -> f64 {
        let sx = f64::from(canvas.width) / self.frame_width;
        let sy = f64::from(canvas.height) / self.frame_height;
        sx.min(sy)
    }

    /// Scene units to pixels (y flipped, origin at the canvas center).
    pub fn world_to_px(&self, canvas: Canvas) -> Affine {
        let s = self.px_per_unit(canvas);
        Affine::new([
            s,
            0.0,
            0.0,
            -s,
            f64::from(canvas.width) / 2.0,
            f64::from(canvas.height) / 2.0,
        ])
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A complete, renderable animation.
pub struct Scene {
    /// Catalogue name.
    pub name: String,
    /// Visible region.
    pub camera: Camera,
    /// Output size.
    pub canvas: Canvas,
    /// Frame rate.
    pub fps: Fps,
    /// Total frames.
    pub duration: FrameIndex,
    /// Clear color.
    pub background: Color,
    /// External resources by key.
    pub assets: BTreeMap<String, Asset>,
    /// Elements in paint order.
    pub elements: Vec<Element>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// External resource referenced by elements.
pub enum Asset {
    /// Raster or SVG image file.
    Image(ImageAsset),
    /// Text or math label.
    Label(LabelAsset),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Image file, relative to the assets directory.
pub struct ImageAsset {
    /// Relative path.
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One colored fragment of a label.
pub struct LabelPart {
    /// TeX-subset source, or plain text.
    pub source: String,
    /// Fill color.
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Label made of colored parts.
pub struct LabelAsset {
    /// Fragments joined in order.
    pub parts: Vec<LabelPart>,
    /// Em size in scene units.
    pub size: f64,
    /// Parse the parts as math; plain text otherwise.
    pub math: bool,
}

impl LabelAsset {
    /// Single-color math label.
    pub fn math(source: impl Into<String>, color: Color, size: f64) -> Self {
        Self {
            parts: vec![LabelPart {
                source: source.into(),
                color,
            }],
            size,
            math: true,
        }
    }

    /// Single-color plain label.
    pub fn text(source: impl Into<String>, color: Color, size: f64) -> Self {
        Self {
            math: false,
            ..Self::math(source, color, size)
        }
    }

    /// Multi-part math label, one color per part.
    pub fn colored(parts: &[(&str, Color)], size: f64) -> Self {
        Self {
            parts: parts
                .iter()
                .map(|(source, color)| LabelPart {
                    source: (*source).to_owned(),
                    color: *color,
                })
                .collect(),
            size,
            math: true,
        }
    }

    /// Rough width in scene units, for placing neighbours before fonts are loaded.
    pub fn estimated_width(&self) -> f64 {
        let chars: usize = self
            .parts
            .iter()
            .map(|p| {
                if self.math {
                    crate::mathtex::parse_math(&p.source)
                        .map(|n| n.flat_text().chars().count())
                        .unwrap_or_else(|_| p.source.chars().count())
                } else {
                    p.source.chars().count()
                }
            })
            .sum();
        chars as f64 * 0.55 * self.size
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Point of a label's box placed at its position, as fractions of the box.
pub struct Anchor {
    /// 0 is the left edge, 1 the right edge.
    pub x: f64,
    /// 0 is the bottom edge, 1 the top edge.
    pub y: f64,
}

impl Anchor {
    /// Box center.
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };
    /// Left edge, for labels placed to the right of something.
    pub const LEFT: Self = Self { x: 0.0, y: 0.5 };
    /// Right edge, for labels placed to the left of something.
    pub const RIGHT: Self = Self { x: 1.0, y: 0.5 };
    /// Top edge, for labels placed below something.
    pub const TOP: Self = Self { x: 0.5, y: 1.0 };
    /// Bottom edge, for labels placed above something.
    pub const BOTTOM: Self = Self { x: 0.5, y: 0.0 };
    /// Top-right corner.
    pub const TOP_RIGHT: Self = Self { x: 1.0, y: 1.0 };
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Stroke parameters in scene units.
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Color,
    /// Width in scene units.
    pub width: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Paint for a path.
pub struct Style {
    /// Outline, if any.
    pub stroke: Option<StrokeStyle>,
    /// Interior fill, if any.
    pub fill: Option<Color>,
}

impl Style {
    /// Stroke only.
    pub fn stroke(color: Color, width: f64) -> Self {
        Self {
            stroke: Some(StrokeStyle { color, width }),
            fill: None,
        }
    }

    /// Fill only.
    pub fn fill(color: Color) -> Self {
        Self {
            stroke: None,
            fill: Some(color),
        }
    }

    /// Add a fill to this style.
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// An animated spin rotation.
pub struct SpinRotation {
    /// Rotation axis.
    pub axis: RotationAxis,
    /// Angle in radians over the element's local time.
    pub angle: Anim<f64>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Spin arrow with a dot at its center.
pub struct SpinVisual {
    /// Arrow center.
    pub center: Point,
    /// Arrow length.
    pub length: f64,
    /// Tip length.
    pub tip_length: f64,
    /// Shaft width.
    pub stroke_width: f64,
    /// Center dot radius.
    pub dot_radius: f64,
    /// Direction before animated rotations.
    pub orientation: [f64; 3],
    /// Tip normal before animated rotations.
    pub side: [f64; 3],
    /// Rotations applied in order after the base state.
    pub rotations: Vec<SpinRotation>,
    /// Arrow color.
    pub color: Color,
    /// Center dot color; not affected by color animations.
    pub dot_color: Color,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// What an element draws.
pub enum Visual {
    /// Vector path in scene units.
    Path {
        /// Geometry.
        path: BezPath,
        /// Paint.
        style: Style,
    },
    /// Image asset.
    Image {
        /// Asset key.
        asset: String,
        /// Center in scene units.
        center: Point,
        /// Height in scene units before rotation.
        height: f64,
        /// Counter-clockwise quarter turns.
        quarter_turns: u8,
    },
    /// Label asset.
    Label {
        /// Asset key.
        asset: String,
        /// Scene point the anchor is placed at.
        position: Point,
        /// Anchor within the label box.
        anchor: Anchor,
    },
    /// Spin glyph.
    Spin(SpinVisual),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Animated element properties.
pub struct ElementProps {
    /// Transform in scene units.
    pub transform: Anim<Transform2D>,
    /// Opacity, clamped to `0..=1` at evaluation.
    pub opacity: Anim<f64>,
    /// Drawn fraction of a path's length; other visuals fade with it.
    pub reveal: Anim<f64>,
    /// Replaces stroke, fill and spin colors when set.
    pub color: Option<Anim<Color>>,
}

impl Default for ElementProps {
    fn default() -> Self {
        Self {
            transform: Anim::constant(Transform2D::default()),
            opacity: Anim::constant(1.0),
            reveal: Anim::constant(1.0),
            color: None,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// A visual with a lifetime on the timeline.
pub struct Element {
    /// Stable identifier.
    pub id: String,
    /// Paint order; higher draws later.
    pub z: i32,
    /// Frames the element is visible in.
    pub range: FrameRange,
    /// What to draw.
    pub visual: Visual,
    /// Animated properties, sampled relative to `range.start`.
    pub props: ElementProps,
}

impl Scene {
    /// Check timing, canvas, asset references and animations.
    pub fn validate(&self) -> LarmorResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(LarmorError::validation("fps must have num>0 and den>0"));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(LarmorError::validation("canvas width/height must be > 0"));
        }
        if self.duration.0 == 0 {
            return Err(LarmorError::validation("duration must be > 0 frames"));
        }
        if !(self.camera.frame_width > 0.0 && self.camera.frame_height > 0.0) {
            return Err(LarmorError::validation("camera frame must be > 0"));
        }

        for el in &self.elements {
            if el.range.start.0 > el.range.end.0 {
                return Err(LarmorError::validation(format!(
                    "element '{}' has invalid range (start > end)",
                    el.id
                )));
            }
            if el.range.end.0 > self.duration.0 {
                return Err(LarmorError::validation(format!(
                    "element '{}' range exceeds scene duration",
                    el.id
                )));
            }
            match &el.visual {
                Visual::Image { asset, height, .. } => {
                    self.expect_asset(&el.id, asset, |a| matches!(a, Asset::Image(_)))?;
                    if *height <= 0.0 {
                        return Err(LarmorError::validation(format!(
                            "element '{}' image height must be > 0",
                            el.id
                        )));
                    }
                }
                Visual::Label { asset, .. } => {
                    self.expect_asset(&el.id, asset, |a| matches!(a, Asset::Label(_)))?;
                }
                Visual::Spin(spin) => {
                    for r in &spin.rotations {
                        r.angle.validate()?;
                    }
                }
                Visual::Path { .. } => {}
            }
            el.props.transform.validate()?;
            el.props.opacity.validate()?;
            el.props.reveal.validate()?;
            if let Some(color) = &el.props.color {
                color.validate()?;
            }
        }

        for (key, asset) in &self.assets {
            if let Asset::Label(label) = asset {
                if label.parts.is_empty() {
                    return Err(LarmorError::validation(format!(
                        "label '{key}' has no parts"
                    )));
                }
                if label.size <= 0.0 {
                    return Err(LarmorError::validation(format!(
                        "label '{key}' size must be > 0"
                    )));
                }
            }
        }

        Ok(())
    }

    fn expect_asset(
        &self,
        element: &str,
        key: &str,
        kind: impl Fn(&Asset) -> bool,
    ) -> LarmorResult<()> {
        match self.assets.get(key) {
            Some(a) if kind(a) => Ok(()),
            Some(_) => Err(LarmorError::validation(format!(
                "element '{element}' references asset '{key}' of the wrong kind"
            ))),
            None => Err(LarmorError::validation(format!(
                "element '{element}' references missing asset key '{key}'"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
