use std::f64::consts::FRAC_PI_2;

use crate::{
    assets::store::{AssetId, PreparedAsset, PreparedAssetStore},
    eval::evaluator::{EvaluatedFrame, EvaluatedVisual, SpinState},
    foundation::core::{Affine, BezPath, Canvas, Color, Point, Vec2},
    foundation::error::{LarmorError, LarmorResult},
    scene::model::{Anchor, Scene, Style},
    shapes::{self, SHAPE_TOLERANCE},
};

#[derive(Clone, Debug)]
/// Backend-agnostic draw list for one frame.
pub struct RenderPlan {
    /// Output size.
    pub canvas: Canvas,
    /// Clear color.
    pub background: Color,
    /// Layers in paint order, one per visible element.
    pub layers: Vec<Layer>,
}

#[derive(Clone, Debug)]
/// Draw ops composited together at one opacity.
pub struct Layer {
    /// Group opacity in `0..=1`.
    pub opacity: f32,
    /// Ops drawn in order.
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug)]
/// Draw operation emitted by the compiler.
pub enum DrawOp {
    /// Non-zero fill of a path.
    FillPath {
        /// Geometry in scene units.
        path: BezPath,
        /// Scene units to pixels.
        transform: Affine,
        /// Straight-alpha fill color.
        color: Color,
    },
    /// Prepared image drawn in its own pixel space.
    Image {
        /// Prepared image.
        asset: AssetId,
        /// Image pixels to canvas pixels.
        transform: Affine,
    },
    /// Prepared label drawn in its own pixel space.
    Label {
        /// Prepared label.
        asset: AssetId,
        /// Label box pixels to canvas pixels.
        transform: Affine,
    },
}

/// Turn an evaluated frame into draw ops.
///
/// Strokes become fills here, reveal trims paths, and image and label boxes
/// are placed from their prepared pixel sizes.
pub fn compile_frame(
    scene: &Scene,
    eval: &EvaluatedFrame,
    assets: &PreparedAssetStore,
) -> LarmorResult<RenderPlan> {
    let world = scene.camera.world_to_px(scene.canvas);
    let px_per_unit = scene.camera.px_per_unit(scene.canvas);

    let mut layers = Vec::with_capacity(eval.nodes.len());
    for node in &eval.nodes {
        let transform = world * node.transform;
        let (ops, opacity) = match &node.visual {
            EvaluatedVisual::Path { path, style } => {
                (path_ops(path, *style, node.reveal, transform), node.opacity)
            }
            EvaluatedVisual::Spin(spin) => (spin_ops(spin, transform), node.opacity * node.reveal),
            EvaluatedVisual::Image {
                asset,
                center,
                height,
                quarter_turns,
            } => {
                let id = assets.id_for_key(asset)?;
                let PreparedAsset::Image(img) = assets.get(id)? else {
                    return Err(LarmorError::evaluation(format!(
                        "asset '{asset}' is not an image"
                    )));
                };
                let op = DrawOp::Image {
                    asset: id,
                    transform: transform
                        * image_placement(
                            *center,
                            *height,
                            *quarter_turns,
                            f64::from(img.width),
                            f64::from(img.height),
                        ),
                };
                (vec![op], node.opacity * node.reveal)
            }
            EvaluatedVisual::Label {
                asset,
                position,
                anchor,
            } => {
                let id = assets.id_for_key(asset)?;
                let PreparedAsset::Label(label) = assets.get(id)? else {
                    return Err(LarmorError::evaluation(format!(
                        "asset '{asset}' is not a label"
                    )));
                };
                let op = DrawOp::Label {
                    asset: id,
                    transform: transform
                        * label_placement(
                            *position,
                            *anchor,
                            label.width_px,
                            label.height_px,
                            px_per_unit,
                        ),
                };
                (vec![op], node.opacity * node.reveal)
            }
        };

        let opacity = (opacity as f32).clamp(0.0, 1.0);
        if opacity <= 0.0 || ops.is_empty() {
            continue;
        }
        layers.push(Layer { opacity, ops });
    }

    Ok(RenderPlan {
        canvas: scene.canvas,
        background: scene.background,
        layers,
    })
}

fn path_ops(path: &BezPath, style: Style, reveal: f64, transform: Affine) -> Vec<DrawOp> {
    let mut ops = Vec::with_capacity(2);
    if reveal <= 0.0 {
        return ops;
    }
    if let Some(fill) = style.fill {
        // Fills fade in with the reveal while the outline is drawn.
        let color = fill.with_opacity(fill.opacity() * reveal);
        if color.a > 0 {
            ops.push(DrawOp::FillPath {
                path: path.clone(),
                transform,
                color,
            });
        }
    }
    if let Some(stroke) = style.stroke
        && stroke.width > 0.0
    {
        let trimmed = shapes::partial_path(path, reveal);
        ops.push(DrawOp::FillPath {
            path: stroke_to_fill(&trimmed, stroke.width),
            transform,
            color: stroke.color,
        });
    }
    ops
}

/// Outline of `path` stroked `width` wide, as a fillable path.
pub fn stroke_to_fill(path: &BezPath, width: f64) -> BezPath {
    let style = kurbo::Stroke::new(width)
        .with_join(kurbo::Join::Round)
        .with_caps(kurbo::Cap::Round);
    kurbo::stroke(
        path.elements().iter().copied(),
        &style,
        &kurbo::StrokeOpts::default(),
        SHAPE_TOLERANCE,
    )
}

fn project(v: [f64; 3]) -> Vec2 {
    Vec2::new(v[0], v[1])
}

/// Shaft, tip and center dot of a spin, foreshortened by its 3D orientation.
pub fn spin_geometry(spin: &SpinState) -> (BezPath, BezPath, BezPath) {
    let center = spin.center;
    let dir = project(spin.orientation);
    let side = project(spin.side);
    let half = spin.length / 2.0;

    let apex = center + dir * half;
    let base = apex - dir * spin.tip_length;
    let tail = center - dir * half;
    let half_width = side * (spin.tip_length / 2.0);

    let shaft = stroke_to_fill(&shapes::line(tail, base), spin.stroke_width);
    let mut tip = BezPath::new();
    tip.move_to(apex);
    tip.line_to(base + half_width);
    tip.line_to(base - half_width);
    tip.close_path();
    let dot = shapes::circle(center, spin.dot_radius);
    (shaft, tip, dot)
}

fn spin_ops(spin: &SpinState, transform: Affine) -> Vec<DrawOp> {
    let (shaft, tip, dot) = spin_geometry(spin);
    [(dot, spin.dot_color), (shaft, spin.color), (tip, spin.color)]
        .into_iter()
        .map(|(path, color)| DrawOp::FillPath {
            path,
            transform,
            color,
        })
        .collect()
}

/// Image pixels (y down, origin top-left) to scene units.
pub fn image_placement(
    center: Point,
    height: f64,
    quarter_turns: u8,
    width_px: f64,
    height_px: f64,
) -> Affine {
    let k = height / height_px.max(1.0);
    Affine::translate(center.to_vec2())
        * Affine::rotate(FRAC_PI_2 * f64::from(quarter_turns % 4))
        * Affine::scale_non_uniform(k, -k)
        * Affine::translate((-width_px / 2.0, -height_px / 2.0))
}

/// Label box pixels (y down, origin top-left) to scene units.
pub fn label_placement(
    position: Point,
    anchor: Anchor,
    width_px: f64,
    height_px: f64,
    px_per_unit: f64,
) -> Affine {
    let w = width_px / px_per_unit;
    let h = height_px / px_per_unit;
    let top_left = Point::new(position.x - anchor.x * w, position.y - anchor.y * h + h);
    Affine::translate(top_left.to_vec2())
        * Affine::scale_non_uniform(1.0 / px_per_unit, -1.0 / px_per_unit)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
