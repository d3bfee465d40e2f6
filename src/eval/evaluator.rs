use crate::{
    animation::anim::SampleCtx,
    foundation::core::{Affine, BezPath, Color, FrameIndex, Point},
    foundation::error::{LarmorError, LarmorResult},
    scene::model::{Anchor, Element, Scene, SpinVisual, Style, Visual},
};

#[derive(Clone, Debug, serde::Serialize)]
/// Every element visible at one frame, in paint order.
pub struct EvaluatedFrame {
    /// Frame that was evaluated.
    pub frame: FrameIndex,
    /// Visible elements sorted by `(z, start, id)`.
    pub nodes: Vec<EvaluatedNode>,
}

#[derive(Clone, Debug, serde::Serialize)]
/// One element with its properties sampled.
pub struct EvaluatedNode {
    /// Element id.
    pub element_id: String,
    /// Paint order.
    pub z: i32,
    /// Transform in scene units.
    pub transform: Affine,
    /// Opacity in `0..=1`.
    pub opacity: f64,
    /// Drawn fraction in `0..=1`.
    pub reveal: f64,
    /// Visual with animated colors and rotations resolved.
    pub visual: EvaluatedVisual,
}

#[derive(Clone, Debug, serde::Serialize)]
/// Resolved visual content.
pub enum EvaluatedVisual {
    /// Path with its final paint.
    Path {
        /// Geometry in scene units.
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
        /// Height in scene units.
        height: f64,
        /// Counter-clockwise quarter turns.
        quarter_turns: u8,
    },
    /// Label asset.
    Label {
        /// Asset key.
        asset: String,
        /// Anchor position in scene units.
        position: Point,
        /// Anchor within the label box.
        anchor: Anchor,
    },
    /// Spin arrow at its current rotation.
    Spin(SpinState),
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Spin arrow geometry after all rotations up to the evaluated frame.
pub struct SpinState {
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
    /// Current direction.
    pub orientation: [f64; 3],
    /// Current tip normal.
    pub side: [f64; 3],
    /// Current color.
    pub color: Color,
    /// Center dot color.
    pub dot_color: Color,
}

/// Samples a [`Scene`] at a frame.
pub struct Evaluator;

impl Evaluator {
    /// Validate the scene, then evaluate `frame`.
    #[tracing::instrument(skip(scene))]
    pub fn eval_frame(scene: &Scene, frame: FrameIndex) -> LarmorResult<EvaluatedFrame> {
        scene.validate()?;
        Self::eval_frame_unchecked(scene, frame)
    }

    /// Evaluate `frame` on a scene that was already validated.
    pub(crate) fn eval_frame_unchecked(
        scene: &Scene,
        frame: FrameIndex,
    ) -> LarmorResult<EvaluatedFrame> {
        if frame.0 >= scene.duration.0 {
            return Err(LarmorError::evaluation("frame is out of bounds"));
        }

        let mut nodes_with_key: Vec<((i32, u64, String), EvaluatedNode)> = Vec::new();
        for el in &scene.elements {
            if !el.range.contains(frame) {
                continue;
            }
            let node = eval_element(scene, el, frame)?;
            let sort_key = (node.z, el.range.start.0, node.element_id.clone());
            nodes_with_key.push((sort_key, node));
        }

        nodes_with_key.sort_by(|a, b| a.0.cmp(&b.0));
        let nodes = nodes_with_key.into_iter().map(|(_, n)| n).collect();

        Ok(EvaluatedFrame { frame, nodes })
    }
}

fn eval_element(scene: &Scene, el: &Element, frame: FrameIndex) -> LarmorResult<EvaluatedNode> {
    let ctx = SampleCtx {
        frame,
        fps: scene.fps,
        clip_local: FrameIndex(frame.0 - el.range.start.0),
    };

    let opacity = el.props.opacity.sample(ctx)?.clamp(0.0, 1.0);
    let reveal = el.props.reveal.sample(ctx)?.clamp(0.0, 1.0);
    let transform = el.props.transform.sample(ctx)?.to_affine();
    let color = el.props.color.as_ref().map(|c| c.sample(ctx)).transpose()?;

    let visual = match &el.visual {
        Visual::Path { path, style } => EvaluatedVisual::Path {
            path: path.clone(),
            style: recolor(*style, color),
        },
        Visual::Image {
            asset,
            center,
            height,
            quarter_turns,
        } => EvaluatedVisual::Image {
            asset: asset.clone(),
            center: *center,
            height: *height,
            quarter_turns: *quarter_turns,
        },
        Visual::Label {
            asset,
            position,
            anchor,
        } => EvaluatedVisual::Label {
            asset: asset.clone(),
            position: *position,
            anchor: *anchor,
        },
        Visual::Spin(spin) => EvaluatedVisual::Spin(eval_spin(spin, ctx, color)?),
    };

    Ok(EvaluatedNode {
        element_id: el.id.clone(),
        z: el.z,
        transform,
        opacity,
        reveal,
        visual,
    })
}

fn recolor(mut style: Style, color: Option<Color>) -> Style {
    let Some(color) = color else {
        return style;
    };
    if let Some(stroke) = &mut style.stroke {
        stroke.color = color;
    }
    if let Some(fill) = &mut style.fill {
        *fill = color;
    }
    style
}

fn eval_spin(spin: &SpinVisual, ctx: SampleCtx, color: Option<Color>) -> LarmorResult<SpinState> {
    let mut orientation = spin.orientation;
    let mut side = spin.side;
    for rotation in &spin.rotations {
        let angle = rotation.angle.sample(ctx)?;
        orientation = rotation.axis.rotate(orientation, angle);
        side = rotation.axis.rotate(side, angle);
    }
    Ok(SpinState {
        center: spin.center,
        length: spin.length,
        tip_length: spin.tip_length,
        stroke_width: spin.stroke_width,
        dot_radius: spin.dot_radius,
        orientation,
        side,
        color: color.unwrap_or(spin.color),
        dot_color: spin.dot_color,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
