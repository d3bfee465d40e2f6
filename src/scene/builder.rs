use std::collections::BTreeMap;

use crate::{
    animation::{anim::Anim, ease::Ease},
    foundation::core::{BezPath, Canvas, Color, Fps, FrameIndex, FrameRange, Point},
    foundation::error::{LarmorError, LarmorResult},
    physics::spins::RotationAxis,
    scene::model::{
        Anchor, Asset, Camera, Element, ElementProps, ImageAsset, LabelAsset, Scene, SpinRotation,
        Style, Visual,
    },
    shapes,
};

/// Lines drawn by [`Animation::Flash`].
pub const FLASH_LINES: usize = 12;
/// Length of each flash line.
pub const FLASH_LINE_LENGTH: f64 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Handle to an element registered with a [`SceneBuilder`].
pub struct ElementId(usize);

#[derive(Clone, Debug, PartialEq)]
/// Timeline animation played by [`SceneBuilder::play`].
pub enum Animation {
    /// Show the element and raise its opacity from 0 to 1.
    FadeIn(ElementId),
    /// Lower the element's opacity to 0, then hide it.
    FadeOut(ElementId),
    /// Show the element and draw it progressively.
    Create(ElementId),
    /// Rotate a spin element; linear unless the play call overrides the ease.
    Rotate {
        /// Spin element.
        target: ElementId,
        /// Rotation axis.
        axis: RotationAxis,
        /// Angle in radians.
        angle: f64,
    },
    /// Interpolate the element's color.
    SetColor {
        /// Element to recolor.
        target: ElementId,
        /// Final color.
        color: Color,
    },
    /// Crossfade from one element to another.
    Transform {
        /// Element faded out and hidden.
        from: ElementId,
        /// Element shown and faded in.
        to: ElementId,
    },
    /// Radial lines bursting out of a point.
    Flash {
        /// Burst center.
        center: Point,
        /// Distance from the center to the start of each line.
        radius: f64,
        /// Line color.
        color: Color,
        /// Number of lines.
        lines: usize,
        /// Length of each line.
        line_length: f64,
    },
}

impl Animation {
    /// Flash with the default line count and length.
    pub fn flash(center: Point, radius: f64, color: Color) -> Self {
        Self::Flash {
            center,
            radius,
            color,
            lines: FLASH_LINES,
            line_length: FLASH_LINE_LENGTH,
        }
    }

    fn default_ease(&self) -> Ease {
        match self {
            Self::Rotate { .. } => Ease::Linear,
            _ => Ease::Smooth,
        }
    }
}

type Keys<T> = Vec<(u64, T, Ease)>;

struct Track {
    id: String,
    visual: Visual,
    shown: Option<u64>,
    hidden: Option<u64>,
    opacity: Keys<f64>,
    reveal: Keys<f64>,
    color: Keys<Color>,
    rotations: Vec<(RotationAxis, Keys<f64>)>,
}

impl Track {
    fn base_color(&self) -> Option<Color> {
        match &self.visual {
            Visual::Path { style, .. } => style.stroke.map(|s| s.color).or(style.fill),
            Visual::Spin(spin) => Some(spin.color),
            Visual::Image { .. } | Visual::Label { .. } => None,
        }
    }

    fn current_color(&self) -> Option<Color> {
        self.color
            .last()
            .map(|(_, c, _)| *c)
            .or_else(|| self.base_color())
    }
}

/// Timeline authoring with a frame cursor.
///
/// Elements are registered hidden, shown by [`SceneBuilder::add`] or an
/// entrance animation, and hidden by [`SceneBuilder::remove`] or
/// [`Animation::FadeOut`]. `play` advances the cursor by its run time and
/// `wait` advances it without animating. Elements paint in registration order.
pub struct SceneBuilder {
    name: String,
    camera: Camera,
    canvas: Canvas,
    fps: Fps,
    background: Color,
    assets: BTreeMap<String, Asset>,
    tracks: Vec<Track>,
    cursor: u64,
}

impl SceneBuilder {
    /// Empty scene on a black background with the default camera.
    pub fn new(name: impl Into<String>, canvas: Canvas, fps: Fps) -> Self {
        Self {
            name: name.into(),
            camera: Camera::default(),
            canvas,
            fps,
            background: Color::BLACK,
            assets: BTreeMap::new(),
            tracks: Vec::new(),
            cursor: 0,
        }
    }

    /// Replace the camera.
    pub fn camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Replace the background color.
    pub fn background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Frame rate the timeline is measured in.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Current timeline position in frames.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Register an image file and return its asset key.
    pub fn image_asset(&mut self, source: impl Into<String>) -> String {
        let source = source.into();
        let key = format!("image:{source}");
        self.assets
            .entry(key.clone())
            .or_insert(Asset::Image(ImageAsset { source }));
        key
    }

    /// Register a label and return its asset key.
    pub fn label_asset(&mut self, label: LabelAsset) -> String {
        let key = format!("label:{}", self.assets.len());
        self.assets.insert(key.clone(), Asset::Label(label));
        key
    }

    /// Register a hidden element.
    pub fn insert(&mut self, name: &str, visual: Visual) -> ElementId {
        let index = self.tracks.len();
        self.tracks.push(Track {
            id: format!("{name}#{index}"),
            visual,
            shown: None,
            hidden: None,
            opacity: Vec::new(),
            reveal: Vec::new(),
            color: Vec::new(),
            rotations: Vec::new(),
        });
        ElementId(index)
    }

    /// Register a hidden path element.
    pub fn insert_path(&mut self, name: &str, path: BezPath, style: Style) -> ElementId {
        self.insert(name, Visual::Path { path, style })
    }

    /// Register a hidden label element.
    pub fn insert_label(
        &mut self,
        name: &str,
        label: LabelAsset,
        position: Point,
        anchor: Anchor,
    ) -> ElementId {
        let asset = self.label_asset(label);
        self.insert(
            name,
            Visual::Label {
                asset,
                position,
                anchor,
            },
        )
    }

    /// Register a hidden image element.
    pub fn insert_image(
        &mut self,
        name: &str,
        source: &str,
        center: Point,
        height: f64,
        quarter_turns: u8,
    ) -> ElementId {
        let asset = self.image_asset(source);
        self.insert(
            name,
            Visual::Image {
                asset,
                center,
                height,
                quarter_turns,
            },
        )
    }

    /// Show elements at the cursor without animating.
    pub fn add(&mut self, ids: impl IntoIterator<Item = ElementId>) -> LarmorResult<()> {
        let at = self.cursor;
        for id in ids {
            self.show(id, at)?;
        }
        Ok(())
    }

    /// Hide elements at the cursor.
    pub fn remove(&mut self, ids: impl IntoIterator<Item = ElementId>) -> LarmorResult<()> {
        let at = self.cursor;
        for id in ids {
            self.hide(id, at)?;
        }
        Ok(())
    }

    /// Advance the cursor by `secs` without animating.
    pub fn wait(&mut self, secs: f64) {
        self.cursor += self.fps.secs_to_frames_round(secs);
    }

    /// Run animations together over `run_time` seconds with their default eases.
    pub fn play(
        &mut self,
        run_time: f64,
        anims: impl IntoIterator<Item = Animation>,
    ) -> LarmorResult<()> {
        self.play_inner(run_time, None, anims)
    }

    /// Run animations together over `run_time` seconds with one ease for all.
    pub fn play_eased(
        &mut self,
        run_time: f64,
        ease: Ease,
        anims: impl IntoIterator<Item = Animation>,
    ) -> LarmorResult<()> {
        self.play_inner(run_time, Some(ease), anims)
    }

    fn play_inner(
        &mut self,
        run_time: f64,
        ease: Option<Ease>,
        anims: impl IntoIterator<Item = Animation>,
    ) -> LarmorResult<()> {
        if !(run_time.is_finite() && run_time > 0.0) {
            return Err(LarmorError::animation("play run_time must be > 0"));
        }
        let start = self.cursor;
        let end = start + self.fps.secs_to_frames_round(run_time).max(1);

        for anim in anims {
            let ease = ease.unwrap_or_else(|| anim.default_ease());
            match anim {
                Animation::FadeIn(id) => self.fade(id, start, end, 0.0, 1.0, ease)?,
                Animation::FadeOut(id) => {
                    self.fade(id, start, end, 1.0, 0.0, ease)?;
                    self.hide(id, end)?;
                }
                Animation::Create(id) => {
                    self.show(id, start)?;
                    let track = self.track_mut(id)?;
                    track.reveal.push((start, 0.0, ease));
                    track.reveal.push((end, 1.0, ease));
                }
                Animation::Rotate {
                    target,
                    axis,
                    angle,
                } => {
                    let track = self.track_mut(target)?;
                    if !matches!(track.visual, Visual::Spin(_)) {
                        return Err(LarmorError::animation(format!(
                            "Rotate target '{}' is not a spin",
                            track.id
                        )));
                    }
                    self.show(target, start)?;
                    self.track_mut(target)?
                        .rotations
                        .push((axis, vec![(start, 0.0, ease), (end, angle, ease)]));
                }
                Animation::SetColor { target, color } => {
                    let track = self.track_mut(target)?;
                    let Some(from) = track.current_color() else {
                        return Err(LarmorError::animation(format!(
                            "SetColor target '{}' has no color",
                            track.id
                        )));
                    };
                    track.color.push((start, from, ease));
                    track.color.push((end, color, ease));
                }
                Animation::Transform { from, to } => {
                    self.fade(from, start, end, 1.0, 0.0, ease)?;
                    self.hide(from, end)?;
                    self.fade(to, start, end, 0.0, 1.0, ease)?;
                }
                Animation::Flash {
                    center,
                    radius,
                    color,
                    lines,
                    line_length,
                } => {
                    let mid = start + (end - start) / 2;
                    for seg in shapes::flash_lines(center, radius, lines, line_length) {
                        let id = self.insert_path(
                            "flash",
                            shapes::line(seg.p0, seg.p1),
                            Style::stroke(color, shapes::stroke_units(3.0)),
                        );
                        self.show(id, start)?;
                        self.hide(id, end)?;
                        let track = self.track_mut(id)?;
                        track.reveal.push((start, 0.0, Ease::Smooth));
                        track.reveal.push((mid, 1.0, Ease::Smooth));
                        track.opacity.push((mid, 1.0, Ease::Smooth));
                        track.opacity.push((end, 0.0, Ease::Smooth));
                    }
                }
            }
        }

        self.cursor = end;
        Ok(())
    }

    fn fade(
        &mut self,
        id: ElementId,
        start: u64,
        end: u64,
        from: f64,
        to: f64,
        ease: Ease,
    ) -> LarmorResult<()> {
        self.show(id, start)?;
        let track = self.track_mut(id)?;
        track.opacity.push((start, from, ease));
        track.opacity.push((end, to, ease));
        Ok(())
    }

    fn track_mut(&mut self, id: ElementId) -> LarmorResult<&mut Track> {
        self.tracks
            .get_mut(id.0)
            .ok_or_else(|| LarmorError::animation(format!("unknown element handle {}", id.0)))
    }

    fn show(&mut self, id: ElementId, at: u64) -> LarmorResult<()> {
        let track = self.track_mut(id)?;
        if let Some(hidden) = track.hidden {
            return Err(LarmorError::animation(format!(
                "element '{}' was removed at frame {hidden} and cannot be shown again",
                track.id
            )));
        }
        if track.shown.is_none() {
            track.shown = Some(at);
        }
        Ok(())
    }

    fn hide(&mut self, id: ElementId, at: u64) -> LarmorResult<()> {
        let track = self.track_mut(id)?;
        if track.shown.is_none() {
            return Err(LarmorError::animation(format!(
                "element '{}' is removed before it is shown",
                track.id
            )));
        }
        track.hidden.get_or_insert(at);
        Ok(())
    }

    /// Finish the timeline and validate the scene.
    ///
    /// The scene lasts until the cursor, or one frame for a static scene.
    /// Elements never shown are dropped.
    pub fn build(self) -> LarmorResult<Scene> {
        let duration = self.cursor.max(1);
        let mut elements = Vec::with_capacity(self.tracks.len());

        for (z, track) in self.tracks.into_iter().enumerate() {
            let Some(shown) = track.shown else {
                continue;
            };
            let start = shown.min(duration - 1);
            let end = track.hidden.unwrap_or(duration).clamp(start, duration);
            let local = |keys: Keys<f64>, default: f64| -> Anim<f64> {
                if keys.is_empty() {
                    Anim::constant(default)
                } else {
                    Anim::keyframes(
                        keys.into_iter()
                            .map(|(f, v, e)| (f.saturating_sub(start), v, e)),
                    )
                }
            };

            let color = if track.color.is_empty() {
                None
            } else {
                Some(Anim::keyframes(
                    track
                        .color
                        .into_iter()
                        .map(|(f, v, e)| (f.saturating_sub(start), v, e)),
                ))
            };

            let mut visual = track.visual;
            if let Visual::Spin(spin) = &mut visual {
                spin.rotations = track
                    .rotations
                    .into_iter()
                    .map(|(axis, keys)| SpinRotation {
                        axis,
                        angle: local(keys, 0.0),
                    })
                    .collect();
            }

            elements.push(Element {
                id: track.id,
                z: z as i32,
                range: FrameRange::new(FrameIndex(start), FrameIndex(end))?,
                visual,
                props: ElementProps {
                    opacity: local(track.opacity, 1.0),
                    reveal: local(track.reveal, 1.0),
                    color,
                    ..ElementProps::default()
                },
            });
        }

        let scene = Scene {
            name: self.name,
            camera: self.camera,
            canvas: self.canvas,
            fps: self.fps,
            duration: FrameIndex(duration),
            background: self.background,
            assets: self.assets,
            elements,
        };
        scene.validate()?;
        Ok(scene)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/builder.rs"]
mod tests;
