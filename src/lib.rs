//! Larmor renders short MRI physics explainer animations.
//!
//! Scenes are plain data built by the catalogue in [`CATALOG`]:
//!
//! - Build a [`Scene`] with [`build_scene`] against a [`SceneContext`]
//! - Prepare its images and labels once with [`PreparedAssetStore::prepare`]
//! - Render single frames, the last frame as a PNG, or the whole timeline to MP4
//!
//! Everything from evaluation to rasterization is deterministic and CPU-only.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod animation;
pub(crate) mod compile;
/// Render configuration: quality presets, paths and threading.
pub mod config;
pub(crate) mod encode;
pub(crate) mod eval;
pub(crate) mod mathtex;
pub(crate) mod physics;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod scenes;
pub(crate) mod shapes;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Color, Fps, FrameIndex, FrameRange, Point, Rect, Vec2,
};
pub use crate::foundation::error::{LarmorError, LarmorResult};

pub use crate::animation::ease::Ease;
pub use crate::assets::store::{PreparedAsset, PreparedAssetStore};
pub use crate::assets::text::{PreparedFont, TextLayoutEngine};
pub use crate::config::{OutputFormat, Quality, RenderConfig};
pub use crate::encode::png::write_png;
pub use crate::eval::evaluator::{EvaluatedFrame, Evaluator};
pub use crate::physics::axes::{AxisMapping, AxisRange};
pub use crate::physics::kspace::{EpiPlan, Trajectory};
pub use crate::physics::pulse::{GradientPulse, RfPulse};
pub use crate::physics::spins::{EllipticalMask, GridSpec, SpinGlyph, SpinGrid};
pub use crate::render::backend::{
    BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend,
};
pub use crate::render::pipeline::{
    RenderStats, RenderThreading, RenderToMp4Opts, render_frame, render_frames,
    render_frames_with_stats, render_last_frame_png, render_to_mp4, render_to_mp4_with_stats,
};
pub use crate::scene::builder::{Animation, ElementId, SceneBuilder};
pub use crate::scene::model::{Anchor, Camera, LabelAsset, Scene, Style, Visual};
pub use crate::scenes::catalog::{
    CATALOG, SceneContext, SceneEntry, build_scene, find_scene, scene_names,
};
