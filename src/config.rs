//! Render configuration: quality presets, directories and threading.
//!
//! Values are layered as defaults < JSON file < environment < CLI flags. The
//! CLI layer lives in the binary; everything below it is here.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::core::{Canvas, Color, Fps},
    foundation::error::{LarmorError, LarmorResult},
    render::backend::RenderSettings,
    render::pipeline::RenderThreading,
};

/// Output directory override.
pub const ENV_OUTPUT_DIR: &str = "LARMOR_OUTPUT_DIR";
/// Assets directory override.
pub const ENV_ASSETS_DIR: &str = "LARMOR_ASSETS_DIR";
/// Label font file override.
pub const ENV_FONT: &str = "LARMOR_FONT";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Canvas and frame rate preset.
pub enum Quality {
    /// 854×480 at 15 fps.
    Low,
    /// 1280×720 at 30 fps.
    #[default]
    Medium,
    /// 1920×1080 at 60 fps.
    High,
    /// 3840×2160 at 60 fps.
    #[serde(rename = "4k")]
    FourK,
}

impl Quality {
    /// Output size of the preset.
    pub fn canvas(self) -> Canvas {
        let (width, height) = match self {
            Self::Low => (854, 480),
            Self::Medium => (1280, 720),
            Self::High => (1920, 1080),
            Self::FourK => (3840, 2160),
        };
        Canvas { width, height }
    }

    /// Frame rate of the preset.
    pub fn fps(self) -> Fps {
        let num = match self {
            Self::Low => 15,
            Self::Medium => 30,
            Self::High | Self::FourK => 60,
        };
        Fps { num, den: 1 }
    }

    /// Short name used in output folders, e.g. `480p15`.
    pub fn folder_name(self) -> String {
        format!("{}p{}", self.canvas().height, self.fps().num)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Resolved canvas and frame rate that scenes are built for.
pub struct OutputFormat {
    /// Output size.
    pub canvas: Canvas,
    /// Frame rate.
    pub fps: Fps,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Settings shared by every CLI command.
pub struct RenderConfig {
    /// Preset used when `canvas`/`fps` are not set.
    pub quality: Quality,
    /// Explicit canvas, overriding the preset.
    pub canvas: Option<Canvas>,
    /// Explicit frame rate, overriding the preset.
    pub fps: Option<Fps>,
    /// Root for `videos/` and `images/`.
    pub output_dir: PathBuf,
    /// Directory holding scene images.
    pub assets_dir: PathBuf,
    /// Label font file; system fonts are searched when unset.
    pub font: Option<PathBuf>,
    /// Background override as `#RRGGBB` or `#RRGGBBAA`.
    pub background: Option<String>,
    /// Render frames on a thread pool.
    pub parallel: bool,
    /// Worker count for parallel rendering.
    pub threads: Option<usize>,
    /// Frames per parallel chunk.
    pub chunk_size: usize,
    /// Reuse pixels of identical frames when rendering in parallel.
    pub static_frame_elision: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            canvas: None,
            fps: None,
            output_dir: PathBuf::from("media"),
            assets_dir: PathBuf::from("assets"),
            font: None,
            background: None,
            parallel: false,
            threads: None,
            chunk_size: 64,
            static_frame_elision: true,
        }
    }
}

impl RenderConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> LarmorResult<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok());
        tracing::debug!(?cfg, "loaded render config");
        Ok(cfg)
    }

    /// Parse a JSON config file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> LarmorResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            LarmorError::serde(format!("parse config '{}': {e}", path.display()))
        })
    }

    /// Apply the `LARMOR_*` overrides found by `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = non_empty(ENV_ASSETS_DIR) {
            self.assets_dir = PathBuf::from(v);
        }
        if let Some(v) = non_empty(ENV_FONT) {
            self.font = Some(PathBuf::from(v));
        }
    }

    /// Reject values no render can use.
    pub fn validate(&self) -> LarmorResult<()> {
        let format = self.format();
        if format.canvas.width == 0 || format.canvas.height == 0 {
            return Err(LarmorError::validation("canvas width/height must be > 0"));
        }
        Fps::new(format.fps.num, format.fps.den)?;
        if self.threads == Some(0) {
            return Err(LarmorError::validation("threads must be >= 1 when set"));
        }
        self.background_color()?;
        Ok(())
    }

    /// Canvas and frame rate after applying explicit overrides to the preset.
    pub fn format(&self) -> OutputFormat {
        OutputFormat {
            canvas: self.canvas.unwrap_or_else(|| self.quality.canvas()),
            fps: self.fps.unwrap_or_else(|| self.quality.fps()),
        }
    }

    /// Parsed background override.
    pub fn background_color(&self) -> LarmorResult<Option<Color>> {
        self.background.as_deref().map(Color::from_hex).transpose()
    }

    /// Backend settings carrying the background override.
    pub fn render_settings(&self) -> LarmorResult<RenderSettings> {
        Ok(RenderSettings {
            clear_rgba: self.background_color()?.map(|c| [c.r, c.g, c.b, c.a]),
        })
    }

    /// Threading options for range renders.
    pub fn threading(&self) -> RenderThreading {
        RenderThreading {
            parallel: self.parallel,
            chunk_size: self.chunk_size,
            threads: self.threads,
            static_frame_elision: self.static_frame_elision,
        }
    }

    /// `<output>/videos/<quality>/<scene>.mp4`.
    pub fn video_path(&self, scene: &str) -> PathBuf {
        self.output_dir
            .join("videos")
            .join(self.folder_name())
            .join(format!("{scene}.mp4"))
    }

    /// `<output>/images/<scene>.png`.
    pub fn image_path(&self, scene: &str) -> PathBuf {
        self.output_dir.join("images").join(format!("{scene}.png"))
    }

    fn folder_name(&self) -> String {
        let format = self.format();
        if self.canvas.is_none() && self.fps.is_none() {
            return self.quality.folder_name();
        }
        format!(
            "{}p{}",
            format.canvas.height,
            format.fps.as_f64().round() as u64
        )
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
