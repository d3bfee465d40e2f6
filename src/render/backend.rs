use crate::{
    assets::store::PreparedAssetStore, compile::plan::RenderPlan,
    foundation::error::LarmorResult,
};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy of the pixels, for PNG output.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// A renderer that executes a compiled [`RenderPlan`] into a [`FrameRGBA`].
///
/// Most callers go through [`crate::render_frame`] and friends, which handle
/// evaluation and compilation.
pub trait RenderBackend {
    /// Execute a plan and read back the final frame.
    fn render_plan(
        &mut self,
        plan: &RenderPlan,
        assets: &PreparedAssetStore,
    ) -> LarmorResult<FrameRGBA>;

    /// Settings needed to construct equivalent worker backends for parallel rendering.
    fn worker_render_settings(&self) -> Option<RenderSettings> {
        None
    }
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Backend-agnostic settings.
#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// Replaces the scene background when set (straight-alpha RGBA8).
    pub clear_rgba: Option<[u8; 4]>,
}

/// Create a rendering backend.
pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> LarmorResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new(
            settings.clone(),
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
