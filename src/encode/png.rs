use std::path::Path;

use anyhow::Context as _;

use crate::{
    encode::ffmpeg::ensure_parent_dir, foundation::error::LarmorResult,
    render::backend::FrameRGBA,
};

/// Write `frame` as a straight-alpha RGBA PNG, creating parent directories.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> LarmorResult<()> {
    ensure_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    tracing::info!(out = %path.display(), "wrote png");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
