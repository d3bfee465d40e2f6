use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    assets::store::PreparedImage,
    foundation::error::{LarmorError, LarmorResult},
};

/// Largest raster produced from an SVG, per side.
const MAX_SVG_DIM: u32 = 16_384;

/// Decode PNG/JPEG/... bytes into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> LarmorResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes and rasterize them `height_px` tall, keeping the aspect ratio.
pub fn rasterize_svg(bytes: &[u8], height_px: u32) -> LarmorResult<PreparedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    if !(size.width() > 0.0 && size.height() > 0.0) {
        return Err(LarmorError::asset("svg has invalid width/height"));
    }
    let scale = height_px.max(1) as f32 / size.height();
    let width = ((size.width() * scale).ceil() as u32).max(1);
    let height = height_px.max(1);
    if width > MAX_SVG_DIM || height > MAX_SVG_DIM {
        return Err(LarmorError::asset(format!(
            "svg raster size too large: {width}x{height} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| LarmorError::asset("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(scale, scale);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

/// Pixel size of an image file without decoding its pixels.
pub fn image_size(path: &Path) -> LarmorResult<(u32, u32)> {
    if is_svg(path) {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read svg from '{}'", path.display()))?;
        let tree = usvg::Tree::from_data(&bytes, &usvg::Options::default())
            .context("parse svg tree")?;
        let size = tree.size();
        return Ok((size.width().ceil() as u32, size.height().ceil() as u32));
    }
    let dims = image::image_dimensions(path)
        .with_context(|| format!("read image size of '{}'", path.display()))?;
    Ok(dims)
}

/// Whether `path` has an `.svg` extension.
pub fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
