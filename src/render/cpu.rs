use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::store::{AssetId, PreparedAsset, PreparedAssetStore, PreparedImage},
    assets::text::PreparedLabel,
    compile::plan::{DrawOp, RenderPlan},
    foundation::core::{Affine, BezPath, Point},
    foundation::error::{LarmorError, LarmorResult},
    render::backend::{FrameRGBA, RenderBackend, RenderSettings},
};

/// CPU raster backend powered by `vello_cpu`.
///
/// Decoded image paints and the label font are cached across frames, so one
/// backend should be reused for a whole render.
pub struct CpuBackend {
    settings: RenderSettings,
    image_cache: HashMap<AssetId, vello_cpu::Image>,
    font: Option<vello_cpu::peniko::FontData>,
}

impl CpuBackend {
    /// Create a backend with empty caches.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            image_cache: HashMap::new(),
            font: None,
        }
    }

    fn image_paint_for(
        &mut self,
        id: AssetId,
        assets: &PreparedAssetStore,
    ) -> LarmorResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(&id) {
            return Ok(paint.clone());
        }
        let PreparedAsset::Image(img) = assets.get(id)? else {
            return Err(LarmorError::evaluation("AssetId is not a PreparedImage"));
        };
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(image_to_pixmap(img)?)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(id, paint.clone());
        Ok(paint)
    }

    fn label_font(
        &mut self,
        assets: &PreparedAssetStore,
    ) -> LarmorResult<vello_cpu::peniko::FontData> {
        if let Some(font) = &self.font {
            return Ok(font.clone());
        }
        let prepared = assets
            .font()
            .ok_or_else(|| LarmorError::evaluation("label drawn without a prepared font"))?;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(prepared.bytes.as_ref().clone()),
            prepared.index,
        );
        self.font = Some(font.clone());
        Ok(font)
    }
}

impl RenderBackend for CpuBackend {
    fn render_plan(
        &mut self,
        plan: &RenderPlan,
        assets: &PreparedAssetStore,
    ) -> LarmorResult<FrameRGBA> {
        let width: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| LarmorError::evaluation("canvas width exceeds u16"))?;
        let height: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| LarmorError::evaluation("canvas height exceeds u16"))?;

        let background = self.settings.clear_rgba.unwrap_or([
            plan.background.r,
            plan.background.g,
            plan.background.b,
            plan.background.a,
        ]);
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        clear_pixmap(&mut pixmap, premul_rgba8(background));

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        for layer in &plan.layers {
            let grouped = layer.opacity < 1.0;
            if grouped {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.push_opacity_layer(layer.opacity);
            }
            for op in &layer.ops {
                self.draw_op(&mut ctx, op, assets)?;
            }
            if grouped {
                ctx.pop_layer();
            }
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn worker_render_settings(&self) -> Option<RenderSettings> {
        Some(self.settings.clone())
    }
}

impl CpuBackend {
    fn draw_op(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        op: &DrawOp,
        assets: &PreparedAssetStore,
    ) -> LarmorResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match op {
            DrawOp::FillPath {
                path,
                transform,
                color,
            } => {
                ctx.set_transform(affine_to_cpu(*transform));
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    color.r, color.g, color.b, color.a,
                ));
                ctx.fill_path(&bezpath_to_cpu(path));
            }
            DrawOp::Image { asset, transform } => {
                let paint = self.image_paint_for(*asset, assets)?;
                let (w, h) = image_paint_size(&paint)?;
                ctx.set_transform(affine_to_cpu(*transform));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            }
            DrawOp::Label { asset, transform } => {
                let PreparedAsset::Label(label) = assets.get(*asset)? else {
                    return Err(LarmorError::evaluation("AssetId is not a PreparedLabel"));
                };
                let font = self.label_font(assets)?;
                draw_label(ctx, label, &font, *transform);
            }
        }
        Ok(())
    }
}

fn draw_label(
    ctx: &mut vello_cpu::RenderContext,
    label: &PreparedLabel,
    font: &vello_cpu::peniko::FontData,
    transform: Affine,
) {
    for run_layout in &label.runs {
        ctx.set_transform(affine_to_cpu(
            transform * Affine::translate(run_layout.offset),
        ));
        for line in run_layout.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

fn premul_rgba8([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    crate::foundation::core::Rgba8Premul::from_straight_rgba(r, g, b, a).to_array()
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_to_pixmap(img: &PreparedImage) -> LarmorResult<vello_cpu::Pixmap> {
    let w: u16 = img
        .width
        .try_into()
        .map_err(|_| LarmorError::evaluation("image width exceeds u16"))?;
    let h: u16 = img
        .height
        .try_into()
        .map_err(|_| LarmorError::evaluation("image height exceeds u16"))?;
    if img.rgba8_premul.len() != img.width as usize * img.height as usize * 4 {
        return Err(LarmorError::evaluation(
            "prepared image byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<_> = img
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn image_paint_size(image: &vello_cpu::Image) -> LarmorResult<(f64, f64)> {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => Ok((f64::from(p.width()), f64::from(p.height()))),
        vello_cpu::ImageSource::OpaqueId(_) => Err(LarmorError::evaluation(
            "image paint has no pixmap to size",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
