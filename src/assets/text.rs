//! Label layout: TeX-subset runs shaped with Parley from a single font.

use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    foundation::core::{Color, Vec2},
    foundation::error::{LarmorError, LarmorResult},
    mathtex::{MathNode, layout_math, parse_parts},
    scene::model::LabelAsset,
};

/// Families tried, in order, when no font file is configured.
const PREFERRED_FAMILIES: &[&str] = &[
    "CMU Serif",
    "DejaVu Serif",
    "Noto Serif",
    "Liberation Serif",
    "DejaVu Sans",
    "Noto Sans",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Color> for TextBrushRgba8 {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

#[derive(Clone, Debug)]
/// Font bytes shared by every label of a scene.
pub struct PreparedFont {
    /// Raw font file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection.
    pub index: u32,
}

impl PreparedFont {
    /// Read a font file.
    pub fn from_file(path: &Path) -> LarmorResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font from '{}'", path.display()))?;
        Ok(Self {
            bytes: Arc::new(bytes),
            index: 0,
        })
    }

    /// First installed family from a list of serif and sans fonts with math coverage.
    pub fn from_system() -> LarmorResult<Self> {
        use usvg::fontdb::{Database, Family, Query};

        let mut db = Database::new();
        db.load_system_fonts();

        let mut families: Vec<Family<'_>> =
            PREFERRED_FAMILIES.iter().map(|f| Family::Name(*f)).collect();
        families.push(Family::Serif);
        families.push(Family::SansSerif);

        let id = db
            .query(&Query {
                families: &families,
                ..Query::default()
            })
            .ok_or_else(|| {
                LarmorError::asset("no system font found for labels; pass --font FILE")
            })?;
        let (bytes, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| LarmorError::asset("system font data is unavailable"))?;
        tracing::debug!(index, len = bytes.len(), "resolved system font");

        Ok(Self {
            bytes: Arc::new(bytes),
            index,
        })
    }

    /// Configured file if any, the system lookup otherwise.
    pub fn resolve(path: Option<&Path>) -> LarmorResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::from_system(),
        }
    }
}

#[derive(Clone)]
/// One shaped run placed inside a label box.
pub struct PreparedRun {
    /// Shaped text.
    pub layout: Arc<parley::Layout<TextBrushRgba8>>,
    /// Top-left of the layout inside the label box, in pixels.
    pub offset: Vec2,
}

impl std::fmt::Debug for PreparedRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedRun")
            .field("width", &self.layout.width())
            .field("offset", &self.offset)
            .finish()
    }
}

#[derive(Clone, Debug)]
/// Label shaped at its final pixel size.
pub struct PreparedLabel {
    /// Runs in reading order.
    pub runs: Vec<PreparedRun>,
    /// Box width in pixels.
    pub width_px: f64,
    /// Box height in pixels.
    pub height_px: f64,
}

/// Parley contexts bound to one registered font.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
}

impl TextLayoutEngine {
    /// Register `font` and keep its family name for every layout.
    pub fn new(font: &PreparedFont) -> LarmorResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| LarmorError::asset("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| LarmorError::asset("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    /// Family name every layout uses.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape a single line of text.
    pub fn layout_plain(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> LarmorResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(LarmorError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Lay out a label with an em of `em_px` pixels.
    ///
    /// Math labels go through the TeX-subset parser; plain labels become one
    /// run per part. Runs share the baseline, shifted by their rise.
    pub fn layout_label(&mut self, label: &LabelAsset, em_px: f64) -> LarmorResult<PreparedLabel> {
        if !(em_px.is_finite() && em_px > 0.0) {
            return Err(LarmorError::validation("label em size must be > 0"));
        }

        let node = if label.math {
            let sources: Vec<&str> = label.parts.iter().map(|p| p.source.as_str()).collect();
            parse_parts(&sources)?
        } else {
            MathNode::Row(
                label
                    .parts
                    .iter()
                    .enumerate()
                    .map(|(part, p)| MathNode::Text {
                        text: p.source.clone(),
                        part,
                    })
                    .collect(),
            )
        };

        let mut failure = None;
        let math = layout_math(&node, &mut |text, scale| {
            match self.layout_plain(text, (em_px * scale) as f32, TextBrushRgba8::default()) {
                Ok(l) => f64::from(l.width()) / em_px,
                Err(e) => {
                    failure.get_or_insert(e);
                    0.0
                }
            }
        });
        if let Some(e) = failure {
            return Err(e);
        }

        let baseline = math.ascent * em_px;
        let mut runs = Vec::with_capacity(math.runs.len());
        for run in &math.runs {
            let color = label
                .parts
                .get(run.part)
                .map(|p| p.color)
                .unwrap_or(Color::WHITE);
            let layout = self.layout_plain(&run.text, (em_px * run.scale) as f32, color.into())?;
            let run_baseline = layout
                .lines()
                .next()
                .map(|l| f64::from(l.metrics().baseline))
                .unwrap_or(0.0);
            runs.push(PreparedRun {
                layout: Arc::new(layout),
                offset: Vec2::new(run.x * em_px, baseline - run.rise * em_px - run_baseline),
            });
        }

        Ok(PreparedLabel {
            runs,
            width_px: math.width * em_px,
            height_px: math.height() * em_px,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
