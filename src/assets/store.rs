use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    assets::decode as assets_decode,
    assets::text::{PreparedFont, PreparedLabel, TextLayoutEngine},
    foundation::error::{LarmorError, LarmorResult},
    foundation::math::Fnv1a64,
    scene::model::{Asset, Scene},
};

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// Prepared asset payload.
pub enum PreparedAsset {
    /// Decoded or rasterized image.
    Image(PreparedImage),
    /// Shaped label.
    Label(PreparedLabel),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Stable hashed identifier used for prepared assets.
pub struct AssetId(pub(crate) u64);

impl AssetId {
    /// Access raw 64-bit identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug)]
/// Immutable store of prepared assets keyed by scene asset keys and hashed ids.
pub struct PreparedAssetStore {
    root: PathBuf,
    ids_by_key: HashMap<String, AssetId>,
    assets_by_id: HashMap<AssetId, PreparedAsset>,
    font: Option<PreparedFont>,
}

impl PreparedAssetStore {
    /// Prepare every asset of `scene`, reading files under `root`.
    ///
    /// Front-loads IO, decoding and text shaping so rendering stays IO-free.
    /// A font is only resolved when the scene has labels.
    #[tracing::instrument(skip_all, fields(scene = %scene.name))]
    pub fn prepare(
        scene: &Scene,
        root: impl Into<PathBuf>,
        font_path: Option<&Path>,
    ) -> LarmorResult<Self> {
        let root = root.into();
        let mut out = Self {
            root,
            ids_by_key: HashMap::new(),
            assets_by_id: HashMap::new(),
            font: None,
        };

        let px_per_unit = scene.camera.px_per_unit(scene.canvas);
        let mut text_engine = None;

        for (asset_key, asset) in &scene.assets {
            let id = Self::hash_id_for(asset_key, asset, px_per_unit);
            let prepared = match asset {
                Asset::Image(a) => {
                    let norm = normalize_rel_path(&a.source)?;
                    let bytes = out.read_bytes(&norm)?;
                    if assets_decode::is_svg(Path::new(&norm)) {
                        PreparedAsset::Image(assets_decode::rasterize_svg(
                            &bytes,
                            scene.canvas.height,
                        )?)
                    } else {
                        PreparedAsset::Image(assets_decode::decode_image(&bytes)?)
                    }
                }
                Asset::Label(label) => {
                    if text_engine.is_none() {
                        let font = PreparedFont::resolve(font_path)?;
                        text_engine = Some(TextLayoutEngine::new(&font)?);
                        out.font = Some(font);
                    }
                    let engine = text_engine
                        .as_mut()
                        .ok_or_else(|| LarmorError::asset("text engine unavailable"))?;
                    PreparedAsset::Label(engine.layout_label(label, label.size * px_per_unit)?)
                }
            };
            out.ids_by_key.insert(asset_key.clone(), id);
            out.assets_by_id.insert(id, prepared);
        }

        tracing::debug!(
            assets = out.assets_by_id.len(),
            font = out.font.is_some(),
            "prepared assets"
        );
        Ok(out)
    }

    /// Root directory used when resolving relative asset paths.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Font shared by every label, if the scene has any.
    pub fn font(&self) -> Option<&PreparedFont> {
        self.font.as_ref()
    }

    /// Lookup prepared [`AssetId`] for a scene asset key.
    pub fn id_for_key(&self, key: &str) -> LarmorResult<AssetId> {
        self.ids_by_key
            .get(key)
            .copied()
            .ok_or_else(|| LarmorError::evaluation(format!("unknown asset key '{key}'")))
    }

    /// Lookup prepared asset data by [`AssetId`].
    pub fn get(&self, id: AssetId) -> LarmorResult<&PreparedAsset> {
        self.assets_by_id
            .get(&id)
            .ok_or_else(|| LarmorError::evaluation(format!("unknown AssetId {}", id.as_u64())))
    }

    fn hash_id_for(key: &str, asset: &Asset, px_per_unit: f64) -> AssetId {
        let mut hasher = Fnv1a64::new_default();
        match asset {
            Asset::Image(a) => {
                hasher.write_u8(b'I');
                hasher.write_bytes(a.source.as_bytes());
            }
            Asset::Label(l) => {
                hasher.write_u8(b'L');
                hasher.write_u8(u8::from(l.math));
                hasher.write_f64(l.size * px_per_unit);
                for part in &l.parts {
                    hasher.write_bytes(part.source.as_bytes());
                    hasher.write_u8(0);
                    hasher.write_bytes(&[part.color.r, part.color.g, part.color.b, part.color.a]);
                }
            }
        }
        hasher.write_u8(0);
        hasher.write_bytes(key.as_bytes());
        AssetId(hasher.finish())
    }

    fn read_bytes(&self, norm_path: &str) -> LarmorResult<Vec<u8>> {
        let path = self.root.join(Path::new(norm_path));
        std::fs::read(&path)
            .with_context(|| format!("read asset bytes from '{}'", path.display()))
            .map_err(LarmorError::from)
    }
}

/// Normalize and validate asset paths relative to the assets directory.
///
/// The result uses `/` separators, drops `.` segments, and rejects absolute
/// paths and parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> LarmorResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(LarmorError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(LarmorError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(LarmorError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(LarmorError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
