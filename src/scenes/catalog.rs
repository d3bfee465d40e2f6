use std::path::PathBuf;

use crate::{
    assets::decode,
    assets::store::normalize_rel_path,
    config::{OutputFormat, RenderConfig},
    foundation::error::{LarmorError, LarmorResult},
    scene::builder::SceneBuilder,
    scene::model::Scene,
    scenes::{encoding, equations, kspace, sequence},
};

#[derive(Clone, Debug)]
/// Output format and asset location every scene is built against.
pub struct SceneContext {
    /// Canvas and frame rate.
    pub format: OutputFormat,
    /// Directory holding the anatomical images.
    pub assets_dir: PathBuf,
}

impl SceneContext {
    /// Context for `format`, reading images from `assets_dir`.
    pub fn new(format: OutputFormat, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            format,
            assets_dir: assets_dir.into(),
        }
    }

    /// Context from a resolved [`RenderConfig`].
    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.format(), config.assets_dir.clone())
    }

    pub(crate) fn builder(&self, name: &str) -> SceneBuilder {
        SceneBuilder::new(name, self.format.canvas, self.format.fps)
    }

    /// Pixel size of an image under the assets directory.
    pub(crate) fn image_size(&self, source: &str) -> LarmorResult<(f64, f64)> {
        let norm = normalize_rel_path(source)?;
        let (w, h) = decode::image_size(&self.assets_dir.join(norm))?;
        if w == 0 || h == 0 {
            return Err(LarmorError::asset(format!("image '{source}' is empty")));
        }
        Ok((f64::from(w), f64::from(h)))
    }
}

#[derive(Clone, Copy)]
/// One catalogue scene.
pub struct SceneEntry {
    /// Kebab-case name used on the command line.
    pub name: &'static str,
    /// One-line description for `larmor list`.
    pub summary: &'static str,
    /// Whether the scene reads images from the assets directory.
    pub uses_images: bool,
    build: fn(&SceneContext) -> LarmorResult<Scene>,
}

impl SceneEntry {
    /// Build the scene.
    pub fn build(&self, ctx: &SceneContext) -> LarmorResult<Scene> {
        (self.build)(ctx)
    }
}

impl std::fmt::Debug for SceneEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEntry")
            .field("name", &self.name)
            .field("uses_images", &self.uses_images)
            .finish()
    }
}

const fn entry(
    name: &'static str,
    summary: &'static str,
    uses_images: bool,
    build: fn(&SceneContext) -> LarmorResult<Scene>,
) -> SceneEntry {
    SceneEntry {
        name,
        summary,
        uses_images,
        build,
    }
}

/// Every scene, in presentation order.
pub const CATALOG: &[SceneEntry] = &[
    entry(
        "field-equation",
        "Total field B(x, y, z) as B0 plus three gradients",
        false,
        equations::field_equation,
    ),
    entry(
        "larmor-frequency",
        "Larmor frequency from the local field",
        false,
        equations::larmor_frequency,
    ),
    entry(
        "slice-selection-graph",
        "Gradient line mapping z to frequency, with the RF band it excites",
        false,
        sequence::slice_selection_graph,
    ),
    entry(
        "slice-selection",
        "Spins dephasing along z under the slice-select gradient",
        true,
        encoding::slice_selection,
    ),
    entry(
        "slice-rephasing",
        "Reversed gradient bringing the slice back into phase",
        true,
        encoding::slice_rephasing,
    ),
    entry(
        "spin-signal-equations",
        "Signal of one spin growing into the integral over the slice",
        false,
        equations::spin_signal_equations,
    ),
    entry(
        "frequency-encoding",
        "Column-dependent precession under G_x",
        true,
        encoding::frequency_encoding,
    ),
    entry(
        "phase-encoding",
        "Row-dependent phase left behind by G_y",
        true,
        encoding::phase_encoding,
    ),
    entry(
        "phi-definition",
        "Phase as the integral of angular frequency",
        false,
        equations::phi_definition,
    ),
    entry(
        "omega-relations",
        "Frequency in terms of the in-plane gradients",
        false,
        equations::omega_relations,
    ),
    entry(
        "final-phi",
        "Accumulated phase from both gradients",
        false,
        equations::final_phi,
    ),
    entry(
        "total-signal",
        "Signal equation with gradient phase terms",
        false,
        equations::total_signal,
    ),
    entry(
        "image-to-kspace",
        "Image space and k-space, linked by FOV and resolution",
        true,
        kspace::image_to_kspace,
    ),
    entry(
        "kspace-relations",
        "Resolution, FOV and sample-count relations",
        false,
        equations::kspace_relations,
    ),
    entry(
        "gre-sequence",
        "Gradient echo pulse sequence diagram",
        false,
        sequence::gre_sequence,
    ),
    entry(
        "kspace-traversal",
        "k-space position under phase and frequency encoding",
        false,
        sequence::kspace_traversal,
    ),
    entry(
        "epi-traversal",
        "Echo-planar readout sweeping every line in one shot",
        false,
        sequence::epi_traversal,
    ),
];

/// Names of every catalogue scene.
pub fn scene_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|e| e.name)
}

/// Catalogue entry named `name`.
pub fn find_scene(name: &str) -> LarmorResult<&'static SceneEntry> {
    CATALOG.iter().find(|e| e.name == name).ok_or_else(|| {
        LarmorError::validation(format!("unknown scene '{name}'; see `larmor list`"))
    })
}

/// Build the catalogue scene named `name`.
#[tracing::instrument(skip(ctx))]
pub fn build_scene(name: &str, ctx: &SceneContext) -> LarmorResult<Scene> {
    let scene = find_scene(name)?.build(ctx)?;
    tracing::debug!(
        elements = scene.elements.len(),
        frames = scene.duration.0,
        "built scene"
    );
    Ok(scene)
}

#[cfg(test)]
#[path = "../../tests/unit/scenes/catalog.rs"]
mod tests;
