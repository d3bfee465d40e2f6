use std::{collections::HashMap, path::Path};

use rayon::prelude::*;

use crate::{
    assets::store::PreparedAssetStore,
    compile::fingerprint::{FrameFingerprint, fingerprint_eval},
    compile::plan::compile_frame,
    encode::ffmpeg::{EncodeConfig, FfmpegEncoder, is_ffmpeg_on_path},
    encode::png::write_png,
    eval::evaluator::{EvaluatedFrame, Evaluator},
    foundation::core::{FrameIndex, FrameRange},
    foundation::error::{LarmorError, LarmorResult},
    render::backend::{FrameRGBA, RenderBackend, RenderSettings},
    render::cpu::CpuBackend,
    scene::model::Scene,
};

/// Evaluate, compile and render a single frame.
///
/// Returns a [`FrameRGBA`] containing **premultiplied** RGBA8 pixels.
#[tracing::instrument(skip(scene, backend, assets), fields(scene = %scene.name))]
pub fn render_frame(
    scene: &Scene,
    frame: FrameIndex,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
) -> LarmorResult<FrameRGBA> {
    let eval = Evaluator::eval_frame(scene, frame)?;
    let plan = compile_frame(scene, &eval, assets)?;
    backend.render_plan(&plan, assets)
}

/// Render a range of frames (inclusive start, exclusive end) sequentially.
pub fn render_frames(
    scene: &Scene,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
) -> LarmorResult<Vec<FrameRGBA>> {
    render_frames_with_stats(scene, range, backend, assets, &RenderThreading::default())
        .map(|(frames, _)| frames)
}

#[derive(Clone, Debug)]
/// How a range of frames is spread over worker threads.
pub struct RenderThreading {
    /// Render chunks of frames on a `rayon` pool.
    pub parallel: bool,
    /// Frames evaluated per chunk; `0` is treated as `1`.
    pub chunk_size: usize,
    /// Worker count, `None` for the `rayon` default.
    pub threads: Option<usize>,
    /// Render identical frames of a chunk once and reuse the pixels,
    /// sequentially or in parallel.
    pub static_frame_elision: bool,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Frame counters reported by the range renderers.
pub struct RenderStats {
    /// Frames produced.
    pub frames_total: u64,
    /// Frames that went through the rasterizer.
    pub frames_rendered: u64,
    /// Frames copied from an identical earlier frame.
    pub frames_elided: u64,
}

impl RenderStats {
    fn absorb(&mut self, other: RenderStats) {
        self.frames_total += other.frames_total;
        self.frames_rendered += other.frames_rendered;
        self.frames_elided += other.frames_elided;
    }
}

/// Render a range of frames, in parallel chunks when `threading.parallel` is set.
///
/// Output order always follows the timeline.
#[tracing::instrument(skip(scene, backend, assets, threading), fields(scene = %scene.name))]
pub fn render_frames_with_stats(
    scene: &Scene,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
    threading: &RenderThreading,
) -> LarmorResult<(Vec<FrameRGBA>, RenderStats)> {
    if range.is_empty() {
        return Err(LarmorError::validation("render range must be non-empty"));
    }
    scene.validate()?;

    let mut out = Vec::with_capacity(range.len_frames().min(4096) as usize);
    let mut stats = RenderStats::default();
    let workers = ParallelWorkers::for_threading(threading, backend)?;

    for chunk in chunks(range, threading.chunk_size)? {
        let (mut frames, chunk_stats) = match workers.as_ref() {
            Some(w) => render_chunk_parallel_cpu(scene, chunk, assets, w, threading)?,
            None => render_chunk_sequential(scene, chunk, backend, assets, threading)?,
        };
        out.append(&mut frames);
        stats.absorb(chunk_stats);
    }

    Ok((out, stats))
}

/// Options for [`render_to_mp4`].
#[derive(Clone, Debug)]
pub struct RenderToMp4Opts {
    /// Frame range to render (start inclusive, end exclusive).
    pub range: FrameRange,
    /// Background color to flatten alpha over (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Whether to overwrite `out_path` if it already exists.
    pub overwrite: bool,
    /// Render threading/chunking configuration.
    pub threading: RenderThreading,
}

impl RenderToMp4Opts {
    /// Whole timeline of `scene`, flattened over its background.
    pub fn for_scene(scene: &Scene) -> LarmorResult<Self> {
        let bg = scene.background;
        Ok(Self {
            range: FrameRange::new(FrameIndex(0), scene.duration)?,
            bg_rgba: [bg.r, bg.g, bg.b, 255],
            overwrite: true,
            threading: RenderThreading::default(),
        })
    }
}

/// Render a scene to an MP4 by invoking the system `ffmpeg` binary.
///
/// `ffmpeg` must be installed and on `PATH`.
pub fn render_to_mp4(
    scene: &Scene,
    out_path: impl Into<std::path::PathBuf>,
    opts: RenderToMp4Opts,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
) -> LarmorResult<()> {
    render_to_mp4_with_stats(scene, out_path, opts, backend, assets).map(|_| ())
}

/// [`render_to_mp4`], reporting how many frames were rasterized or elided.
///
/// Chunks are encoded as soon as they are rendered, so memory stays bounded
/// by the chunk size.
#[tracing::instrument(skip_all, fields(scene = %scene.name))]
pub fn render_to_mp4_with_stats(
    scene: &Scene,
    out_path: impl Into<std::path::PathBuf>,
    opts: RenderToMp4Opts,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
) -> LarmorResult<RenderStats> {
    if opts.range.end.0 > scene.duration.0 {
        return Err(LarmorError::validation(
            "render_to_mp4 range must be within scene duration",
        ));
    }
    if opts.range.is_empty() {
        return Err(LarmorError::validation(
            "render_to_mp4 range must be non-empty",
        ));
    }
    scene.validate()?;

    if !is_ffmpeg_on_path() {
        return Err(LarmorError::evaluation(
            "ffmpeg is required for MP4 rendering, but was not found on PATH",
        ));
    }

    let cfg = EncodeConfig {
        width: scene.canvas.width,
        height: scene.canvas.height,
        fps: scene.fps,
        out_path: out_path.into(),
        overwrite: opts.overwrite,
    };
    let mut enc = FfmpegEncoder::new(cfg, opts.bg_rgba)?;
    let mut stats = RenderStats::default();
    let workers = ParallelWorkers::for_threading(&opts.threading, backend)?;

    for chunk in chunks(opts.range, opts.threading.chunk_size)? {
        let (frames, chunk_stats) = match workers.as_ref() {
            Some(w) => render_chunk_parallel_cpu(scene, chunk, assets, w, &opts.threading)?,
            None => render_chunk_sequential(scene, chunk, backend, assets, &opts.threading)?,
        };
        for frame in &frames {
            enc.encode_frame(frame)?;
        }
        stats.absorb(chunk_stats);
        tracing::debug!(
            done = enc.frames_written(),
            total = opts.range.len_frames(),
            "rendered chunk"
        );
    }

    enc.finish()?;
    tracing::info!(
        frames = stats.frames_total,
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "mp4 render complete"
    );
    Ok(stats)
}

/// Render the final frame of `scene` and save it as a PNG.
pub fn render_last_frame_png(
    scene: &Scene,
    out_path: &Path,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
) -> LarmorResult<FrameRGBA> {
    let last = FrameIndex(scene.duration.0.saturating_sub(1));
    let frame = render_frame(scene, last, backend, assets)?;
    write_png(&frame, out_path)?;
    Ok(frame)
}

struct ParallelWorkers {
    pool: rayon::ThreadPool,
    settings: RenderSettings,
}

impl ParallelWorkers {
    fn for_threading(
        threading: &RenderThreading,
        backend: &dyn RenderBackend,
    ) -> LarmorResult<Option<Self>> {
        if !threading.parallel {
            return Ok(None);
        }
        let settings = backend.worker_render_settings().ok_or_else(|| {
            LarmorError::evaluation(
                "parallel render requires backend worker settings support (CpuBackend)",
            )
        })?;
        Ok(Some(Self {
            pool: build_thread_pool(threading.threads)?,
            settings,
        }))
    }
}

fn chunks(range: FrameRange, chunk_size: usize) -> LarmorResult<Vec<FrameRange>> {
    let size = normalized_chunk_size(chunk_size);
    let mut out = Vec::new();
    let mut start = range.start.0;
    while start < range.end.0 {
        let end = (start + size).min(range.end.0);
        out.push(
            FrameRange::new(FrameIndex(start), FrameIndex(end))
                .map_err(|e| LarmorError::evaluation(format!("invalid chunk range: {e}")))?,
        );
        start = end;
    }
    Ok(out)
}

fn render_chunk_sequential(
    scene: &Scene,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
    assets: &PreparedAssetStore,
    threading: &RenderThreading,
) -> LarmorResult<(Vec<FrameRGBA>, RenderStats)> {
    let mut out = Vec::<FrameRGBA>::with_capacity(range.len_frames() as usize);
    let mut first_seen = HashMap::<FrameFingerprint, usize>::new();
    let mut rendered = 0u64;
    for f in range.start.0..range.end.0 {
        let eval = Evaluator::eval_frame_unchecked(scene, FrameIndex(f))?;
        if threading.static_frame_elision {
            let fp = fingerprint_eval(&eval);
            if let Some(&earlier) = first_seen.get(&fp) {
                let frame = out[earlier].clone();
                out.push(frame);
                continue;
            }
            first_seen.insert(fp, out.len());
        }
        let plan = compile_frame(scene, &eval, assets)?;
        out.push(backend.render_plan(&plan, assets)?);
        rendered += 1;
    }
    let total = range.len_frames();
    Ok((
        out,
        RenderStats {
            frames_total: total,
            frames_rendered: rendered,
            frames_elided: total - rendered,
        },
    ))
}

fn render_chunk_parallel_cpu(
    scene: &Scene,
    range: FrameRange,
    assets: &PreparedAssetStore,
    workers: &ParallelWorkers,
    threading: &RenderThreading,
) -> LarmorResult<(Vec<FrameRGBA>, RenderStats)> {
    let mut evals = Vec::<(EvaluatedFrame, FrameFingerprint)>::with_capacity(
        range.len_frames() as usize,
    );
    for f in range.start.0..range.end.0 {
        let eval = Evaluator::eval_frame_unchecked(scene, FrameIndex(f))?;
        let fingerprint = fingerprint_eval(&eval);
        evals.push((eval, fingerprint));
    }

    let (unique_indices, frame_to_unique) = if threading.static_frame_elision {
        dedupe_fingerprints(evals.iter().map(|(_, fp)| *fp))
    } else {
        ((0..evals.len()).collect(), (0..evals.len()).collect())
    };

    let rendered = workers.pool.install(|| {
        unique_indices
            .par_iter()
            .map_init(
                || CpuBackend::new(workers.settings.clone()),
                |worker_backend, eval_idx| -> LarmorResult<FrameRGBA> {
                    let plan = compile_frame(scene, &evals[*eval_idx].0, assets)?;
                    worker_backend.render_plan(&plan, assets)
                },
            )
            .collect::<Vec<_>>()
    });
    let unique_frames = rendered.into_iter().collect::<LarmorResult<Vec<_>>>()?;

    let mut out = Vec::<FrameRGBA>::with_capacity(frame_to_unique.len());
    for u in frame_to_unique {
        let frame = unique_frames.get(u).ok_or_else(|| {
            LarmorError::evaluation("internal error: unique frame missing")
        })?;
        out.push(frame.clone());
    }

    let total = evals.len() as u64;
    let rendered_count = unique_indices.len() as u64;
    Ok((
        out,
        RenderStats {
            frames_total: total,
            frames_rendered: rendered_count,
            frames_elided: total.saturating_sub(rendered_count),
        },
    ))
}

/// First occurrence of each fingerprint, and the unique slot of every frame.
fn dedupe_fingerprints(
    fingerprints: impl Iterator<Item = FrameFingerprint>,
) -> (Vec<usize>, Vec<usize>) {
    let mut unique_indices = Vec::new();
    let mut frame_to_unique = Vec::new();
    let mut first = HashMap::<FrameFingerprint, usize>::new();
    for (idx, fp) in fingerprints.enumerate() {
        let slot = *first.entry(fp).or_insert_with(|| {
            unique_indices.push(idx);
            unique_indices.len() - 1
        });
        frame_to_unique.push(slot);
    }
    (unique_indices, frame_to_unique)
}

fn build_thread_pool(threads: Option<usize>) -> LarmorResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(LarmorError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LarmorError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    chunk_size.max(1) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
