use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sha2::Digest as _;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "larmor", version, about = "Render MRI physics explainer animations")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every scene of the catalogue.
    List,
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render the final frame of a scene as a PNG.
    LastFrame(LastFrameArgs),
    /// Print the scene model as JSON.
    Dump(DumpArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Canvas and frame rate preset.
    #[arg(long, value_enum)]
    quality: Option<QualityChoice>,

    /// Directory holding the anatomical images.
    #[arg(long = "assets")]
    assets_dir: Option<PathBuf>,

    /// Font file used for every label (defaults to a system sans-serif).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Root of the `videos/` and `images/` output folders.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// JSON render config, applied before environment and flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render frame chunks on a thread pool.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,

    /// Print diagnostics about label font resolution (family name + SHA-256 of font bytes).
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Catalogue scene name.
    #[arg(long, required_unless_present = "in_path", conflicts_with = "in_path")]
    scene: Option<String>,

    /// Scene JSON written by `larmor dump`.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Catalogue scene name.
    #[arg(long)]
    scene: String,

    /// Output MP4 path (defaults to `<output>/videos/<quality>/<scene>.mp4`).
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct LastFrameArgs {
    /// Catalogue scene name.
    #[arg(long)]
    scene: String,

    /// Output PNG path (defaults to `<output>/images/<scene>.png`).
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct DumpArgs {
    /// Catalogue scene name.
    #[arg(long)]
    scene: String,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QualityChoice {
    Low,
    Medium,
    High,
    #[value(name = "4k")]
    FourK,
}

impl From<QualityChoice> for larmor::Quality {
    fn from(q: QualityChoice) -> Self {
        match q {
            QualityChoice::Low => Self::Low,
            QualityChoice::Medium => Self::Medium,
            QualityChoice::High => Self::High,
            QualityChoice::FourK => Self::FourK,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    match cli.cmd {
        Command::List => cmd_list(),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::LastFrame(args) => cmd_last_frame(args),
        Command::Dump(args) => cmd_dump(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(common: &CommonArgs) -> anyhow::Result<larmor::RenderConfig> {
    let mut cfg = larmor::RenderConfig::load(common.config.as_deref())?;
    if let Some(q) = common.quality {
        cfg.quality = q.into();
    }
    if let Some(dir) = &common.assets_dir {
        cfg.assets_dir = dir.clone();
    }
    if let Some(font) = &common.font {
        cfg.font = Some(font.clone());
    }
    if let Some(dir) = &common.output_dir {
        cfg.output_dir = dir.clone();
    }
    if common.parallel {
        cfg.parallel = true;
    }
    if common.threads.is_some() {
        cfg.threads = common.threads;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn build_scene(name: &str, cfg: &larmor::RenderConfig) -> anyhow::Result<larmor::Scene> {
    let ctx = larmor::SceneContext::from_config(cfg);
    let mut scene =
        larmor::build_scene(name, &ctx).with_context(|| format!("build scene '{name}'"))?;
    if let Some(bg) = cfg.background_color()? {
        scene.background = bg;
    }
    Ok(scene)
}

fn read_scene_json(path: &Path) -> anyhow::Result<larmor::Scene> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scene: larmor::Scene = serde_json::from_reader(r).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

struct Prepared {
    backend: Box<dyn larmor::RenderBackend>,
    assets: larmor::PreparedAssetStore,
}

fn prepare(
    scene: &larmor::Scene,
    cfg: &larmor::RenderConfig,
    common: &CommonArgs,
) -> anyhow::Result<Prepared> {
    scene.validate()?;
    let settings = cfg.render_settings()?;
    let backend = larmor::create_backend(larmor::BackendKind::Cpu, &settings)?;
    let assets =
        larmor::PreparedAssetStore::prepare(scene, cfg.assets_dir.clone(), cfg.font.as_deref())?;
    if common.dump_fonts {
        dump_font_diagnostics(&assets)?;
    }
    Ok(Prepared { backend, assets })
}

fn cmd_list() -> anyhow::Result<()> {
    let width = larmor::scene_names().map(str::len).max().unwrap_or(0);
    let mut out = std::io::stdout().lock();
    for entry in larmor::CATALOG {
        let images = if entry.uses_images { "  [images]" } else { "" };
        writeln!(out, "{:<width$}  {}{images}", entry.name, entry.summary)?;
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let scene = match (&args.scene, &args.in_path) {
        (Some(name), _) => build_scene(name, &cfg)?,
        (None, Some(path)) => read_scene_json(path)?,
        (None, None) => anyhow::bail!("one of --scene or --in is required"),
    };
    if args.frame >= scene.duration.0 {
        anyhow::bail!(
            "frame {} is out of range; '{}' has {} frames",
            args.frame,
            scene.name,
            scene.duration.0
        );
    }

    let mut p = prepare(&scene, &cfg, &args.common)?;
    let frame = larmor::render_frame(
        &scene,
        larmor::FrameIndex(args.frame),
        p.backend.as_mut(),
        &p.assets,
    )?;
    larmor::write_png(&frame, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let scene = build_scene(&args.scene, &cfg)?;
    let out = args.out.unwrap_or_else(|| cfg.video_path(&scene.name));

    let mut p = prepare(&scene, &cfg, &args.common)?;
    let opts = larmor::RenderToMp4Opts {
        threading: cfg.threading(),
        ..larmor::RenderToMp4Opts::for_scene(&scene)?
    };
    let stats =
        larmor::render_to_mp4_with_stats(&scene, &out, opts, p.backend.as_mut(), &p.assets)?;

    eprintln!(
        "wrote {} ({} frames, {} rendered, {} elided)",
        out.display(),
        stats.frames_total,
        stats.frames_rendered,
        stats.frames_elided
    );
    Ok(())
}

fn cmd_last_frame(args: LastFrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let scene = build_scene(&args.scene, &cfg)?;
    let out = args.out.unwrap_or_else(|| cfg.image_path(&scene.name));

    let mut p = prepare(&scene, &cfg, &args.common)?;
    larmor::render_last_frame_png(&scene, &out, p.backend.as_mut(), &p.assets)?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_dump(args: DumpArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let scene = build_scene(&args.scene, &cfg)?;
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &scene).with_context(|| "serialize scene JSON")?;
    writeln!(out)?;
    Ok(())
}

fn dump_font_diagnostics(assets: &larmor::PreparedAssetStore) -> anyhow::Result<()> {
    eprintln!("label font diagnostics:");
    let Some(font) = assets.font() else {
        eprintln!("  (scene has no labels)");
        return Ok(());
    };
    let engine = larmor::TextLayoutEngine::new(font)?;
    eprintln!("  family:      {}", engine.family_name());
    eprintln!("  face_index:  {}", font.index);
    eprintln!("  sha256:      {}", sha256_hex(&font.bytes));
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
