use std::{
    ffi::OsStr,
    io::Read as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
    thread::JoinHandle,
};

use crate::{
    foundation::core::Fps,
    foundation::error::{LarmorError, LarmorResult},
    foundation::math::mul_div255_u16,
    render::backend::FrameRGBA,
};

#[derive(Clone, Debug)]
/// Settings for one MP4 encode.
pub struct EncodeConfig {
    /// Frame width in pixels, must be even.
    pub width: u32,
    /// Frame height in pixels, must be even.
    pub height: u32,
    /// Output frame rate, passed to ffmpeg as `num/den`.
    pub fps: Fps,
    /// Destination file.
    pub out_path: PathBuf,
    /// Replace an existing file instead of failing.
    pub overwrite: bool,
}

impl EncodeConfig {
    /// Reject sizes and rates that `libx264` with `yuv420p` cannot take.
    pub fn validate(&self) -> LarmorResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LarmorError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(LarmorError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(LarmorError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }

    fn rate_arg(&self) -> String {
        if self.fps.den == 1 {
            self.fps.num.to_string()
        } else {
            format!("{}/{}", self.fps.num, self.fps.den)
        }
    }
}

/// Whether an `ffmpeg` binary answers `-version`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> LarmorResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Streams flattened RGBA frames into a system `ffmpeg` process.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    bg_rgba: [u8; 4],
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    frames_written: u64,
}

impl FfmpegEncoder {
    /// Spawn ffmpeg for `cfg`; translucent pixels are flattened over `bg_rgba`.
    pub fn new(cfg: EncodeConfig, bg_rgba: [u8; 4]) -> LarmorResult<Self> {
        if !is_ffmpeg_on_path() {
            return Err(LarmorError::evaluation(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }
        Self::with_program(cfg, bg_rgba, "ffmpeg")
    }

    /// Like [`FfmpegEncoder::new`], spawning `program` instead of `ffmpeg` from `PATH`.
    pub(crate) fn with_program(
        cfg: EncodeConfig,
        bg_rgba: [u8; 4],
        program: impl AsRef<OsStr>,
    ) -> LarmorResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(LarmorError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        let mut cmd = Command::new(program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.rate_arg(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            LarmorError::evaluation(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LarmorError::evaluation("failed to open ffmpeg stdin"))?;
        // ffmpeg stalls on a full stderr pipe and stops reading frames.
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| LarmorError::evaluation("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        tracing::info!(
            out = %cfg.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            fps = %cfg.rate_arg(),
            "ffmpeg encode started"
        );

        Ok(Self {
            scratch: vec![0u8; cfg.width as usize * cfg.height as usize * 4],
            cfg,
            bg_rgba,
            child,
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
            frames_written: 0,
        })
    }

    /// Flatten `frame` and write it to ffmpeg.
    pub fn encode_frame(&mut self, frame: &FrameRGBA) -> LarmorResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(LarmorError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(LarmorError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(LarmorError::evaluation(
                "ffmpeg encoder is already finalized",
            ));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            LarmorError::evaluation(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        self.frames_written += 1;
        if self.frames_written.is_multiple_of(120) {
            tracing::debug!(frames = self.frames_written, "encode progress");
        }
        Ok(())
    }

    /// Frames accepted so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Close stdin and wait for ffmpeg; its collected stderr becomes the error on failure.
    pub fn finish(mut self) -> LarmorResult<()> {
        drop(self.stdin.take());

        let status = self.child.wait().map_err(|e| {
            LarmorError::evaluation(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| LarmorError::evaluation("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| LarmorError::evaluation(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(LarmorError::evaluation(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }

        tracing::info!(
            out = %self.cfg.out_path.display(),
            frames = self.frames_written,
            "ffmpeg encode finished"
        );
        Ok(())
    }
}

/// Composite RGBA pixels over an opaque background.
pub(crate) fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> LarmorResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(LarmorError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255 - a;
        for c in 0..3 {
            let fg = if src_is_premul {
                u16::from(s[c])
            } else {
                mul_div255_u16(u16::from(s[c]), a)
            };
            d[c] = (fg + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
