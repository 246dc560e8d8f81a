use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::Context as _;
use image::RgbaImage;

use crate::error::{Result, ScrollwaveError};
use crate::export::sink::{FrameSink, SinkConfig};

/// Options for [`FfmpegVideoWriter`].
#[derive(Clone, Debug)]
pub struct FfmpegWriterOpts {
    pub out_path: PathBuf,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegWriterOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

/// Streams raw RGBA frames into the system `ffmpeg` and writes an H.264/AAC MP4.
pub struct FfmpegVideoWriter {
    opts: FfmpegWriterOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<u64>,
}

impl FfmpegVideoWriter {
    pub fn new(opts: FfmpegWriterOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }
}

/// Reject configurations ffmpeg would fail on, before spawning it.
pub fn validate_config(cfg: &SinkConfig) -> Result<()> {
    if cfg.fps == 0 {
        return Err(ScrollwaveError::export("fps must be non-zero"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(ScrollwaveError::export("frame width/height must be non-zero"));
    }
    if cfg.width % 2 != 0 || cfg.height % 2 != 0 {
        return Err(ScrollwaveError::export(
            "frame width/height must be even (required for yuv420p mp4 output)",
        ));
    }
    if let Some(audio) = cfg.audio.as_ref() {
        if !audio.is_file() {
            return Err(ScrollwaveError::export(format!(
                "audio source '{}' does not exist",
                audio.display()
            )));
        }
    }
    Ok(())
}

impl FrameSink for FfmpegVideoWriter {
    fn begin(&mut self, cfg: SinkConfig) -> Result<()> {
        validate_config(&cfg)?;
        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ScrollwaveError::export(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(ScrollwaveError::export(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });
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
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
        ]);
        if let Some(audio) = cfg.audio.as_ref() {
            cmd.arg("-i").arg(audio).args([
                "-map",
                "0:v:0",
                "-map",
                "1:a:0",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-c:a",
                "aac",
                "-shortest",
                "-movflags",
                "+faststart",
            ]);
        } else {
            cmd.args([
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ]);
        }
        cmd.arg(&self.opts.out_path);
        tracing::debug!(?cmd, "spawning ffmpeg");

        let mut child = cmd.spawn().map_err(|e| {
            ScrollwaveError::export(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ScrollwaveError::export("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ScrollwaveError::export("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &RgbaImage) -> Result<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ScrollwaveError::export("ffmpeg writer not started"))?;
        if let Some(last) = self.last_idx {
            if idx <= last {
                return Err(ScrollwaveError::export(
                    "ffmpeg writer received out-of-order frame index",
                ));
            }
        }
        self.last_idx = Some(idx);

        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(ScrollwaveError::export(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ScrollwaveError::export("ffmpeg writer is already finalized"));
        };
        use std::io::Write as _;
        stdin.write_all(frame.as_raw()).map_err(|e| {
            ScrollwaveError::export(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ScrollwaveError::export("ffmpeg writer not started"))?;
        let status = child.wait().map_err(|e| {
            ScrollwaveError::export(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ScrollwaveError::export("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ScrollwaveError::export(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ScrollwaveError::export(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegVideoWriter {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(width: u32, height: u32) -> SinkConfig {
        SinkConfig {
            width,
            height,
            fps: 30,
            audio: None,
        }
    }

    #[test]
    fn odd_sizes_are_rejected_before_spawn() {
        let err = validate_config(&cfg(641, 480)).unwrap_err();
        assert!(err.to_string().contains("even"));
    }

    #[test]
    fn zero_fps_is_rejected() {
        let mut c = cfg(640, 480);
        c.fps = 0;
        assert!(validate_config(&c).is_err());
    }

    #[test]
    fn missing_audio_is_rejected() {
        let mut c = cfg(640, 480);
        c.audio = Some(PathBuf::from("/definitely/not/here.wav"));
        assert!(validate_config(&c).is_err());
    }

    #[test]
    fn push_before_begin_fails() {
        let mut w = FfmpegVideoWriter::new(FfmpegWriterOpts::new("out.mp4"));
        let frame = RgbaImage::new(2, 2);
        assert!(w.push_frame(0, &frame).is_err());
    }
}
