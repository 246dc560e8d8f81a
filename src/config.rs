use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use crate::error::{Result, ScrollwaveError};

/// Command line of the `scrollwave` binary.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "scrollwave", version, about = "Centered scrolling waveform player")]
pub struct Cli {
    /// Audio file to open. A file dialog is shown when omitted.
    pub audio: Option<PathBuf>,

    /// Background image (PNG/JPEG). Skips the startup image prompt.
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Render the visualization to this MP4 file and exit without a window.
    #[arg(long, value_name = "OUT.mp4")]
    pub export: Option<PathBuf>,

    /// Export frame width in pixels (must be even).
    #[arg(long)]
    pub width: Option<u32>,

    /// Export frame height in pixels (must be even).
    #[arg(long)]
    pub height: Option<u32>,

    /// Viewer settings in TOML.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Tunables of the viewer. Read-only: never written back to disk.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Width of the visible window in seconds.
    pub window_secs: f64,
    /// Relative headroom above the visible peak.
    pub margin: f64,
    pub fps: u32,
    pub export_width: u32,
    pub export_height: u32,
    /// Initial output volume, 0.0..=1.0.
    pub volume: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_secs: 10.0,
            margin: 0.1,
            fps: 30,
            export_width: 1400,
            export_height: 800,
            volume: 0.8,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        let cfg: ViewerConfig = toml::from_str(&text)
            .map_err(|e| ScrollwaveError::config(format!("{}: {e}", path.display())))?;
        cfg.validated()
    }

    pub fn validated(self) -> Result<Self> {
        if !self.window_secs.is_finite() || self.window_secs <= 0.0 {
            return Err(ScrollwaveError::config("window_secs must be > 0"));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(ScrollwaveError::config("margin must be >= 0"));
        }
        if self.fps == 0 {
            return Err(ScrollwaveError::config("fps must be non-zero"));
        }
        if self.export_width == 0 || self.export_height == 0 {
            return Err(ScrollwaveError::config("export size must be non-zero"));
        }
        if self.export_width % 2 != 0 || self.export_height % 2 != 0 {
            return Err(ScrollwaveError::config(
                "export size must be even (required for yuv420p mp4 output)",
            ));
        }
        if !self.volume.is_finite() {
            return Err(ScrollwaveError::config("volume must be finite"));
        }
        Ok(Self {
            volume: self.volume.clamp(0.0, 1.0),
            ..self
        })
    }

    /// Command-line size overrides win over the file.
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Result<Self> {
        if let Some(w) = cli.width {
            self.export_width = w;
        }
        if let Some(h) = cli.height {
            self.export_height = h;
        }
        self.validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: ViewerConfig = toml::from_str("window_secs = 6.0\n").unwrap();
        assert_eq!(cfg.window_secs, 6.0);
        assert_eq!(cfg.fps, 30);
        assert_eq!(cfg.margin, 0.1);
    }

    #[test]
    fn odd_export_size_is_rejected() {
        let cfg = ViewerConfig {
            export_width: 641,
            ..ViewerConfig::default()
        };
        assert!(matches!(cfg.validated(), Err(ScrollwaveError::Config(_))));
    }

    #[test]
    fn cli_overrides_export_size() {
        let cli = Cli::parse_from(["scrollwave", "song.wav", "--width", "640", "--height", "360"]);
        let cfg = ViewerConfig::default().with_cli_overrides(&cli).unwrap();
        assert_eq!((cfg.export_width, cfg.export_height), (640, 360));
        assert_eq!(cli.audio.as_deref(), Some(Path::new("song.wav")));
    }

    #[test]
    fn load_reads_toml_file() {
        let path = std::env::temp_dir()
            .join(format!("scrollwave_cfg_{}.toml", std::process::id()));
        std::fs::write(&path, "fps = 24\nexport_width = 640\nexport_height = 360\n").unwrap();
        let cfg = ViewerConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!((cfg.fps, cfg.export_width, cfg.export_height), (24, 640, 360));
        assert_eq!(cfg.window_secs, 10.0);
    }

    #[test]
    fn volume_is_clamped() {
        let cfg = ViewerConfig {
            volume: 3.0,
            ..ViewerConfig::default()
        }
        .validated()
        .unwrap();
        assert_eq!(cfg.volume, 1.0);
    }
}
