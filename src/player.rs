//! The viewer's state: loaded track, plot, background picture and status line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, RgbaImage};

use crate::audio_io::{load_audio, LoadedAudio};
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::export::ExportJob;
use crate::render::PlotState;
use crate::theme::{dominant_color, open_image, Theme};
use crate::wave::rms;

pub const STATUS_IDLE: &str = "Load an audio file";
pub const STATUS_LOADING: &str = "Loading...";
pub const STATUS_EXPORTING: &str = "Exporting video...";

/// Decoded audio shared with the export worker.
#[derive(Clone, Debug)]
pub struct LoadedTrack {
    pub path: PathBuf,
    pub samples: Arc<Vec<f32>>,
    pub sample_rate: u32,
}

impl LoadedTrack {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.samples.len() as u64).saturating_mul(1000) / self.sample_rate as u64
    }
}

impl From<LoadedAudio> for LoadedTrack {
    fn from(a: LoadedAudio) -> Self {
        Self {
            path: a.path,
            samples: Arc::new(a.samples),
            sample_rate: a.sample_rate,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BackgroundImage {
    pub path: PathBuf,
    pub pixels: Arc<RgbaImage>,
}

impl BackgroundImage {
    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

#[derive(Debug)]
pub struct PlayerState {
    pub config: ViewerConfig,
    pub track: Option<LoadedTrack>,
    pub plot: PlotState,
    pub background: Option<BackgroundImage>,
    pub status: String,
}

impl PlayerState {
    pub fn new(config: ViewerConfig) -> Self {
        let plot = PlotState::new(config.window_secs, config.margin);
        Self {
            config,
            track: None,
            plot,
            background: None,
            status: STATUS_IDLE.to_string(),
        }
    }

    /// Decode `path` and make it the current track. The status line follows the outcome.
    pub fn load_audio_file(&mut self, path: &Path) -> Result<()> {
        self.status = STATUS_LOADING.to_string();
        match load_audio(path) {
            Ok(audio) => {
                self.set_track(audio.into());
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "load failed: {e}");
                self.status = format!("Failed to load: {}", path.display());
                Err(e)
            }
        }
    }

    /// Replace the track and render the plot at position 0.
    pub fn set_track(&mut self, track: LoadedTrack) {
        self.status = track.path.display().to_string();
        self.track = Some(track);
        self.update_plot(0);
    }

    pub fn duration_ms(&self) -> u64 {
        self.track.as_ref().map(LoadedTrack::duration_ms).unwrap_or(0)
    }

    fn background_size(&self) -> Option<(u32, u32)> {
        self.background.as_ref().map(BackgroundImage::size)
    }

    /// Recompute the visible window for `position_ms`. Returns `false` when nothing changed.
    pub fn update_plot(&mut self, position_ms: u64) -> bool {
        let bg = self.background_size();
        let Some(track) = self.track.as_ref() else {
            return false;
        };
        self.plot
            .update(&track.samples, track.sample_rate as f64, position_ms as f64, bg)
    }

    /// Re-fit the background into the current bounds.
    pub fn relayout_background(&mut self) {
        let bg = self.background_size();
        self.plot.place_background(bg);
    }

    /// Use `img` as the background picture.
    pub fn apply_background_image(&mut self, path: &Path, img: &DynamicImage) {
        self.background = Some(BackgroundImage {
            path: path.to_path_buf(),
            pixels: Arc::new(img.to_rgba8()),
        });
        self.relayout_background();
    }

    /// Show the picture at `path` behind the waveform. Theme and status line are untouched.
    pub fn set_background_from_path(&mut self, path: &Path) -> Result<()> {
        let img = open_image(path)?;
        self.apply_background_image(path, &img);
        tracing::info!(path = %path.display(), "background image applied");
        Ok(())
    }

    /// Tint the plot after `path`'s dominant color, then show it as the background.
    pub fn apply_theme_from_image(&mut self, path: &Path) -> Result<()> {
        let img = open_image(path)?;
        match dominant_color(&img) {
            Some(dominant) => {
                let loudness = self.track.as_ref().map(|t| rms(&t.samples)).unwrap_or(0.0);
                self.plot.theme = Theme::from_dominant(dominant, loudness);
                tracing::debug!(?dominant, loudness, theme = ?self.plot.theme, "theme applied");
            }
            None => tracing::warn!(path = %path.display(), "empty image, theme unchanged"),
        }
        self.apply_background_image(path, &img);
        Ok(())
    }

    /// Theme and background from `path`, reported on the status line.
    pub fn load_image(&mut self, path: &Path) -> Result<()> {
        match self.apply_theme_from_image(path) {
            Ok(()) => {
                self.status = format!("Image applied: {}", path.display());
                Ok(())
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "image failed: {e}");
                self.status = format!("Failed to apply image: {e}");
                Err(e)
            }
        }
    }

    /// Snapshot for an export to `out_path`; `None` without a loaded track.
    pub fn export_job(&self, out_path: &Path) -> Option<ExportJob> {
        let track = self.track.as_ref()?;
        Some(ExportJob {
            out_path: out_path.to_path_buf(),
            audio_path: track.path.clone(),
            samples: Arc::clone(&track.samples),
            sample_rate: track.sample_rate,
            plot: self.plot.clone(),
            background: self.background.as_ref().map(|b| Arc::clone(&b.pixels)),
            width: self.config.export_width,
            height: self.config.export_height,
            fps: self.config.fps,
        })
    }
}
