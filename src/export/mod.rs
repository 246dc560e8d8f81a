//! MP4 export: replay the plot at a fixed frame rate and hand each frame to a sink.

pub mod ffmpeg;
pub mod sink;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use image::RgbaImage;

use crate::error::{Result, ScrollwaveError};
use crate::render::{rasterize, PlotState};

pub use ffmpeg::{FfmpegVideoWriter, FfmpegWriterOpts};
pub use sink::{FrameSink, InMemorySink, SinkConfig};

/// Everything an export needs, detached from the UI so it can run on a worker thread.
#[derive(Clone, Debug)]
pub struct ExportJob {
    pub out_path: PathBuf,
    /// Source file muxed as the soundtrack.
    pub audio_path: PathBuf,
    pub samples: Arc<Vec<f32>>,
    pub sample_rate: u32,
    /// Starting plot state; carries the window width, margin and theme.
    pub plot: PlotState,
    pub background: Option<Arc<RgbaImage>>,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExportSummary {
    pub out_path: PathBuf,
    pub frames: u64,
    pub duration_secs: f64,
}

impl ExportJob {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            width: self.width,
            height: self.height,
            fps: self.fps,
            audio: Some(self.audio_path.clone()),
        }
    }
}

/// Number of frame times `i / fps` that fall strictly before `duration_secs`.
pub fn frame_count(duration_secs: f64, fps: u32) -> u64 {
    if fps == 0 || !duration_secs.is_finite() || duration_secs <= 0.0 {
        return 0;
    }
    let fps = fps as f64;
    let mut n = (duration_secs * fps).ceil() as u64;
    while n > 0 && (n - 1) as f64 / fps >= duration_secs {
        n -= 1;
    }
    n
}

/// Playback position of frame `idx`, truncated to whole milliseconds like the engine clock.
pub fn frame_position_ms(idx: u64, fps: u32) -> u64 {
    if fps == 0 {
        return 0;
    }
    idx.saturating_mul(1000) / fps as u64
}

/// Render every frame of `job` into `sink`. Returns the number of frames pushed.
pub fn render_frames(job: &ExportJob, sink: &mut dyn FrameSink) -> Result<u64> {
    let total = frame_count(job.duration_secs(), job.fps);
    if total == 0 {
        return Err(ScrollwaveError::export("audio is too short to export any frame"));
    }
    let background_size = job.background.as_ref().map(|img| img.dimensions());
    let mut plot = job.plot.clone();
    let sr = job.sample_rate as f64;

    sink.begin(job.sink_config())?;
    for idx in 0..total {
        let position_ms = frame_position_ms(idx, job.fps);
        plot.update(&job.samples, sr, position_ms as f64, background_size);
        let frame = rasterize(
            &plot,
            &job.samples,
            sr,
            job.background.as_deref(),
            job.width,
            job.height,
        );
        sink.push_frame(idx, &frame)?;
        if idx % (job.fps as u64 * 10) == 0 {
            tracing::debug!(frame = idx, total, "export progress");
        }
    }
    sink.end()?;
    Ok(total)
}

/// Encode `job` to an MP4 through the system `ffmpeg`.
#[tracing::instrument(skip_all, fields(out = %job.out_path.display()))]
pub fn export_video(job: &ExportJob) -> Result<ExportSummary> {
    let started = Instant::now();
    let mut writer = FfmpegVideoWriter::new(FfmpegWriterOpts::new(job.out_path.clone()));
    let frames = render_frames(job, &mut writer)?;
    tracing::info!(
        frames,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "export finished"
    );
    Ok(ExportSummary {
        out_path: job.out_path.clone(),
        frames,
        duration_secs: job.duration_secs(),
    })
}
