use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use image::RgbaImage;

use crate::audio_io::LoadedAudio;
use crate::config::ViewerConfig;
use crate::export::ExportSummary;

/// What `main` resolved before the window opened.
#[derive(Clone, Debug, Default)]
pub struct StartupConfig {
    pub config: ViewerConfig,
    /// Track decoded before the window opened.
    pub audio: Option<LoadedAudio>,
    /// Background picture given on the command line.
    pub image: Option<PathBuf>,
    /// Ask for a background picture once the window is up.
    pub prompt_image: bool,
}

pub struct ExportState {
    pub out_path: PathBuf,
    pub rx: Receiver<crate::Result<ExportSummary>>,
}

/// Uploaded copy of the background picture.
pub struct PlotTexture {
    pub source: Arc<RgbaImage>,
    pub handle: egui::TextureHandle,
}
