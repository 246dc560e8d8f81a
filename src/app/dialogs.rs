use std::path::{Path, PathBuf};

use super::WaveformPlayer;

pub const AUDIO_EXTS: &[&str] = &[
    "wav", "mp3", "flac", "ogg", "m4a", "aac", "mp4", "mov", "mkv", "webm",
];
pub const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg"];

/// Blocking file picker for the track to play. Also used before the window exists.
pub fn pick_audio_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select audio file")
        .add_filter("Audio", AUDIO_EXTS)
        .add_filter("All files", &["*"])
        .pick_file()
}

impl WaveformPlayer {
    pub(super) fn pick_audio_dialog(&mut self) -> Option<PathBuf> {
        pick_audio_file()
    }

    pub(super) fn pick_image_dialog(&mut self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select background image (optional)")
            .add_filter("Images", IMAGE_EXTS)
            .pick_file()
    }

    pub(super) fn pick_export_dialog(&mut self, audio_path: &Path) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new()
            .set_title("Save video")
            .add_filter("MP4", &["mp4"]);
        if let Some(stem) = audio_path.file_stem().and_then(|s| s.to_str()) {
            dialog = dialog.set_file_name(format!("{stem}.mp4"));
        }
        if let Some(dir) = audio_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            dialog = dialog.set_directory(dir);
        }
        dialog.save_file()
    }
}
