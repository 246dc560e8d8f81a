use std::path::Path;
use std::sync::Arc;

use super::types::PlotTexture;
use super::WaveformPlayer;

impl WaveformPlayer {
    pub(super) fn apply_image(&mut self, path: &Path) {
        // status line carries the outcome
        let _ = self.state.load_image(path);
    }

    /// Background only, for the picture chosen at startup. Failures are logged.
    pub(super) fn apply_startup_background(&mut self, path: &Path) {
        if let Err(e) = self.state.set_background_from_path(path) {
            tracing::warn!(path = %path.display(), "Failed to apply background image: {e}");
        }
    }

    pub(super) fn open_image_dialog(&mut self) {
        if let Some(path) = self.pick_image_dialog() {
            self.apply_image(&path);
        }
    }

    /// The optional image prompt, once the window has been painted.
    pub(super) fn run_startup_image_prompt(&mut self) {
        if !self.pending_image_prompt || self.frames_seen < 2 {
            return;
        }
        self.pending_image_prompt = false;
        match self.pick_image_dialog() {
            Some(path) => self.apply_startup_background(&path),
            None => tracing::info!("no background image selected"),
        }
    }

    /// Texture of the current background picture, uploaded on first use.
    pub(super) fn background_texture(&mut self, ctx: &egui::Context) -> Option<egui::TextureId> {
        let Some(bg) = self.state.background.as_ref() else {
            self.bg_texture = None;
            return None;
        };
        let stale = self
            .bg_texture
            .as_ref()
            .map(|t| !Arc::ptr_eq(&t.source, &bg.pixels))
            .unwrap_or(true);
        if stale {
            let (w, h) = bg.size();
            let image = egui::ColorImage::from_rgba_unmultiplied(
                [w as usize, h as usize],
                bg.pixels.as_raw(),
            );
            let handle = ctx.load_texture("plot-background", image, egui::TextureOptions::LINEAR);
            self.bg_texture = Some(PlotTexture {
                source: Arc::clone(&bg.pixels),
                handle,
            });
        }
        self.bg_texture.as_ref().map(|t| t.handle.id())
    }
}
