use egui::RichText;

impl crate::app::WaveformPlayer {
    pub(in crate::app) fn ui_controls(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let has_track = self.state.track.is_some();
                let play_text = if self.audio.is_playing() {
                    "Pause (Space)"
                } else {
                    "Play (Space)"
                };
                if ui
                    .add_enabled(has_track, egui::Button::new(play_text))
                    .clicked()
                {
                    self.toggle_playback();
                }

                let duration = self.state.duration_ms();
                ui.spacing_mut().slider_width = (ui.available_width() * 0.45).max(120.0);
                let resp = ui.add_enabled(
                    has_track,
                    egui::Slider::new(&mut self.slider_ms, 0..=duration).show_value(false),
                );
                if resp.changed() {
                    self.seek_to(self.slider_ms);
                }
                ui.label(
                    RichText::new(format!(
                        "{} / {}",
                        format_ms(self.slider_ms),
                        format_ms(duration)
                    ))
                    .monospace(),
                );

                ui.separator();
                if ui
                    .add_enabled(
                        has_track && !self.is_exporting(),
                        egui::Button::new("Export Video"),
                    )
                    .clicked()
                {
                    self.spawn_export_video();
                }
                if ui.button("Load Image (PNG/JPEG)").clicked() {
                    self.open_image_dialog();
                }
                ui.separator();
                if self.is_exporting() {
                    ui.spinner();
                }
                ui.label(&self.state.status);
            });
            ui.add_space(4.0);
        });
    }
}

fn format_ms(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}.{:01}", secs / 60, secs % 60, (ms % 1000) / 100)
}
