impl crate::app::WaveformPlayer {
    pub(in crate::app) fn ui_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Load Audio (Ctrl+O)").clicked() {
                        ui.close();
                        self.open_audio_dialog();
                    }
                    if ui.button("Load Image...").clicked() {
                        ui.close();
                        self.open_image_dialog();
                    }
                    ui.separator();
                    if ui
                        .add_enabled(
                            self.state.track.is_some() && !self.is_exporting(),
                            egui::Button::new("Export Video..."),
                        )
                        .clicked()
                    {
                        ui.close();
                        self.spawn_export_video();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }
}
