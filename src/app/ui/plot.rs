use egui::{Align2, FontId, Sense, Stroke};

use super::color;
use crate::render::column_envelope;

const LEFT_GUTTER: f32 = 44.0;
const BOTTOM_GUTTER: f32 = 22.0;
const EDGE: f32 = 8.0;

impl crate::app::WaveformPlayer {
    pub(in crate::app) fn ui_plot(&mut self, ctx: &egui::Context) {
        let theme = self.state.plot.theme;
        let bg_tex = self.background_texture(ctx);
        let frame = egui::Frame::default().fill(color(theme.background));
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let (resp, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
            let outer = resp.rect;
            if outer.size() != self.plot_size {
                self.plot_size = outer.size();
                self.state.relayout_background();
            }
            let inner = egui::Rect::from_min_max(
                egui::pos2(outer.left() + LEFT_GUTTER, outer.top() + EDGE),
                egui::pos2(outer.right() - EDGE, outer.bottom() - BOTTOM_GUTTER),
            );
            if inner.width() < 2.0 || inner.height() < 2.0 {
                return;
            }
            let area = (inner.left(), inner.top(), inner.width(), inner.height());
            let plot = &self.state.plot;
            let text_col = color(theme.text);
            let grid_col = text_col.gamma_multiply(0.2);
            let clipped = painter.with_clip_rect(inner);

            if let (Some(tex), Some(r)) = (bg_tex, plot.background_rect) {
                let (x0, y0) = plot.to_pixel(r.x0, r.y1, area);
                let (x1, y1) = plot.to_pixel(r.x1, r.y0, area);
                let rect = egui::Rect::from_min_max(egui::pos2(x0, y0), egui::pos2(x1, y1));
                clipped.image(
                    tex,
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE.gamma_multiply(crate::render::raster::BACKGROUND_ALPHA),
                );
            }

            // grid at whole seconds
            let fid = FontId::proportional(11.0);
            let (t0, t1) = plot.x_limits;
            let mut sec = t0.ceil();
            while sec <= t1 {
                let (x, _) = plot.to_pixel(sec, 0.0, area);
                clipped.line_segment(
                    [egui::pos2(x, inner.top()), egui::pos2(x, inner.bottom())],
                    Stroke::new(1.0, grid_col),
                );
                painter.text(
                    egui::pos2(x, inner.bottom() + 3.0),
                    Align2::CENTER_TOP,
                    format!("{sec:.0}"),
                    fid.clone(),
                    text_col,
                );
                sec += 1.0;
            }
            let (v0, v1) = plot.y_limits;
            for v in [v0, 0.0, v1] {
                let (_, y) = plot.to_pixel(t0, v, area);
                if v == 0.0 {
                    clipped.line_segment(
                        [egui::pos2(inner.left(), y), egui::pos2(inner.right(), y)],
                        Stroke::new(1.0, grid_col),
                    );
                }
                painter.text(
                    egui::pos2(inner.left() - 4.0, y),
                    Align2::RIGHT_CENTER,
                    format!("{v:.2}"),
                    fid.clone(),
                    text_col,
                );
            }

            if let Some(track) = self.state.track.as_ref() {
                let columns = inner.width() as usize;
                let envelope =
                    column_envelope(plot, &track.samples, track.sample_rate as f64, columns);
                let wave_stroke = Stroke::new(1.5, color(theme.waveform));
                for (col, slot) in envelope.into_iter().enumerate() {
                    let Some((mn, mx)) = slot else {
                        continue;
                    };
                    let x = inner.left() + col as f32 + 0.5;
                    let (_, y_top) = plot.to_pixel(t0, mx as f64, area);
                    let (_, y_bot) = plot.to_pixel(t0, mn as f64, area);
                    clipped.line_segment(
                        [egui::pos2(x, y_top), egui::pos2(x, y_bot.max(y_top + 1.0))],
                        wave_stroke,
                    );
                }

                let (px, _) = plot.to_pixel(plot.playhead_sec, 0.0, area);
                clipped.extend(egui::Shape::dashed_line(
                    &[egui::pos2(px, inner.top()), egui::pos2(px, inner.bottom())],
                    Stroke::new(2.0, color(theme.playhead)),
                    8.0,
                    5.0,
                ));
            }

            painter.rect_stroke(
                inner,
                0.0,
                Stroke::new(1.0, text_col),
                egui::StrokeKind::Inside,
            );
        });
    }
}
