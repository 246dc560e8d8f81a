use crate::render::placement::{place_background, DataRect};
use crate::render::window::{VisibleWindow, WINDOW_SECS};
use crate::theme::Theme;
use crate::wave::peak_abs;

/// Relative headroom above the visible peak.
pub const Y_MARGIN: f64 = 0.1;

/// Everything the waveform plot shows, in data coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotState {
    pub window_secs: f64,
    pub margin: f64,
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
    /// Sample range of the current line series; `None` until the first update.
    pub series: Option<VisibleWindow>,
    pub playhead_sec: f64,
    /// Where the background image is drawn, if one is set.
    pub background_rect: Option<DataRect>,
    pub theme: Theme,
}

impl Default for PlotState {
    fn default() -> Self {
        Self::new(WINDOW_SECS, Y_MARGIN)
    }
}

impl PlotState {
    pub fn new(window_secs: f64, margin: f64) -> Self {
        Self {
            window_secs,
            margin,
            x_limits: (0.0, window_secs),
            y_limits: (-(1.0 + margin), 1.0 + margin),
            series: None,
            playhead_sec: 0.0,
            background_rect: None,
            theme: Theme::default(),
        }
    }

    pub fn bounds(&self) -> DataRect {
        DataRect {
            x0: self.x_limits.0,
            x1: self.x_limits.1,
            y0: self.y_limits.0,
            y1: self.y_limits.1,
        }
    }

    /// Recompute the plot for a playback position.
    ///
    /// `background` carries the pixel size of the background image, if any. Returns `false`
    /// and leaves the plot untouched when fewer than two samples fall in the window.
    pub fn update(
        &mut self,
        samples: &[f32],
        sample_rate: f64,
        position_ms: f64,
        background: Option<(u32, u32)>,
    ) -> bool {
        let current_sec = position_ms / 1000.0;
        let window =
            VisibleWindow::compute(current_sec, self.window_secs, sample_rate, samples.len());
        if window.is_degenerate() {
            return false;
        }

        self.series = Some(window);
        self.x_limits = (window.start_sec, window.end_sec);
        self.playhead_sec = current_sec.max(0.0);

        let peak = peak_abs(window.slice(samples)) as f64;
        if peak > 0.0 {
            let lim = peak * (1.0 + self.margin);
            self.y_limits = (-lim, lim);
        }

        self.place_background(background);
        true
    }

    /// Re-fit the background inside the current bounds, or drop it.
    pub fn place_background(&mut self, background: Option<(u32, u32)>) {
        self.background_rect = background.map(|(w, h)| place_background(w, h, self.bounds()));
    }

    /// Map a data-space point into a pixel rectangle `(left, top, width, height)`.
    pub fn to_pixel(&self, t: f64, v: f64, area: (f32, f32, f32, f32)) -> (f32, f32) {
        let (left, top, w, h) = area;
        let b = self.bounds();
        let fx = if b.width() != 0.0 {
            (t - b.x0) / b.width()
        } else {
            0.0
        };
        let fy = if b.height() != 0.0 {
            (b.y1 - v) / b.height()
        } else {
            0.5
        };
        (left + (fx as f32) * w, top + (fy as f32) * h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_limits_match_default_view() {
        let p = PlotState::default();
        assert_eq!(p.x_limits, (0.0, 10.0));
        assert!((p.y_limits.1 - 1.1).abs() < 1e-12);
        assert!(p.series.is_none());
    }

    #[test]
    fn degenerate_window_leaves_state() {
        let mut p = PlotState::default();
        let before = p.clone();
        assert!(!p.update(&[0.5], 1.0, 0.0, None));
        assert_eq!(p, before);
    }

    #[test]
    fn pixel_mapping_flips_y() {
        let p = PlotState::default();
        let (x, y) = p.to_pixel(5.0, 1.1, (0.0, 0.0, 100.0, 50.0));
        assert!((x - 50.0).abs() < 1e-4);
        assert!(y.abs() < 1e-4);
    }
}
