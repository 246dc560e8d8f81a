mod controls;
mod plot;
mod topbar;

use egui::Color32;

use crate::theme::Rgb;

pub(super) fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}
