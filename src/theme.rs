//! Plot colors derived from a picture's dominant color.

use std::collections::HashMap;
use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;

/// 8-bit RGB triple.
pub type Rgb = [u8; 3];

/// Side of the thumbnail the dominant color is counted on.
pub const THUMB_SIDE: u32 = 64;

pub const CYAN: Rgb = [0, 255, 255];
pub const RED: Rgb = [255, 0, 0];
pub const BLACK: Rgb = [0, 0, 0];
pub const WHITE: Rgb = [255, 255, 255];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    /// Plot and figure background.
    pub background: Rgb,
    /// Tick and label color.
    pub text: Rgb,
    pub waveform: Rgb,
    pub playhead: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: BLACK,
            text: WHITE,
            waveform: CYAN,
            playhead: RED,
        }
    }
}

impl Theme {
    /// Waveform tinted by `dominant` and brightened by loudness; background picked for contrast.
    pub fn from_dominant(dominant: Rgb, audio_rms: f64) -> Self {
        let dom = dominant.map(|c| c as f64 / 255.0);
        let bright = 0.6 + (audio_rms * 5.0).min(1.0);
        let waveform = dom.map(|c| ((c * bright).min(1.0) * 255.0).round() as u8);
        let (background, text) = if luminance(dom) < 0.5 {
            (WHITE, BLACK)
        } else {
            (BLACK, WHITE)
        };
        Self {
            background,
            text,
            waveform,
            playhead: RED,
        }
    }
}

/// Rec. 709 relative luminance of a 0..1 RGB color.
pub fn luminance(rgb: [f64; 3]) -> f64 {
    0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2]
}

/// Most frequent color of the image after shrinking it to 64×64.
///
/// Alpha is dropped, not composited. Ties go to the smallest packed RGB value.
pub fn dominant_color(img: &DynamicImage) -> Option<Rgb> {
    if img.width() == 0 || img.height() == 0 {
        return None;
    }
    let small = img
        .resize_exact(THUMB_SIDE, THUMB_SIDE, FilterType::Nearest)
        .to_rgb8();
    let mut counts: HashMap<Rgb, u32> = HashMap::new();
    for px in small.pixels() {
        *counts.entry(px.0).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|(ca, na), (cb, nb)| na.cmp(nb).then_with(|| pack(*cb).cmp(&pack(*ca))))
        .map(|(c, _)| c)
}

fn pack(c: Rgb) -> u32 {
    ((c[0] as u32) << 16) | ((c[1] as u32) << 8) | c[2] as u32
}

pub fn open_image(path: &Path) -> crate::Result<DynamicImage> {
    image::open(path)
        .map_err(|e| crate::ScrollwaveError::image(format!("{}: {e}", path.display())))
}
