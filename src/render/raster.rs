//! CPU rendering of one plot frame into an RGBA buffer, used by the video exporter.

use image::{Rgba, RgbaImage};

use crate::render::plot::PlotState;
use crate::theme::Rgb;

/// Opacity of the background picture over the plot background.
pub const BACKGROUND_ALPHA: f32 = 0.6;
pub const GRID_ALPHA: f32 = 0.2;
const PLAYHEAD_WIDTH: u32 = 2;
const DASH_ON: u32 = 8;
const DASH_OFF: u32 = 5;

/// Plot area inside a `width`×`height` frame as `(left, top, width, height)`.
pub fn plot_area(width: u32, height: u32) -> (f32, f32, f32, f32) {
    let w = width as f32;
    let h = height as f32;
    let left = (w * 0.04).round();
    let right = (w * 0.02).round();
    let top = (h * 0.03).round();
    let bottom = (h * 0.08).round();
    (left, top, (w - left - right).max(1.0), (h - top - bottom).max(1.0))
}

/// Min/max of the line series for each of `columns` pixel columns.
///
/// Neighbouring non-empty columns are bridged so the trace stays connected.
pub fn column_envelope(
    plot: &PlotState,
    samples: &[f32],
    sample_rate: f64,
    columns: usize,
) -> Vec<Option<(f32, f32)>> {
    let mut out: Vec<Option<(f32, f32)>> = vec![None; columns];
    let Some(series) = plot.series else {
        return out;
    };
    let (x0, x1) = plot.x_limits;
    let span = x1 - x0;
    if columns == 0 || span <= 0.0 {
        return out;
    }
    for (t, v) in series.points(samples, sample_rate) {
        let fx = (t - x0) / span;
        if !(0.0..1.0).contains(&fx) {
            continue;
        }
        let col = ((fx * columns as f64) as usize).min(columns - 1);
        out[col] = Some(match out[col] {
            Some((mn, mx)) => (mn.min(v), mx.max(v)),
            None => (v, v),
        });
    }
    let raw = out.clone();
    let mut prev: Option<(f32, f32)> = None;
    for (slot, cur) in out.iter_mut().zip(raw) {
        let Some((mut mn, mut mx)) = cur else {
            continue;
        };
        if let Some((pmn, pmx)) = prev {
            if pmx < mn {
                mn = pmx;
            }
            if pmn > mx {
                mx = pmn;
            }
        }
        *slot = Some((mn, mx));
        prev = cur;
    }
    out
}

/// Draw `plot` into a new `width`×`height` frame.
pub fn rasterize(
    plot: &PlotState,
    samples: &[f32],
    sample_rate: f64,
    background: Option<&RgbaImage>,
    width: u32,
    height: u32,
) -> RgbaImage {
    let theme = plot.theme;
    let [r, g, b] = theme.background;
    let mut frame = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));
    if width == 0 || height == 0 {
        return frame;
    }
    let area = plot_area(width, height);

    if let (Some(img), Some(rect)) = (background, plot.background_rect) {
        draw_background(&mut frame, plot, img, rect, area);
    }
    draw_grid(&mut frame, plot, area, theme.text);
    draw_waveform(&mut frame, plot, samples, sample_rate, area, theme.waveform);
    draw_playhead(&mut frame, plot, area, theme.playhead);
    draw_frame_box(&mut frame, area, theme.text);
    frame
}

fn pixel_span(lo: f32, hi: f32, limit: u32) -> std::ops::Range<u32> {
    let lo = lo.max(0.0).floor() as u32;
    let hi = hi.max(0.0).ceil() as u32;
    lo.min(limit)..hi.min(limit)
}

fn blend(px: &mut Rgba<u8>, c: Rgb, alpha: f32) {
    let a = alpha.clamp(0.0, 1.0);
    for i in 0..3 {
        let v = px[i] as f32 * (1.0 - a) + c[i] as f32 * a;
        px[i] = v.round().clamp(0.0, 255.0) as u8;
    }
}

fn draw_background(
    frame: &mut RgbaImage,
    plot: &PlotState,
    img: &RgbaImage,
    rect: crate::render::placement::DataRect,
    area: (f32, f32, f32, f32),
) {
    if img.width() == 0 || img.height() == 0 {
        return;
    }
    let (left, top, w, h) = area;
    let (px0, py0) = plot.to_pixel(rect.x0, rect.y1, area);
    let (px1, py1) = plot.to_pixel(rect.x1, rect.y0, area);
    let xs = pixel_span(px0.max(left), px1.min(left + w), frame.width());
    let ys = pixel_span(py0.max(top), py1.min(top + h), frame.height());
    let bw = (px1 - px0).max(f32::EPSILON);
    let bh = (py1 - py0).max(f32::EPSILON);
    for y in ys {
        let v = ((y as f32 + 0.5 - py0) / bh).clamp(0.0, 1.0);
        let sy = ((v * img.height() as f32) as u32).min(img.height() - 1);
        for x in xs.clone() {
            let u = ((x as f32 + 0.5 - px0) / bw).clamp(0.0, 1.0);
            let sx = ((u * img.width() as f32) as u32).min(img.width() - 1);
            let src = img.get_pixel(sx, sy);
            let alpha = BACKGROUND_ALPHA * (src[3] as f32 / 255.0);
            blend(frame.get_pixel_mut(x, y), [src[0], src[1], src[2]], alpha);
        }
    }
}

fn draw_grid(frame: &mut RgbaImage, plot: &PlotState, area: (f32, f32, f32, f32), color: Rgb) {
    let (left, top, w, h) = area;
    let (x0, x1) = plot.x_limits;
    let ys = pixel_span(top, top + h, frame.height());
    let tick_ys = pixel_span(top + h, top + h + 6.0, frame.height());
    let mut sec = x0.ceil();
    while sec <= x1 {
        let (px, _) = plot.to_pixel(sec, 0.0, area);
        let x = px.round() as i64;
        if x >= left as i64 && x < (left + w) as i64 && x < frame.width() as i64 {
            let x = x as u32;
            for y in ys.clone() {
                blend(frame.get_pixel_mut(x, y), color, GRID_ALPHA);
            }
            for y in tick_ys.clone() {
                blend(frame.get_pixel_mut(x, y), color, 1.0);
            }
        }
        sec += 1.0;
    }
    let (_, zero_y) = plot.to_pixel(x0, 0.0, area);
    let zy = zero_y.round() as i64;
    if zy >= top as i64 && zy < (top + h) as i64 && zy < frame.height() as i64 {
        for x in pixel_span(left, left + w, frame.width()) {
            blend(frame.get_pixel_mut(x, zy as u32), color, GRID_ALPHA);
        }
    }
}

fn draw_waveform(
    frame: &mut RgbaImage,
    plot: &PlotState,
    samples: &[f32],
    sample_rate: f64,
    area: (f32, f32, f32, f32),
    color: Rgb,
) {
    let (left, top, w, h) = area;
    let columns = w.max(0.0) as usize;
    let envelope = column_envelope(plot, samples, sample_rate, columns);
    for (col, slot) in envelope.into_iter().enumerate() {
        let Some((mn, mx)) = slot else {
            continue;
        };
        let x = left as u32 + col as u32;
        if x >= frame.width() {
            break;
        }
        let (_, y_top) = plot.to_pixel(0.0, mx as f64, area);
        let (_, y_bot) = plot.to_pixel(0.0, mn as f64, area);
        let y_top = y_top.max(top);
        let y_bot = y_bot.min(top + h);
        for y in pixel_span(y_top, (y_bot).max(y_top + 1.0), frame.height()) {
            blend(frame.get_pixel_mut(x, y), color, 1.0);
        }
    }
}

fn draw_playhead(frame: &mut RgbaImage, plot: &PlotState, area: (f32, f32, f32, f32), color: Rgb) {
    let (left, top, w, h) = area;
    let (px, _) = plot.to_pixel(plot.playhead_sec, 0.0, area);
    if px < left || px >= left + w {
        return;
    }
    let x0 = px.round() as u32;
    for y in pixel_span(top, top + h, frame.height()) {
        if (y - top as u32) % (DASH_ON + DASH_OFF) >= DASH_ON {
            continue;
        }
        for x in x0..(x0 + PLAYHEAD_WIDTH).min(frame.width()) {
            blend(frame.get_pixel_mut(x, y), color, 1.0);
        }
    }
}

fn draw_frame_box(frame: &mut RgbaImage, area: (f32, f32, f32, f32), color: Rgb) {
    let (left, top, w, h) = area;
    let (fw, fh) = frame.dimensions();
    let l = left as u32;
    let t = top as u32;
    let r = ((left + w) as u32).min(fw.saturating_sub(1));
    let b = ((top + h) as u32).min(fh.saturating_sub(1));
    for x in l..=r {
        blend(frame.get_pixel_mut(x, t), color, 1.0);
        blend(frame.get_pixel_mut(x, b), color, 1.0);
    }
    for y in t..=b {
        blend(frame.get_pixel_mut(l, y), color, 1.0);
        blend(frame.get_pixel_mut(r, y), color, 1.0);
    }
}
