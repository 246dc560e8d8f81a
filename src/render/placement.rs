/// Axis-aligned box in data coordinates (seconds × amplitude).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataRect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl DataRect {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Fit an `image_w`×`image_h` picture inside `bounds` keeping its aspect ratio.
///
/// The axis that does not fill is centered. Ratios are taken in data units, so the
/// returned box has `width / height == image_w / image_h`.
pub fn place_background(image_w: u32, image_h: u32, bounds: DataRect) -> DataRect {
    let axis_w = bounds.width();
    let axis_h = if bounds.height() != 0.0 {
        bounds.height()
    } else {
        1.0
    };
    let img_ratio = if image_h != 0 {
        image_w as f64 / image_h as f64
    } else {
        1.0
    };
    let axis_ratio = axis_w / axis_h;

    let (target_w, target_h) = if img_ratio >= axis_ratio {
        (axis_w, axis_w / img_ratio)
    } else {
        (axis_h * img_ratio, axis_h)
    };

    let x0 = bounds.x0 + (axis_w - target_w) / 2.0;
    let y0 = bounds.y0 + (axis_h - target_h) / 2.0;
    DataRect {
        x0,
        x1: x0 + target_w,
        y0,
        y1: y0 + target_h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_image_fills_width() {
        let bounds = DataRect {
            x0: 0.0,
            x1: 10.0,
            y0: -1.0,
            y1: 1.0,
        };
        // ratio 20 > axis ratio 5
        let r = place_background(2000, 100, bounds);
        assert_eq!((r.x0, r.x1), (0.0, 10.0));
        assert!((r.height() - 0.5).abs() < 1e-12);
        assert!((r.y0 + 0.25).abs() < 1e-12);
    }

    #[test]
    fn tall_image_fills_height() {
        let bounds = DataRect {
            x0: 3.0,
            x1: 13.0,
            y0: -1.0,
            y1: 1.0,
        };
        let r = place_background(100, 100, bounds);
        assert_eq!((r.y0, r.y1), (-1.0, 1.0));
        assert!((r.width() - 2.0).abs() < 1e-12);
        assert!((r.x0 - 7.0).abs() < 1e-12);
    }

    #[test]
    fn zero_height_image_is_square() {
        let bounds = DataRect {
            x0: 0.0,
            x1: 4.0,
            y0: 0.0,
            y1: 2.0,
        };
        let r = place_background(640, 0, bounds);
        assert!((r.width() - r.height()).abs() < 1e-12);
    }
}
