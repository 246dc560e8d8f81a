/// Default width of the visible window in seconds.
pub const WINDOW_SECS: f64 = 10.0;

/// The time span currently shown and the sample range backing it.
///
/// The window is anchored at 0 until the position passes half its width, then it stays
/// centered on the position. `end_sec` may run past the buffer; the index range never does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleWindow {
    pub start_sec: f64,
    pub end_sec: f64,
    /// First sample index, inclusive.
    pub start_idx: usize,
    /// Last sample index, exclusive. Always `>= start_idx` and `<= len`.
    pub end_idx: usize,
}

impl VisibleWindow {
    pub fn compute(position_sec: f64, window_secs: f64, sample_rate: f64, len: usize) -> Self {
        let position_sec = if position_sec.is_finite() {
            position_sec.max(0.0)
        } else {
            0.0
        };
        let window_secs = if window_secs.is_finite() {
            window_secs.max(0.0)
        } else {
            0.0
        };
        let start_sec = (position_sec - window_secs / 2.0).max(0.0);
        let end_sec = start_sec + window_secs;

        let (start_idx, end_idx) = if sample_rate.is_finite() && sample_rate > 0.0 {
            let start_idx = sec_to_index(start_sec, sample_rate).min(len);
            let end_idx = sec_to_index(end_sec, sample_rate).min(len).max(start_idx);
            (start_idx, end_idx)
        } else {
            (0, 0)
        };
        Self {
            start_sec,
            end_sec,
            start_idx,
            end_idx,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.end_idx - self.start_idx
    }

    /// Fewer than two samples: nothing worth drawing.
    pub fn is_degenerate(&self) -> bool {
        self.sample_count() < 2
    }

    pub fn slice<'a>(&self, samples: &'a [f32]) -> &'a [f32] {
        let end = self.end_idx.min(samples.len());
        let start = self.start_idx.min(end);
        &samples[start..end]
    }

    /// Lazy `(time, amplitude)` pairs over the window's sample range.
    pub fn points<'a>(&self, samples: &'a [f32], sample_rate: f64) -> WindowPoints<'a> {
        let slice = self.slice(samples);
        let (t0, t1) = if sample_rate > 0.0 {
            (
                self.start_idx as f64 / sample_rate,
                (self.start_idx + slice.len()) as f64 / sample_rate,
            )
        } else {
            (0.0, 0.0)
        };
        WindowPoints {
            slice,
            t0,
            t1,
            next: 0,
        }
    }
}

fn sec_to_index(sec: f64, sample_rate: f64) -> usize {
    let idx = (sec * sample_rate).floor();
    if idx <= 0.0 {
        0
    } else if idx >= usize::MAX as f64 {
        usize::MAX
    } else {
        idx as usize
    }
}

/// Evenly spaced times from `t0` to `t1` inclusive, one per sample.
#[derive(Clone, Debug)]
pub struct WindowPoints<'a> {
    slice: &'a [f32],
    t0: f64,
    t1: f64,
    next: usize,
}

impl WindowPoints<'_> {
    fn time_at(&self, i: usize) -> f64 {
        let n = self.slice.len();
        if n < 2 {
            return self.t0;
        }
        self.t0 + (self.t1 - self.t0) * (i as f64) / ((n - 1) as f64)
    }
}

impl Iterator for WindowPoints<'_> {
    type Item = (f64, f32);

    fn next(&mut self) -> Option<Self::Item> {
        let v = *self.slice.get(self.next)?;
        let t = self.time_at(self.next);
        self.next += 1;
        Some((t, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.slice.len() - self.next;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for WindowPoints<'_> {}
