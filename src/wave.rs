/// Linear-interpolation resampler used to match the output device rate.
pub fn resample_linear(mono: &[f32], in_sr: u32, out_sr: u32) -> Vec<f32> {
    if in_sr == out_sr || mono.is_empty() {
        return mono.to_vec();
    }
    if in_sr == 0 || out_sr == 0 {
        return mono.to_vec();
    }
    let ratio = out_sr as f64 / in_sr as f64;
    let out_len = ((mono.len() as f64) * ratio).ceil() as usize;
    if out_len == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(out_len);
    let len = mono.len();
    for i in 0..out_len {
        let src_pos = (i as f64) / ratio;
        let i0 = src_pos.floor() as usize;
        if i0 >= len {
            out.push(mono[len - 1]);
            continue;
        }
        let i1 = (i0 + 1).min(len.saturating_sub(1));
        let t = (src_pos - i0 as f64).clamp(0.0, 1.0) as f32;
        out.push(mono[i0] * (1.0 - t) + mono[i1] * t);
    }
    out
}

/// Peak absolute amplitude, ignoring non-finite samples.
pub fn peak_abs(samples: &[f32]) -> f32 {
    samples
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0f32, |acc, v| acc.max(v.abs()))
}

/// Root mean square accumulated in f64.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&v| (v as f64) * (v as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Replace NaN/inf with silence; returns how many samples were touched.
pub fn sanitize_non_finite(samples: &mut [f32]) -> usize {
    let mut replaced = 0usize;
    for v in samples.iter_mut() {
        if !v.is_finite() {
            *v = 0.0;
            replaced += 1;
        }
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_doubles_length_when_rate_doubles() {
        let src = vec![0.0, 1.0, 0.0, -1.0];
        let out = resample_linear(&src, 24_000, 48_000);
        assert_eq!(out.len(), 8);
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert_eq!(out[2], 1.0);
    }

    #[test]
    fn resample_same_rate_is_identity() {
        let src = vec![0.25f32; 10];
        assert_eq!(resample_linear(&src, 44_100, 44_100), src);
    }

    #[test]
    fn peak_ignores_sign_and_nan() {
        assert_eq!(peak_abs(&[0.1, -0.7, f32::NAN, 0.3]), 0.7);
        assert_eq!(peak_abs(&[]), 0.0);
    }

    #[test]
    fn rms_of_constant_signal() {
        assert!((rms(&[0.5; 64]) - 0.5).abs() < 1e-12);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn sanitize_counts_replacements() {
        let mut v = vec![0.1, f32::INFINITY, f32::NAN, -0.2];
        assert_eq!(sanitize_non_finite(&mut v), 2);
        assert_eq!(v, vec![0.1, 0.0, 0.0, -0.2]);
    }
}
