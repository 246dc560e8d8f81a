use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use atomic_float::AtomicF32;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::ScrollwaveError;
use crate::wave::resample_linear;

/// State shared between the UI thread and the output callback.
pub struct SharedAudio {
    pub samples: ArcSwapOption<Vec<f32>>, // mono, already at out_sample_rate
    pub vol: AtomicF32,                   // 0.0..1.0 linear gain
    pub playing: AtomicBool,
    pub play_pos: AtomicUsize,
    pub out_sample_rate: u32,
}

/// Plays one mono buffer on the default output device.
pub struct AudioEngine {
    _stream: Option<cpal::Stream>,
    pub shared: Arc<SharedAudio>,
}

impl AudioEngine {
    fn new_shared(out_sample_rate: u32) -> Arc<SharedAudio> {
        Arc::new(SharedAudio {
            samples: ArcSwapOption::from(None),
            vol: AtomicF32::new(1.0),
            playing: AtomicBool::new(false),
            play_pos: AtomicUsize::new(0),
            out_sample_rate,
        })
    }

    pub fn new() -> crate::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| ScrollwaveError::playback("no default output device"))?;
        let cfg = device
            .default_output_config()
            .context("no default output config")?;

        let shared = Self::new_shared(cfg.sample_rate());

        let stream = match cfg.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &cfg.into(), shared.clone())?
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &cfg.into(), shared.clone())?
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &cfg.into(), shared.clone())?
            }
            other => {
                return Err(ScrollwaveError::playback(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        };

        Ok(Self {
            _stream: Some(stream),
            shared,
        })
    }

    /// Engine without an output stream. Position only moves through seeks.
    pub fn silent(out_sample_rate: u32) -> Self {
        Self {
            _stream: None,
            shared: Self::new_shared(out_sample_rate.max(1)),
        }
    }

    fn build_stream<T>(
        device: &cpal::Device,
        cfg: &cpal::StreamConfig,
        shared: Arc<SharedAudio>,
    ) -> crate::Result<cpal::Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = cfg.channels as usize;
        let err_fn = |e| tracing::error!("cpal stream error: {e}");
        let stream = device
            .build_output_stream(
                cfg,
                move |data: &mut [T], _| {
                    let maybe_samples = shared.samples.load();
                    let playing = shared.playing.load(Ordering::Relaxed);
                    let Some(samples) = maybe_samples.as_ref().filter(|_| playing) else {
                        for s in data.iter_mut() {
                            *s = T::from_sample(0.0);
                        }
                        return;
                    };
                    let vol = shared.vol.load(Ordering::Relaxed);
                    let len = samples.len();
                    let mut pos = shared.play_pos.load(Ordering::Relaxed);
                    for frame in data.chunks_mut(channels) {
                        let v = if pos < len {
                            let v = (samples[pos] * vol).clamp(-1.0, 1.0);
                            pos += 1;
                            v
                        } else {
                            shared.playing.store(false, Ordering::Relaxed);
                            0.0
                        };
                        for ch in frame.iter_mut() {
                            *ch = T::from_sample(v);
                        }
                    }
                    shared.play_pos.store(pos.min(len), Ordering::Relaxed);
                },
                err_fn,
                None,
            )
            .context("build output stream")?;
        stream.play().context("start output stream")?;
        Ok(stream)
    }

    /// Replace the buffer, rewind and stop.
    pub fn set_samples(&self, mono: &[f32], in_sample_rate: u32) {
        let resampled = resample_linear(mono, in_sample_rate, self.shared.out_sample_rate);
        self.shared.playing.store(false, Ordering::Relaxed);
        self.shared.samples.store(Some(Arc::new(resampled)));
        self.shared.play_pos.store(0, Ordering::Relaxed);
    }

    pub fn set_volume(&self, v: f32) {
        self.shared.vol.store(v.clamp(0.0, 1.0), Ordering::Relaxed);
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Relaxed)
    }

    pub fn toggle_play(&self) {
        if self.is_playing() {
            self.stop();
        } else {
            self.play();
        }
    }

    pub fn play(&self) {
        let Some(len) = self.buffer_len() else {
            return;
        };
        // on play, if at end, rewind
        if self.shared.play_pos.load(Ordering::Relaxed) >= len {
            self.shared.play_pos.store(0, Ordering::Relaxed);
        }
        self.shared.playing.store(true, Ordering::Relaxed);
    }

    pub fn stop(&self) {
        self.shared.playing.store(false, Ordering::Relaxed);
    }

    pub fn seek_ms(&self, ms: u64) {
        if let Some(len) = self.buffer_len() {
            let pos = (ms as u128 * self.shared.out_sample_rate as u128 / 1000) as usize;
            self.shared.play_pos.store(pos.min(len), Ordering::Relaxed);
        }
    }

    pub fn position_ms(&self) -> u64 {
        let pos = self.shared.play_pos.load(Ordering::Relaxed);
        frames_to_ms(pos, self.shared.out_sample_rate)
    }

    pub fn duration_ms(&self) -> u64 {
        self.buffer_len()
            .map(|len| frames_to_ms(len, self.shared.out_sample_rate))
            .unwrap_or(0)
    }

    fn buffer_len(&self) -> Option<usize> {
        self.shared.samples.load().as_ref().map(|s| s.len())
    }
}

fn frames_to_ms(frames: usize, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    (frames as u128 * 1000 / sample_rate as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_is_clamped_to_duration() {
        let engine = AudioEngine::silent(48_000);
        engine.set_samples(&vec![0.0; 96_000], 48_000);
        assert_eq!(engine.duration_ms(), 2_000);
        engine.seek_ms(1_500);
        assert_eq!(engine.position_ms(), 1_500);
        engine.seek_ms(9_000);
        assert_eq!(engine.position_ms(), 2_000);
    }

    #[test]
    fn play_without_buffer_stays_stopped() {
        let engine = AudioEngine::silent(48_000);
        engine.toggle_play();
        assert!(!engine.is_playing());
    }

    #[test]
    fn play_at_end_rewinds() {
        let engine = AudioEngine::silent(1_000);
        engine.set_samples(&vec![0.0; 1_000], 1_000);
        engine.seek_ms(1_000);
        engine.play();
        assert!(engine.is_playing());
        assert_eq!(engine.position_ms(), 0);
        engine.toggle_play();
        assert!(!engine.is_playing());
    }

    #[test]
    fn buffer_is_resampled_to_output_rate() {
        let engine = AudioEngine::silent(48_000);
        engine.set_samples(&vec![0.0; 24_000], 24_000);
        assert_eq!(engine.duration_ms(), 1_000);
    }
}
