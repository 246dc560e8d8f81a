use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crate::error::ScrollwaveError;
use crate::wave::sanitize_non_finite;

/// Rate requested from ffmpeg when it decodes on our behalf.
pub const FFMPEG_DECODE_RATE: u32 = 44_100;

/// Which decoder produced a [`LoadedAudio`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderKind {
    Symphonia,
    Ffmpeg,
}

/// Mono samples of one audio file at its decoded rate.
#[derive(Clone, Debug)]
pub struct LoadedAudio {
    pub path: PathBuf,
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub decoder: DecoderKind,
}

impl LoadedAudio {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

fn open_decoder(
    path: &Path,
) -> Result<(
    Box<dyn symphonia::core::formats::FormatReader>,
    Box<dyn symphonia::core::codecs::Decoder>,
    u32,
    u32,
)> {
    let ext_hint = path.extension().and_then(|s| s.to_str());
    let probe_once = |hint_ext: Option<&str>| -> Result<_> {
        let file = File::open(path).with_context(|| format!("open audio: {}", path.display()))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if let Some(ext) = hint_ext {
            hint.with_extension(ext);
        }
        get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(Into::into)
    };
    let probed = match probe_once(ext_hint) {
        Ok(v) => v,
        Err(first_err) => {
            if ext_hint.is_some() {
                probe_once(None).with_context(|| {
                    format!("probe failed with and without hint: {}", path.display())
                })?
            } else {
                return Err(first_err);
            }
        }
    };
    let format = probed.format;
    let track = format.default_track().context("no default track")?.clone();
    let decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;
    let sample_rate_hint = track.codec_params.sample_rate.unwrap_or(0);
    Ok((format, decoder, track.id, sample_rate_hint))
}

/// Decode with symphonia, averaging all channels to mono.
pub fn decode_audio_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let (mut format, mut decoder, track_id, mut sample_rate) = open_decoder(path)?;
    let mut mono: Vec<f32> = Vec::new();
    let mut decode_errors = 0u32;
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::DecodeError(_)) => {
                decode_errors = decode_errors.saturating_add(1);
                continue;
            }
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(err.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(_)) => {
                decode_errors = decode_errors.saturating_add(1);
                continue;
            }
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(err.into()),
        };
        if sample_rate == 0 {
            sample_rate = decoded.spec().rate;
        }
        let channels = decoded.spec().channels.count().max(1);
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buf.copy_interleaved_ref(decoded);
        for frame in buf.samples().chunks(channels) {
            let acc: f32 = frame.iter().sum();
            mono.push(acc / channels as f32);
        }
    }
    if sample_rate == 0 {
        anyhow::bail!("unknown sample rate: {}", path.display());
    }
    if decode_errors > 0 {
        tracing::debug!(path = %path.display(), decode_errors, "skipped undecodable packets");
    }
    Ok((mono, sample_rate))
}

/// Decode through the system `ffmpeg`, resampled to [`FFMPEG_DECODE_RATE`].
pub fn decode_audio_ffmpeg(path: &Path) -> Result<(Vec<f32>, u32)> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "1",
            "-ar",
            &FFMPEG_DECODE_RATE.to_string(),
            "pipe:1",
        ])
        .output()
        .context("failed to run ffmpeg for audio decode")?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        anyhow::bail!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        );
    }
    if out.stdout.len() % 4 != 0 {
        anyhow::bail!("decoded audio byte length is not aligned to f32 samples");
    }
    let mono = out
        .stdout
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok((mono, FFMPEG_DECODE_RATE))
}

/// Decode `path` with symphonia, falling back once to ffmpeg.
pub fn load_audio(path: &Path) -> crate::Result<LoadedAudio> {
    load_audio_with(path, decode_audio_mono, decode_audio_ffmpeg)
}

/// Fallback policy behind [`load_audio`], with the decoders injected.
pub fn load_audio_with<P, F>(path: &Path, primary: P, fallback: F) -> crate::Result<LoadedAudio>
where
    P: FnOnce(&Path) -> Result<(Vec<f32>, u32)>,
    F: FnOnce(&Path) -> Result<(Vec<f32>, u32)>,
{
    let primary_err = match primary(path).and_then(|d| non_empty(path, d)) {
        Ok((samples, sample_rate)) => {
            return Ok(finish(path, samples, sample_rate, DecoderKind::Symphonia));
        }
        Err(err) => err,
    };
    tracing::debug!(path = %path.display(), error = %primary_err, "primary decoder failed, trying ffmpeg");
    match fallback(path).and_then(|d| non_empty(path, d)) {
        Ok((samples, sample_rate)) => Ok(finish(path, samples, sample_rate, DecoderKind::Ffmpeg)),
        Err(fallback_err) => Err(ScrollwaveError::decode(format!(
            "{}: {primary_err:#}; fallback: {fallback_err:#}",
            path.display()
        ))),
    }
}

fn non_empty(path: &Path, decoded: (Vec<f32>, u32)) -> Result<(Vec<f32>, u32)> {
    if decoded.0.is_empty() {
        anyhow::bail!("no samples decoded: {}", path.display());
    }
    if decoded.1 == 0 {
        anyhow::bail!("zero sample rate: {}", path.display());
    }
    Ok(decoded)
}

fn finish(path: &Path, mut samples: Vec<f32>, sample_rate: u32, decoder: DecoderKind) -> LoadedAudio {
    let replaced = sanitize_non_finite(&mut samples);
    if replaced > 0 {
        tracing::warn!(path = %path.display(), replaced, "replaced non-finite samples");
    }
    tracing::info!(
        path = %path.display(),
        ?decoder,
        sample_rate,
        frames = samples.len(),
        "audio loaded"
    );
    LoadedAudio {
        path: path.to_path_buf(),
        samples,
        sample_rate,
        decoder,
    }
}
