use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use scrollwave::audio_io::{load_audio, load_audio_with, DecoderKind};
use scrollwave::player::PlayerState;
use scrollwave::ScrollwaveError;

fn make_temp_dir(tag: &str) -> PathBuf {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "scrollwave_{tag}_{}_{}_{}",
        std::process::id(),
        now_ms,
        seq
    ));
    std::fs::create_dir_all(&dir).expect("create temp test dir");
    dir
}

fn synth_stereo(sr: u32, secs: f32) -> Vec<Vec<f32>> {
    let frames = ((sr as f32) * secs).max(1.0) as usize;
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for i in 0..frames {
        let t = (i as f32) / (sr as f32);
        left.push((t * 440.0 * std::f32::consts::TAU).sin() * 0.25);
        right.push((t * 660.0 * std::f32::consts::TAU).sin() * 0.20);
    }
    vec![left, right]
}

fn write_wav_f32(path: &Path, sr: u32, channels: &[Vec<f32>]) {
    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate: sr,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut w = hound::WavWriter::create(path, spec).expect("create wav");
    for i in 0..channels[0].len() {
        for ch in channels {
            w.write_sample(ch[i]).expect("write sample");
        }
    }
    w.finalize().expect("finalize wav");
}

#[test]
fn wav_decodes_to_mono_at_native_rate() {
    let dir = make_temp_dir("wav_mono");
    let path = dir.join("tone.wav");
    let chans = synth_stereo(22_050, 1.5);
    write_wav_f32(&path, 22_050, &chans);

    let audio = load_audio(&path).expect("load wav");
    assert_eq!(audio.decoder, DecoderKind::Symphonia);
    assert_eq!(audio.sample_rate, 22_050);
    assert_eq!(audio.samples.len(), chans[0].len());
    let expect = (chans[0][100] + chans[1][100]) * 0.5;
    assert!((audio.samples[100] - expect).abs() < 1e-6);
    assert!((audio.duration_secs() - 1.5).abs() < 1e-3);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn fallback_runs_when_primary_fails() {
    let audio = load_audio_with(
        Path::new("clip.m4a"),
        |_| anyhow::bail!("unsupported codec"),
        |_| Ok((vec![0.1; 441], 44_100)),
    )
    .expect("fallback");
    assert_eq!(audio.decoder, DecoderKind::Ffmpeg);
    assert_eq!(audio.sample_rate, 44_100);
}

#[test]
fn empty_primary_counts_as_failure() {
    let audio = load_audio_with(
        Path::new("clip.ogg"),
        |_| Ok((Vec::new(), 48_000)),
        |_| Ok((vec![f32::NAN, 0.5, f32::INFINITY], 44_100)),
    )
    .expect("fallback");
    assert_eq!(audio.decoder, DecoderKind::Ffmpeg);
    assert_eq!(audio.samples, vec![0.0, 0.5, 0.0]);
}

#[test]
fn both_decoders_failing_reports_both() {
    let err = load_audio_with(
        Path::new("broken.bin"),
        |_| anyhow::bail!("probe failed"),
        |_| anyhow::bail!("ffmpeg exited 1"),
    )
    .unwrap_err();
    assert!(matches!(err, ScrollwaveError::Decode(_)));
    let msg = err.to_string();
    assert!(msg.contains("probe failed"), "{msg}");
    assert!(msg.contains("ffmpeg exited 1"), "{msg}");
}

#[test]
fn failed_load_sets_status() {
    let dir = make_temp_dir("bad_audio");
    let path = dir.join("not_audio.wav");
    std::fs::write(&path, b"definitely not a wav file").expect("write junk");

    let mut state = PlayerState::new(Default::default());
    assert!(state.load_audio_file(&path).is_err());
    assert_eq!(state.status, format!("Failed to load: {}", path.display()));
    assert!(state.track.is_none());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn loading_resets_plot_to_start() {
    let dir = make_temp_dir("reload");
    let path = dir.join("long.wav");
    write_wav_f32(&path, 8_000, &synth_stereo(8_000, 20.0));

    let mut state = PlayerState::new(Default::default());
    state.load_audio_file(&path).expect("load");
    state.update_plot(15_000);
    assert_eq!(state.plot.x_limits, (10.0, 20.0));

    state.load_audio_file(&path).expect("reload");
    assert_eq!(state.plot.x_limits, (0.0, 10.0));
    assert_eq!(state.status, path.display().to_string());
    let _ = std::fs::remove_dir_all(dir);
}
