use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::{DynamicImage, Rgb, RgbImage};
use scrollwave::config::ViewerConfig;
use scrollwave::export::{export_video, render_frames, FrameSink, InMemorySink};
use scrollwave::player::{LoadedTrack, PlayerState};
use scrollwave::render::plot_area;
use scrollwave::theme::{dominant_color, Theme, BLACK, RED, WHITE};

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

fn synth_track(sr: u32, secs: f32) -> LoadedTrack {
    let frames = ((sr as f32) * secs).max(1.0) as usize;
    let samples = (0..frames)
        .map(|i| {
            let t = (i as f32) / (sr as f32);
            (t * 5.0 * std::f32::consts::TAU).sin() * 0.6
        })
        .collect();
    LoadedTrack {
        path: PathBuf::from("synth.wav"),
        samples: Arc::new(samples),
        sample_rate: sr,
    }
}

fn write_png(path: &Path, w: u32, h: u32, color: [u8; 3]) {
    let img = RgbImage::from_pixel(w, h, Rgb(color));
    img.save(path).expect("save png");
}

#[test]
fn solid_image_dominant_is_its_color() {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 120, Rgb([12, 34, 200])));
    assert_eq!(dominant_color(&img), Some([12, 34, 200]));
}

#[test]
fn majority_color_wins() {
    let mut img = RgbImage::from_pixel(128, 128, Rgb([250, 250, 250]));
    for y in 0..40 {
        for x in 0..128 {
            img.put_pixel(x, y, Rgb([0, 0, 90]));
        }
    }
    assert_eq!(dominant_color(&DynamicImage::ImageRgb8(img)), Some([250, 250, 250]));
}

#[test]
fn dark_dominant_gets_light_background() {
    let theme = Theme::from_dominant([20, 20, 60], 0.0);
    assert_eq!(theme.background, WHITE);
    assert_eq!(theme.text, BLACK);
    assert_eq!(theme.playhead, RED);

    let theme = Theme::from_dominant([240, 240, 200], 0.0);
    assert_eq!(theme.background, BLACK);
    assert_eq!(theme.text, WHITE);
}

#[test]
fn loud_audio_brightens_waveform() {
    let quiet = Theme::from_dominant([100, 50, 20], 0.0);
    let loud = Theme::from_dominant([100, 50, 20], 0.5);
    assert_eq!(quiet.waveform, [60, 30, 12]);
    assert!(loud.waveform[0] > quiet.waveform[0]);
    assert_eq!(loud.waveform, [160, 80, 32]);
}

#[test]
fn applied_image_sets_status_theme_and_placement() {
    let dir = make_temp_dir("apply_image");
    let path = dir.join("bg.png");
    write_png(&path, 160, 90, [30, 30, 40]);

    let mut state = PlayerState::new(ViewerConfig::default());
    state.set_track(synth_track(1_000, 12.0));
    state.load_image(&path).expect("apply image");
    assert_eq!(state.status, format!("Image applied: {}", path.display()));
    assert_eq!(state.plot.theme.background, WHITE);
    let rect = state.plot.background_rect.expect("placed");
    assert!((rect.width() / rect.height() - 160.0 / 90.0).abs() < 1e-9);
    assert_eq!(state.background.as_ref().map(|b| b.size()), Some((160, 90)));

    state.update_plot(9_000);
    let moved = state.plot.background_rect.expect("still placed");
    assert!(moved.x0 >= 4.0 - 1e-9);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn startup_background_keeps_default_theme() {
    let dir = make_temp_dir("startup_bg");
    let path = dir.join("dark.png");
    write_png(&path, 120, 80, [10, 10, 30]);

    let mut state = PlayerState::new(ViewerConfig::default());
    state.set_track(synth_track(1_000, 12.0));
    let status = state.status.clone();
    state.set_background_from_path(&path).expect("background");
    assert_eq!(state.plot.theme, Theme::default());
    assert_eq!(state.status, status);
    let rect = state.plot.background_rect.expect("placed");
    assert!((rect.width() / rect.height() - 1.5).abs() < 1e-9);

    let missing = dir.join("missing.png");
    assert!(state.set_background_from_path(&missing).is_err());
    assert_eq!(state.plot.theme, Theme::default());
    assert_eq!(state.status, status);
    assert!(state.plot.background_rect.is_some());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn export_renders_one_frame_per_tick() {
    let mut cfg = ViewerConfig::default();
    cfg.export_width = 96;
    cfg.export_height = 64;
    let mut state = PlayerState::new(cfg);
    state.set_track(synth_track(1_000, 1.0));
    let job = state.export_job(Path::new("out.mp4")).expect("job");

    let mut sink = InMemorySink::new();
    let frames = render_frames(&job, &mut sink).expect("render");
    assert_eq!(frames, 30);
    assert!(sink.is_finished());
    let cfg = sink.config().expect("begun");
    assert_eq!((cfg.width, cfg.height, cfg.fps), (96, 64, 30));
    assert_eq!(cfg.audio.as_deref(), Some(Path::new("synth.wav")));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| *i).collect();
    assert_eq!(idx, (0..30).collect::<Vec<u64>>());
    assert!(sink
        .frames()
        .iter()
        .all(|(_, f)| f.dimensions() == (96, 64)));
    assert_ne!(sink.frames()[0].1, sink.frames()[15].1);
}

#[test]
fn export_frame_shows_playhead() {
    let mut cfg = ViewerConfig::default();
    cfg.export_width = 400;
    cfg.export_height = 200;
    let mut state = PlayerState::new(cfg);
    state.set_track(synth_track(1_000, 2.0));
    let job = state.export_job(Path::new("out.mp4")).expect("job");

    let mut sink = InMemorySink::new();
    render_frames(&job, &mut sink).expect("render");
    // frame 30 is t = 1 s in a [0, 10) window
    let (_, frame) = &sink.frames()[30];
    let (left, top, w, _) = plot_area(400, 200);
    let x = (left + w * 0.1).round() as u32;
    assert_eq!(frame.get_pixel(x, top as u32 + 1).0, [255, 0, 0, 255]);
}

#[test]
fn empty_track_cannot_export() {
    let mut state = PlayerState::new(ViewerConfig::default());
    state.set_track(LoadedTrack {
        path: PathBuf::from("empty.wav"),
        samples: Arc::new(Vec::new()),
        sample_rate: 44_100,
    });
    let job = state.export_job(Path::new("out.mp4")).expect("job");
    let mut sink = InMemorySink::new();
    assert!(render_frames(&job, &mut sink).is_err());
    assert!(sink.config().is_none());
}

#[test]
fn odd_export_size_fails_before_encoding() {
    let dir = make_temp_dir("odd_export");
    let audio = dir.join("a.wav");
    std::fs::write(&audio, b"placeholder").expect("write");
    let mut state = PlayerState::new(ViewerConfig::default());
    let mut track = synth_track(1_000, 1.0);
    track.path = audio;
    state.set_track(track);
    let mut job = state.export_job(&dir.join("out.mp4")).expect("job");
    job.width = 641;

    let err = export_video(&job).unwrap_err();
    assert!(err.to_string().contains("even"), "{err}");
    assert!(!dir.join("out.mp4").exists());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn in_memory_sink_resets_on_begin() {
    let mut sink = InMemorySink::new();
    let cfg = scrollwave::export::SinkConfig {
        width: 2,
        height: 2,
        fps: 30,
        audio: None,
    };
    sink.begin(cfg.clone()).unwrap();
    sink.push_frame(0, &image::RgbaImage::new(2, 2)).unwrap();
    sink.end().unwrap();
    sink.begin(cfg).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_finished());
}
