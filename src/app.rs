use std::time::Duration;

use egui::{Key, KeyboardShortcut, Modifiers};

use crate::audio::AudioEngine;
use crate::player::PlayerState;

pub mod dialogs;
mod export_ops;
mod loading_ops;
mod theme_ops;
pub mod types;
mod ui;

pub use types::StartupConfig;
use types::{ExportState, PlotTexture};

pub const WINDOW_TITLE: &str = "Centered Scrolling Waveform Player";
pub const WINDOW_SIZE: [f32; 2] = [1400.0, 800.0];

/// Output rate used when no audio device could be opened.
const SILENT_RATE: u32 = 48_000;

pub struct WaveformPlayer {
    pub audio: AudioEngine,
    pub state: PlayerState,
    slider_ms: u64,
    last_pos_ms: Option<u64>,
    pending_image_prompt: bool,
    frames_seen: u64,
    export_state: Option<ExportState>,
    bg_texture: Option<PlotTexture>,
    plot_size: egui::Vec2,
}

impl WaveformPlayer {
    pub fn new(cc: &eframe::CreationContext<'_>, startup: StartupConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        let audio = match AudioEngine::new() {
            Ok(engine) => engine,
            Err(e) => {
                tracing::warn!("audio output unavailable, playing silently: {e}");
                AudioEngine::silent(SILENT_RATE)
            }
        };
        audio.set_volume(startup.config.volume);

        let mut app = Self {
            audio,
            state: PlayerState::new(startup.config),
            slider_ms: 0,
            last_pos_ms: None,
            pending_image_prompt: startup.prompt_image && startup.image.is_none(),
            frames_seen: 0,
            export_state: None,
            bg_texture: None,
            plot_size: egui::Vec2::ZERO,
        };
        if let Some(loaded) = startup.audio {
            app.install_track(loaded.into());
        }
        if let Some(path) = startup.image.as_deref() {
            app.apply_startup_background(path);
        }
        app
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let open = ctx.input_mut(|i| {
            i.consume_shortcut(&KeyboardShortcut::new(Modifiers::COMMAND, Key::O))
        });
        if open {
            self.open_audio_dialog();
        }
        // consumed before widgets run so a focused button does not also get it
        let space = ctx.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Space));
        if space {
            self.toggle_playback();
        }
    }
}

impl eframe::App for WaveformPlayer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.frames_seen = self.frames_seen.saturating_add(1);
        self.handle_shortcuts(ctx);
        self.run_startup_image_prompt();
        self.drain_export_result();
        self.sync_position();

        self.ui_top_bar(ctx);
        self.ui_controls(ctx);
        self.ui_plot(ctx);

        if self.pending_image_prompt {
            ctx.request_repaint();
        } else if self.audio.is_playing() || self.is_exporting() {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}
