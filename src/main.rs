#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use scrollwave::app::{self, dialogs, StartupConfig};
use scrollwave::audio_io::{load_audio, LoadedAudio};
use scrollwave::config::{Cli, ViewerConfig};
use scrollwave::export::export_video;
use scrollwave::player::PlayerState;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn resolve_config(cli: &Cli) -> scrollwave::Result<ViewerConfig> {
    let base = match cli.config.as_deref() {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    base.with_cli_overrides(cli)
}

fn run_headless_export(
    config: ViewerConfig,
    audio: LoadedAudio,
    image: Option<&Path>,
    out: &Path,
) -> ExitCode {
    let mut state = PlayerState::new(config);
    state.set_track(audio.into());
    if let Some(image) = image {
        if let Err(e) = state.set_background_from_path(image) {
            tracing::warn!(path = %image.display(), "Failed to apply background image: {e}");
        }
    }
    let Some(job) = state.export_job(out) else {
        return ExitCode::FAILURE;
    };
    println!("Exporting video...");
    match export_video(&job) {
        Ok(summary) => {
            println!("Exported: {}", summary.out_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Export failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let config = match resolve_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let audio_path = match cli.audio.clone().or_else(dialogs::pick_audio_file) {
        Some(p) => p,
        None => {
            tracing::info!("no audio file selected");
            return ExitCode::SUCCESS;
        }
    };
    let audio = match load_audio(&audio_path) {
        Ok(a) => a,
        Err(e) => {
            tracing::debug!("{e}");
            eprintln!("Failed to load audio: {}", audio_path.display());
            return ExitCode::FAILURE;
        }
    };

    if let Some(out) = cli.export.as_deref() {
        return run_headless_export(config, audio, cli.image.as_deref(), out);
    }

    let startup = StartupConfig {
        config,
        audio: Some(audio),
        image: cli.image.clone(),
        prompt_image: true,
    };
    let viewport = egui::ViewportBuilder::default()
        .with_title(app::WINDOW_TITLE)
        .with_inner_size(app::WINDOW_SIZE)
        .with_min_inner_size([640.0, 400.0]);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let result = eframe::run_native(
        app::WINDOW_TITLE,
        native_options,
        Box::new(move |cc| Ok(Box::new(app::WaveformPlayer::new(cc, startup)))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("window failed: {e}");
            ExitCode::FAILURE
        }
    }
}
