pub mod app;
pub mod audio;
pub mod audio_io;
pub mod config;
pub mod error;
pub mod export;
pub mod player;
pub mod render;
pub mod theme;
pub mod wave;

pub use app::{StartupConfig, WaveformPlayer};
pub use error::{Result, ScrollwaveError};
