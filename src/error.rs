/// Convenience result type used across scrollwave.
pub type Result<T> = std::result::Result<T, ScrollwaveError>;

/// Error taxonomy surfaced to the status line and the command line.
#[derive(thiserror::Error, Debug)]
pub enum ScrollwaveError {
    /// Neither decoder could read the audio file.
    #[error("decode error: {0}")]
    Decode(String),

    /// The image could not be opened or applied.
    #[error("image error: {0}")]
    Image(String),

    /// Frame rendering or video encoding failed.
    #[error("export error: {0}")]
    Export(String),

    /// The audio output device could not be opened.
    #[error("playback error: {0}")]
    Playback(String),

    /// Invalid viewer configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrollwaveError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
