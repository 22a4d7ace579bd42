use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while setting up the greeting.
///
/// None of these halt the experience: callers log them and fall back to a
/// degraded presentation.
#[derive(Debug, Error)]
pub enum GreetingError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("audio track unavailable: {0}")]
    AudioUnavailable(String),
    #[error("playback refused: {0}")]
    PlaybackBlocked(String),
    #[error("asset not found: {}", .0.display())]
    MissingAsset(PathBuf),
}

pub type Result<T> = std::result::Result<T, GreetingError>;
