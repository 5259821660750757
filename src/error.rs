//! Typed errors for the recording/rendering pipeline. Cancellation is
//! deliberately not a variant here — see `recording::Completion`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("no input source available: {0}")]
    InputSource(String),

    #[error("malformed asciicast at {path}: {reason}")]
    CastFormat { path: PathBuf, reason: String },

    #[error("pty spawn or I/O error: {0}")]
    PtyRuntime(String),

    #[error("replay exceeded its declared duration by more than 1s")]
    ReplayTimeout,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown theme {0:?}")]
    UnknownTheme(String),

    #[error("unknown window chrome {0:?}")]
    UnknownChrome(String),

    #[error("cannot combine a command with an input cast file")]
    CommandAndCastFile,

    #[error("invalid crop specification {0:?}: {1}")]
    InvalidCrop(String, String),

    #[error("opacity must be within 0.0..=1.0, got {0}")]
    InvalidOpacity(f32),

    #[error("terminal geometry must be non-zero, got {0}x{1}")]
    InvalidGeometry(u16, u16),
}

pub type Result<T> = std::result::Result<T, AppError>;
