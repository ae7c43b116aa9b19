//! Error types for configuration, landmark input and tracking sources.
//!
//! None of these reach the engine's per-frame path: sensor trouble degrades
//! to an absent hand, and a bad config is rejected before the engine starts.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path:   PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("hand frame needs 21 landmarks, got {0}")]
    WrongLandmarkCount(usize),
}

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("tracking device unavailable: {0}")]
    Unavailable(String),

    #[error("camera or sensor permission denied")]
    PermissionDenied,

    #[error("tracking source disconnected")]
    Disconnected,
}

/// Why a pick was refused. The engine never lets these happen in normal
/// flow; they are how the session enforces its bounds.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("spread already holds all {0} cards")]
    Full(usize),

    #[error("card {0} is already selected")]
    Duplicate(usize),

    #[error("card index {0} is outside the deck")]
    OutOfRange(usize),
}
