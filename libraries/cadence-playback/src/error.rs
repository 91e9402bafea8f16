//! Media failure classification
//!
//! Maps host-reported failures to user-facing messages. Every failure here
//! is recoverable: it stops the current track, never the player.

use cadence_core::CadenceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the host refused to start playback
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlayRejection {
    /// Autoplay policy or missing user gesture
    #[error("Playback was blocked by the browser. Press play to start.")]
    NotAllowed,

    /// Format cannot be decoded by the host
    #[error("Playback could not be started: format not supported.")]
    NotSupported,

    /// Anything else
    #[error("Playback could not be started: {0}")]
    Other(String),
}

impl PlayRejection {
    /// Whether moving to another track may succeed where this one failed
    ///
    /// A blocked autoplay applies to every track, so skipping is pointless.
    pub fn is_track_specific(&self) -> bool {
        !matches!(self, Self::NotAllowed)
    }
}

/// Media element error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MediaErrorCode {
    #[error("Playback was aborted.")]
    Aborted,

    #[error("Playback failed because of a network error.")]
    Network,

    #[error("The file could not be decoded. The format may not be supported.")]
    Decode,

    #[error("This audio format is not supported.")]
    SourceNotSupported,

    #[error("An unknown playback error occurred.")]
    Unknown,
}

impl From<PlayRejection> for CadenceError {
    fn from(rejection: PlayRejection) -> Self {
        CadenceError::playback_rejected(rejection.to_string())
    }
}

impl From<MediaErrorCode> for CadenceError {
    fn from(code: MediaErrorCode) -> Self {
        CadenceError::playback_rejected(code.to_string())
    }
}
