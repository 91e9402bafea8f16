/// Core error types for Cadence
use crate::types::TrackId;
use thiserror::Error;

/// Result type alias using `CadenceError`
pub type Result<T> = std::result::Result<T, CadenceError>;

/// Core error type for Cadence
///
/// None of these are fatal: each one disables a single feature or file
/// while the rest of the player keeps working.
#[derive(Error, Debug)]
pub enum CadenceError {
    /// File rejected at intake
    #[error("Unsupported file format: {file_name}")]
    UnsupportedFormat { file_name: String },

    /// Locator requested for a track whose bytes are not available
    #[error("Source unavailable for track {0}; re-add the file to play it")]
    SourceUnavailable(TrackId),

    /// Host refused to start playback or could not decode the file
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// Persistence layer read/write failed
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Imported playlist document could not be parsed
    #[error("Malformed playlist import: {0}")]
    MalformedImport(String),

    /// Playlist name already taken
    #[error("Playlist already exists: {0}")]
    DuplicateName(String),

    /// Playlist not found
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    /// Attempt to delete the only playlist
    #[error("Cannot delete the last playlist")]
    LastPlaylist,

    /// Track index outside the active playlist
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CadenceError {
    /// Create an unsupported format error
    pub fn unsupported_format(file_name: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            file_name: file_name.into(),
        }
    }

    /// Create a storage failure
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageFailure(msg.into())
    }

    /// Create a playback rejection
    pub fn playback_rejected(msg: impl Into<String>) -> Self {
        Self::PlaybackRejected(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
