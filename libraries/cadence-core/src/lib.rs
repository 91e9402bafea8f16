//! Cadence Core
//!
//! Platform-agnostic domain types and error handling shared by every Cadence crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `SourceRef`, `Playlist`, `PlaylistRegistry`, `Settings`
//! - **File Acceptance**: which audio files the player takes in
//! - **Error Handling**: the unified `CadenceError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{PlaylistRegistry, SourceRef, Track};
//!
//! let mut registry = PlaylistRegistry::default();
//! let source = SourceRef::in_memory("Intro.mp3", Some("audio/mpeg"), vec![0u8; 16]);
//! registry.active_mut().tracks.push(Track::from_source(source));
//!
//! assert_eq!(registry.active().tracks[0].title, "Intro");
//! assert_eq!(registry.active().tracks[0].artist, "Unknown");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod format;
pub mod types;

// Re-export commonly used types
pub use error::{CadenceError, Result};
pub use format::{is_supported_audio, SUPPORTED_EXTENSIONS, SUPPORTED_MIME_TYPES};
pub use types::{
    PlaybackSnapshot, Playlist, PlaylistRegistry, RepeatMode, Settings, SourceData, SourceRef,
    Theme, Track, TrackId, DEFAULT_PLAYLIST_NAME, UNKNOWN_ARTIST,
};
