//! Playback Events
//!
//! Change notifications for the rendering collaborator and for persistence.
//! Events are buffered inside the controller and drained by the host after
//! each command or media event.

use cadence_core::{RepeatMode, TrackId};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playing/paused flag changed
    StateChanged { is_playing: bool },

    /// A different track was loaded (or none)
    TrackChanged {
        index: Option<usize>,
        track_id: Option<TrackId>,
    },

    /// Track finished playing naturally (reached end)
    TrackFinished { track_id: TrackId },

    /// Tracks of the active playlist were added or removed
    PlaylistChanged { name: String, length: usize },

    /// Another playlist became active
    ActivePlaylistChanged { name: String, length: usize },

    /// Playlists were created, renamed, deleted or imported
    PlaylistsChanged { names: Vec<String> },

    /// Position update (high frequency)
    PositionChanged { position_ms: u64, duration_ms: u64 },

    /// A track's probed duration is known
    DurationChanged { track_id: TrackId, duration_secs: f64 },

    /// Volume or mute changed
    VolumeChanged { volume: f32, muted: bool },

    /// Shuffle, repeat or autoplay changed
    ModesChanged {
        shuffle: bool,
        repeat: RepeatMode,
        autoplay_next: bool,
    },

    /// An unplayable track will be skipped after `delay_ms`
    ///
    /// The host answers with `MediaEvent::SkipTimerElapsed` once the delay
    /// has passed.
    SkipScheduled { ticket: crate::LoadTicket, delay_ms: u64 },

    /// User-visible error
    Error { kind: ErrorKind, message: String },

    /// Last track finished with repeat off
    PlaybackEnded,
}

impl PlaybackEvent {
    /// Whether the change should be persisted right away
    ///
    /// Position updates are high frequency and go through a throttle.
    pub fn is_meaningful(&self) -> bool {
        !matches!(self, Self::PositionChanged { .. })
    }
}

/// Classification of user-visible errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    UnsupportedFormat,
    SourceUnavailable,
    PlaybackRejected,
    LoadFailed,
}
