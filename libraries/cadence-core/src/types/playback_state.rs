/// Playback state snapshot for persistence
use serde::{Deserialize, Serialize};

/// Restorable playback position
///
/// Restoring a snapshot selects the track and seeks to the position but
/// never starts playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackSnapshot {
    /// Name of the active playlist
    pub active_playlist: String,

    /// Selected track (`None` when nothing is selected)
    pub current_track_index: Option<usize>,

    /// Linear volume in [0, 1]
    pub volume: f32,

    /// Whether output is muted
    pub muted: bool,

    /// Last known position in seconds
    pub position_secs: f64,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            active_playlist: String::new(),
            current_track_index: None,
            volume: 0.7,
            muted: false,
            position_secs: 0.0,
        }
    }
}
