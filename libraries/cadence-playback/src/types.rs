//! Core types for playback management

use cadence_core::RepeatMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the playback controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume in [0, 1] (default: 0.7)
    pub volume: f32,

    /// Delay before skipping an unplayable track during autoplay (default: 1000 ms)
    pub skip_delay_ms: u64,

    /// Fixed shuffle seed, for reproducible orders
    pub shuffle_seed: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            skip_delay_ms: 1000,
            shuffle_seed: None,
        }
    }
}

impl PlaybackConfig {
    /// Skip delay as a duration
    pub fn skip_delay(&self) -> Duration {
        Duration::from_millis(self.skip_delay_ms)
    }
}

/// Read-only view of the player state
///
/// Invariant: when the active playlist is empty, `current_track_index` is
/// `None` and `is_playing` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub active_playlist_name: String,
    pub current_track_index: Option<usize>,
    pub is_playing: bool,
    pub is_muted: bool,
    pub volume: f32,
    pub shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,
    /// Traversal order over the active playlist (identity unless shuffled)
    pub order_permutation: Vec<usize>,
}
