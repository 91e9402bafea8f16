//! Typed user intents
//!
//! Every input source (buttons, keyboard, OS media keys, CLI) is translated
//! into a `Command` and handed to `PlaybackController::dispatch`.

use cadence_core::{RepeatMode, SourceRef};

/// A user intent
#[derive(Debug, Clone)]
pub enum Command {
    Play,
    Pause,
    TogglePlayPause,
    Next,
    Previous,

    /// Load a track and start it (playlist item click)
    Select(usize),

    /// Load a track without starting it
    Load(usize),

    /// Seek to a fraction of the current track in [0, 1]
    Seek(f32),

    SetVolume(f32),
    ToggleMute,
    ToggleShuffle,
    CycleRepeat,
    SetRepeat(RepeatMode),
    SetAutoplayNext(bool),

    AddFiles(Vec<SourceRef>),
    Remove(usize),
    Clear,

    CreatePlaylist(String),
    RenamePlaylist { from: String, to: String },
    DeletePlaylist(String),
    SwitchPlaylist(String),
}

impl Command {
    /// Map a keyboard key to a command
    ///
    /// Space toggles playback, the horizontal arrows skip.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Space" => Some(Self::TogglePlayPause),
            "ArrowRight" => Some(Self::Next),
            "ArrowLeft" => Some(Self::Previous),
            _ => None,
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::TogglePlayPause => "toggle_play_pause",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Select(_) => "select",
            Self::Load(_) => "load",
            Self::Seek(_) => "seek",
            Self::SetVolume(_) => "set_volume",
            Self::ToggleMute => "toggle_mute",
            Self::ToggleShuffle => "toggle_shuffle",
            Self::CycleRepeat => "cycle_repeat",
            Self::SetRepeat(_) => "set_repeat",
            Self::SetAutoplayNext(_) => "set_autoplay_next",
            Self::AddFiles(_) => "add_files",
            Self::Remove(_) => "remove",
            Self::Clear => "clear",
            Self::CreatePlaylist(_) => "create_playlist",
            Self::RenamePlaylist { .. } => "rename_playlist",
            Self::DeletePlaylist(_) => "delete_playlist",
            Self::SwitchPlaylist(_) => "switch_playlist",
        }
    }
}
