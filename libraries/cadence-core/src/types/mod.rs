/// Core domain types
mod ids;
mod playback_state;
mod playlist;
mod settings;
mod track;

pub use ids::TrackId;
pub use playback_state::PlaybackSnapshot;
pub use playlist::{Playlist, PlaylistRegistry, DEFAULT_PLAYLIST_NAME};
pub use settings::{RepeatMode, Settings, Theme};
pub use track::{SourceData, SourceRef, Track, UNKNOWN_ARTIST};
