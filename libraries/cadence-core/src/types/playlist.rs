/// Playlist domain types
use crate::error::{CadenceError, Result};
use crate::types::{Track, TrackId};

/// Name of the playlist created when nothing else exists
pub const DEFAULT_PLAYLIST_NAME: &str = "My Playlist";

/// Named, ordered collection of tracks
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    /// Unique playlist name (registry key)
    pub name: String,

    /// Tracks in playback order
    pub tracks: Vec<Track>,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    /// Create a playlist with tracks
    pub fn with_tracks(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            tracks,
        }
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the playlist is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Set of named playlists with exactly one active entry
///
/// Invariant: never empty. Deleting the last playlist is rejected, and
/// constructing from an empty list falls back to a default playlist.
#[derive(Debug, Clone)]
pub struct PlaylistRegistry {
    playlists: Vec<Playlist>,
    active: usize,
}

impl Default for PlaylistRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYLIST_NAME)
    }
}

impl PlaylistRegistry {
    /// Create a registry with a single empty playlist
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            playlists: vec![Playlist::new(name)],
            active: 0,
        }
    }

    /// Build a registry from restored playlists
    ///
    /// Duplicate names keep the first occurrence. The active playlist falls
    /// back to the first one when `active_name` is unknown.
    pub fn from_playlists(playlists: Vec<Playlist>, active_name: &str) -> Self {
        let mut unique: Vec<Playlist> = Vec::with_capacity(playlists.len());
        for playlist in playlists {
            if !unique.iter().any(|p| p.name == playlist.name) {
                unique.push(playlist);
            }
        }

        if unique.is_empty() {
            return Self::default();
        }

        let active = unique
            .iter()
            .position(|p| p.name == active_name)
            .unwrap_or(0);

        Self {
            playlists: unique,
            active,
        }
    }

    /// The active playlist
    pub fn active(&self) -> &Playlist {
        &self.playlists[self.active]
    }

    /// The active playlist (mutable)
    pub fn active_mut(&mut self) -> &mut Playlist {
        &mut self.playlists[self.active]
    }

    /// Name of the active playlist
    pub fn active_name(&self) -> &str {
        &self.playlists[self.active].name
    }

    /// Look up a playlist by name
    pub fn get(&self, name: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.name == name)
    }

    /// Find a track in any playlist
    pub fn find_track_mut(&mut self, track_id: &TrackId) -> Option<&mut Track> {
        self.playlists
            .iter_mut()
            .flat_map(|p| p.tracks.iter_mut())
            .find(|t| &t.id == track_id)
    }

    /// Whether a playlist with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Playlist names in creation order
    pub fn names(&self) -> Vec<&str> {
        self.playlists.iter().map(|p| p.name.as_str()).collect()
    }

    /// Iterate over all playlists
    pub fn iter(&self) -> impl Iterator<Item = &Playlist> {
        self.playlists.iter()
    }

    /// Number of playlists (always at least 1)
    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// Create a new empty playlist
    pub fn create(&mut self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        if self.contains(&name) {
            return Err(CadenceError::DuplicateName(name));
        }
        self.playlists.push(Playlist::new(name));
        Ok(())
    }

    /// Rename a playlist
    ///
    /// Renaming to the current name is a no-op.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let new = validate_name(new)?;
        let index = self.position(old)?;
        if old == new {
            return Ok(());
        }
        if self.contains(&new) {
            return Err(CadenceError::DuplicateName(new));
        }
        self.playlists[index].name = new;
        Ok(())
    }

    /// Delete a playlist and return it
    ///
    /// Deleting the active playlist activates the first remaining one.
    pub fn delete(&mut self, name: &str) -> Result<Playlist> {
        let index = self.position(name)?;
        if self.playlists.len() == 1 {
            return Err(CadenceError::LastPlaylist);
        }

        let removed = self.playlists.remove(index);
        if index == self.active {
            self.active = 0;
        } else if index < self.active {
            self.active -= 1;
        }
        Ok(removed)
    }

    /// Make a playlist active
    pub fn set_active(&mut self, name: &str) -> Result<()> {
        self.active = self.position(name)?;
        Ok(())
    }

    /// First free name derived from `base`: `base`, `base (1)`, `base (2)`, ...
    pub fn unique_name(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        let mut counter = 1usize;
        loop {
            let candidate = format!("{base} ({counter})");
            if !self.contains(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Insert a playlist, renaming it on collision; returns the final name
    pub fn insert_unique(&mut self, mut playlist: Playlist) -> String {
        let base = if playlist.name.trim().is_empty() {
            DEFAULT_PLAYLIST_NAME.to_string()
        } else {
            playlist.name.trim().to_string()
        };
        playlist.name = self.unique_name(&base);
        let name = playlist.name.clone();
        self.playlists.push(playlist);
        name
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.playlists
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| CadenceError::PlaylistNotFound(name.to_string()))
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CadenceError::invalid_input("playlist name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_one_active_playlist() {
        let registry = PlaylistRegistry::default();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_name(), DEFAULT_PLAYLIST_NAME);
    }

    #[test]
    fn create_rejects_duplicates_and_empty_names() {
        let mut registry = PlaylistRegistry::new("A");
        registry.create("B").unwrap();
        assert!(matches!(
            registry.create("B"),
            Err(CadenceError::DuplicateName(name)) if name == "B"
        ));
        assert!(matches!(
            registry.create("   "),
            Err(CadenceError::InvalidInput(_))
        ));
        assert_eq!(registry.names(), vec!["A", "B"]);
    }

    #[test]
    fn rename_checks_existence_and_collisions() {
        let mut registry = PlaylistRegistry::new("A");
        registry.create("B").unwrap();

        assert!(matches!(
            registry.rename("missing", "C"),
            Err(CadenceError::PlaylistNotFound(_))
        ));
        assert!(matches!(
            registry.rename("A", "B"),
            Err(CadenceError::DuplicateName(_))
        ));

        registry.rename("A", "A").unwrap();
        registry.rename("A", "Road Trip").unwrap();
        assert_eq!(registry.active_name(), "Road Trip");
    }

    #[test]
    fn deleting_last_playlist_is_rejected() {
        let mut registry = PlaylistRegistry::new("Only");
        assert!(matches!(
            registry.delete("Only"),
            Err(CadenceError::LastPlaylist)
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn deleting_keeps_active_index_consistent() {
        let mut registry = PlaylistRegistry::new("A");
        registry.create("B").unwrap();
        registry.create("C").unwrap();
        registry.set_active("C").unwrap();

        registry.delete("A").unwrap();
        assert_eq!(registry.active_name(), "C");

        registry.delete("C").unwrap();
        assert_eq!(registry.active_name(), "B");
    }

    #[test]
    fn unique_name_appends_counter() {
        let mut registry = PlaylistRegistry::new("Road Trip");
        assert_eq!(registry.unique_name("Road Trip"), "Road Trip (1)");
        assert_eq!(
            registry.insert_unique(Playlist::new("Road Trip")),
            "Road Trip (1)"
        );
        assert_eq!(
            registry.insert_unique(Playlist::new("Road Trip")),
            "Road Trip (2)"
        );
        assert_eq!(registry.unique_name("Other"), "Other");
    }

    #[test]
    fn from_playlists_falls_back_when_empty_or_unknown_active() {
        let registry = PlaylistRegistry::from_playlists(Vec::new(), "x");
        assert_eq!(registry.active_name(), DEFAULT_PLAYLIST_NAME);

        let registry = PlaylistRegistry::from_playlists(
            vec![Playlist::new("A"), Playlist::new("B"), Playlist::new("A")],
            "missing",
        );
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.active_name(), "A");
    }
}
