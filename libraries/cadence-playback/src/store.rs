//! Track store
//!
//! Owns the playlist registry and the locator cache, so that every track
//! removal releases its locator before the track goes away.

use crate::events::PlaybackEvent;
use crate::locator::{Locator, ObjectUrlCache};
use cadence_core::format::check_supported;
use cadence_core::{CadenceError, Playlist, PlaylistRegistry, Result, SourceRef, Track, TrackId};
use tracing::{debug, info, warn};

/// Outcome of adding a batch of files
#[derive(Debug, Default)]
pub struct IntakeReport {
    /// Ids of accepted tracks, in input order
    pub added: Vec<TrackId>,

    /// Ids of existing metadata-only tracks that got their file back
    pub relinked: Vec<TrackId>,

    /// One error per rejected file
    pub rejected: Vec<CadenceError>,
}

impl IntakeReport {
    /// Whether the active playlist changed at all
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.relinked.is_empty()
    }
}

/// Playlists plus the locators of their tracks
#[derive(Debug)]
pub struct TrackStore {
    registry: PlaylistRegistry,
    locators: ObjectUrlCache,
    pending_events: Vec<PlaybackEvent>,
}

impl TrackStore {
    /// Create a store with a single default playlist
    pub fn new(locators: ObjectUrlCache) -> Self {
        Self::with_registry(PlaylistRegistry::default(), locators)
    }

    /// Create a store around an existing registry
    pub fn with_registry(registry: PlaylistRegistry, locators: ObjectUrlCache) -> Self {
        Self {
            registry,
            locators,
            pending_events: Vec::new(),
        }
    }

    // ===== Queries =====

    /// The playlist registry
    pub fn registry(&self) -> &PlaylistRegistry {
        &self.registry
    }

    /// Name of the active playlist
    pub fn active_name(&self) -> &str {
        self.registry.active_name()
    }

    /// Tracks of the active playlist
    pub fn tracks(&self) -> &[Track] {
        &self.registry.active().tracks
    }

    /// Track at an index of the active playlist
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks().get(index)
    }

    /// Number of tracks in the active playlist
    pub fn len(&self) -> usize {
        self.tracks().len()
    }

    /// Whether the active playlist is empty
    pub fn is_empty(&self) -> bool {
        self.tracks().is_empty()
    }

    /// Live locator of a track, if one was acquired
    pub fn locator(&self, track_id: &TrackId) -> Option<&Locator> {
        self.locators.get(track_id)
    }

    /// Number of live locators
    pub fn live_locators(&self) -> usize {
        self.locators.len()
    }

    // ===== Tracks =====

    /// Append a track for a source to the active playlist
    ///
    /// Duration starts at 0 and is filled in later by `update_duration`.
    pub fn add(&mut self, source: SourceRef) -> Track {
        let track = Track::from_source(source);
        debug!(track = %track.id, title = %track.title, "Track added");
        self.registry.active_mut().tracks.push(track.clone());
        self.emit_playlist_changed();
        track
    }

    /// Validate and append a batch of files
    pub fn add_files(&mut self, sources: Vec<SourceRef>) -> IntakeReport {
        let mut report = IntakeReport::default();

        for source in sources {
            if let Err(err) = check_supported(&source) {
                warn!(file = %source.file_name(), "Rejected unsupported file");
                report.rejected.push(err);
                continue;
            }
            if let Some(index) = self.relink_target(source.file_name()) {
                match self.attach_source(index, source) {
                    Ok(track_id) => report.relinked.push(track_id),
                    Err(err) => warn!("Re-link failed: {}", err),
                }
                continue;
            }
            let track = Track::from_source(source);
            report.added.push(track.id.clone());
            self.registry.active_mut().tracks.push(track);
        }

        if report.changed() {
            info!(
                added = report.added.len(),
                relinked = report.relinked.len(),
                rejected = report.rejected.len(),
                playlist = %self.registry.active_name(),
                "Files added"
            );
            self.emit_playlist_changed();
        }
        report
    }

    /// Give a file back to the track at an index of the active playlist
    ///
    /// The track keeps its id, position and metadata. A locator minted for a
    /// previous source is released.
    pub fn attach_source(&mut self, index: usize, source: SourceRef) -> Result<TrackId> {
        check_supported(&source)?;
        let track = self
            .registry
            .active_mut()
            .tracks
            .get_mut(index)
            .ok_or(CadenceError::IndexOutOfBounds(index))?;
        if track.file_name.is_none() {
            track.file_name = Some(source.file_name().to_string());
        }
        track.source = Some(source);
        let track_id = track.id.clone();
        self.locators.release(&track_id);
        debug!(track = %track_id, index, "Source attached");
        self.emit_playlist_changed();
        Ok(track_id)
    }

    /// First source-less track of the active playlist named after `file_name`
    fn relink_target(&self, file_name: &str) -> Option<usize> {
        self.tracks()
            .iter()
            .position(|t| !t.has_source() && t.file_name.as_deref() == Some(file_name))
    }

    /// Record a probed duration; returns false if the track is gone
    pub fn update_duration(&mut self, track_id: &TrackId, seconds: f64) -> bool {
        let Some(track) = self.registry.find_track_mut(track_id) else {
            return false;
        };
        track.set_duration(seconds);
        let duration_secs = track.duration_secs;
        self.pending_events.push(PlaybackEvent::DurationChanged {
            track_id: track_id.clone(),
            duration_secs,
        });
        true
    }

    /// Remove a track from the active playlist
    ///
    /// Out-of-range indices are a no-op returning `None`.
    pub fn remove(&mut self, index: usize) -> Option<Track> {
        if index >= self.len() {
            return None;
        }

        let track_id = self.tracks()[index].id.clone();
        self.locators.release(&track_id);
        let removed = self.registry.active_mut().tracks.remove(index);
        debug!(track = %removed.id, index, "Track removed");
        self.emit_playlist_changed();
        Some(removed)
    }

    /// Remove every track from the active playlist
    pub fn clear(&mut self) -> usize {
        let removed: Vec<Track> = self.registry.active_mut().tracks.drain(..).collect();
        for track in &removed {
            self.locators.release(&track.id);
        }
        self.emit_playlist_changed();
        removed.len()
    }

    /// Locator for the track at an index of the active playlist
    pub fn acquire(&mut self, index: usize) -> Result<Locator> {
        let track = self
            .registry
            .active()
            .tracks
            .get(index)
            .ok_or(CadenceError::IndexOutOfBounds(index))?;
        self.locators.acquire(track)
    }

    /// Release one track's locator
    pub fn release(&mut self, track_id: &TrackId) {
        self.locators.release(track_id);
    }

    // ===== Playlists =====

    /// Create an empty playlist
    pub fn create_playlist(&mut self, name: &str) -> Result<()> {
        self.registry.create(name)?;
        self.emit_playlists_changed();
        Ok(())
    }

    /// Rename a playlist
    pub fn rename_playlist(&mut self, old: &str, new: &str) -> Result<()> {
        self.registry.rename(old, new)?;
        self.emit_playlists_changed();
        Ok(())
    }

    /// Delete a playlist, releasing its tracks' locators
    pub fn delete_playlist(&mut self, name: &str) -> Result<()> {
        let removed = self.registry.delete(name)?;
        for track in &removed.tracks {
            self.locators.release(&track.id);
        }
        info!(playlist = %name, tracks = removed.tracks.len(), "Playlist deleted");
        self.emit_playlists_changed();
        Ok(())
    }

    /// Make another playlist active
    ///
    /// Releases every locator first, to bound memory to one playlist.
    pub fn switch_active(&mut self, name: &str) -> Result<()> {
        if !self.registry.contains(name) {
            return Err(CadenceError::PlaylistNotFound(name.to_string()));
        }
        self.locators.release_all();
        self.registry.set_active(name)?;
        self.pending_events.push(PlaybackEvent::ActivePlaylistChanged {
            name: name.to_string(),
            length: self.len(),
        });
        Ok(())
    }

    /// Add a playlist (e.g. from an import), renaming on collision
    ///
    /// Returns the name it was stored under.
    pub fn adopt_playlist(&mut self, playlist: Playlist) -> String {
        let name = self.registry.insert_unique(playlist);
        info!(playlist = %name, "Playlist added");
        self.emit_playlists_changed();
        name
    }

    /// Replace every playlist (e.g. after restoring from storage)
    pub fn replace_registry(&mut self, registry: PlaylistRegistry) {
        self.locators.release_all();
        self.registry = registry;
        self.emit_playlists_changed();
        self.pending_events.push(PlaybackEvent::ActivePlaylistChanged {
            name: self.registry.active_name().to_string(),
            length: self.len(),
        });
    }

    /// Release every locator (teardown)
    pub fn release_all(&mut self) {
        self.locators.release_all();
    }

    /// Take the change notifications recorded so far
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn emit_playlist_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::PlaylistChanged {
            name: self.registry.active_name().to_string(),
            length: self.len(),
        });
    }

    fn emit_playlists_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::PlaylistsChanged {
            names: self.registry.names().into_iter().map(str::to_string).collect(),
        });
    }
}
