//! Persistence gateway
//!
//! Reads and writes settings, playlists and the playback snapshot. Storage
//! failures never propagate to the player: reads fall back to defaults and
//! the first failed write switches the gateway to in-memory-only operation
//! for the rest of the session.

use crate::blob::BlobStore;
use crate::error::{Result, StorageError};
use crate::kv::KeyValueStore;
use crate::records::{ExportDocument, StoredRegistry, StoredTrack};
use cadence_core::{
    PlaybackSnapshot, Playlist, PlaylistRegistry, Settings, SourceRef, Track, TrackId,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

// Storage key constants
/// User settings record
pub const SETTINGS_KEY: &str = "cadence.settings";

/// Playlist registry (metadata only)
pub const PLAYLISTS_KEY: &str = "cadence.playlists";

/// Playback snapshot (active playlist, track, volume, position)
pub const PLAYBACK_KEY: &str = "cadence.playback";

/// Durable home of everything the player remembers
pub struct PersistenceGateway {
    kv: Box<dyn KeyValueStore>,
    blobs: Option<Box<dyn BlobStore>>,
    degraded: bool,
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("blob_store", &self.blobs.is_some())
            .field("degraded", &self.degraded)
            .finish_non_exhaustive()
    }
}

impl PersistenceGateway {
    /// Metadata-only persistence
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            blobs: None,
            degraded: false,
        }
    }

    /// Persistence that also keeps track bytes
    pub fn with_blob_store(kv: Box<dyn KeyValueStore>, blobs: Box<dyn BlobStore>) -> Self {
        Self {
            kv,
            blobs: Some(blobs),
            degraded: false,
        }
    }

    /// Whether a write failed earlier in this session
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn has_blob_store(&self) -> bool {
        self.blobs.is_some()
    }

    // ===== Settings =====

    /// Stored settings merged over the defaults
    pub fn load_settings(&self) -> Settings {
        match self.read_json::<serde_json::Value>(SETTINGS_KEY) {
            Ok(Some(value)) => Settings::from_stored(&value),
            Ok(None) => Settings::default(),
            Err(err) => {
                warn!(key = SETTINGS_KEY, "Failed to read settings, using defaults: {}", err);
                Settings::default()
            }
        }
    }

    pub fn save_settings(&mut self, settings: &Settings) {
        self.write_json(SETTINGS_KEY, settings);
    }

    // ===== Playlists =====

    /// Persist every playlist
    ///
    /// With a blob store, bytes of newly seen tracks are written and blobs of
    /// tracks that no longer exist are deleted.
    pub fn save_playlists(&mut self, registry: &PlaylistRegistry) {
        if self.degraded {
            debug!("Storage degraded, skipping playlist save");
            return;
        }
        if self.blobs.is_some() {
            self.sync_blobs(registry);
        }
        self.write_json(PLAYLISTS_KEY, &StoredRegistry::from(registry));
    }

    /// Restore playlists, or `None` when nothing usable is stored
    ///
    /// With a blob store, tracks whose bytes were stored but are now missing
    /// are dropped with a warning. Tracks that never had bytes, and every
    /// track when there is no blob store, come back metadata-only.
    pub fn load_playlists(&self) -> Option<PlaylistRegistry> {
        let stored = match self.read_json::<StoredRegistry>(PLAYLISTS_KEY) {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(err) => {
                warn!(key = PLAYLISTS_KEY, "Failed to read playlists: {}", err);
                return None;
            }
        };

        let playlists = stored
            .playlists
            .into_iter()
            .map(|playlist| {
                let tracks = playlist
                    .tracks
                    .into_iter()
                    .filter_map(|track| self.restore_track(&playlist.name, track))
                    .collect();
                Playlist::with_tracks(playlist.name, tracks)
            })
            .collect();

        Some(PlaylistRegistry::from_playlists(playlists, &stored.active))
    }

    // ===== Playback state =====

    pub fn save_playback_state(&mut self, snapshot: &PlaybackSnapshot) {
        self.write_json(PLAYBACK_KEY, snapshot);
    }

    /// Last saved snapshot, or the default one
    pub fn load_playback_state(&self) -> PlaybackSnapshot {
        match self.read_json::<PlaybackSnapshot>(PLAYBACK_KEY) {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(err) => {
                warn!(key = PLAYBACK_KEY, "Failed to read playback state: {}", err);
                PlaybackSnapshot::default()
            }
        }
    }

    // ===== Export / import =====

    /// Serialize one playlist as an export document
    pub fn export_playlist(registry: &PlaylistRegistry, name: &str) -> Result<Vec<u8>> {
        let playlist = registry
            .get(name)
            .ok_or_else(|| StorageError::not_found("playlist", name))?;
        let bytes = serde_json::to_vec_pretty(&ExportDocument::from_playlist(playlist))?;
        info!(playlist = %name, tracks = playlist.len(), "Exported playlist");
        Ok(bytes)
    }

    /// Parse an export document into a metadata-only playlist
    ///
    /// The caller adds it to the registry, which resolves name collisions.
    pub fn import_playlist(bytes: &[u8]) -> Result<Playlist> {
        let document: ExportDocument = serde_json::from_slice(bytes)
            .map_err(|err| StorageError::MalformedImport(err.to_string()))?;
        if document.tracks.iter().any(|t| !t.duration.is_finite()) {
            return Err(StorageError::MalformedImport(
                "track duration is not a number".to_string(),
            ));
        }
        let playlist = document.into_playlist();
        info!(playlist = %playlist.name, tracks = playlist.len(), "Imported playlist");
        Ok(playlist)
    }

    // ===== Internals =====

    fn restore_track(&self, playlist: &str, stored: StoredTrack) -> Option<Track> {
        let track = Track::metadata_only(
            stored.id.clone(),
            stored.title,
            stored.artist,
            stored.duration,
            stored.source_name.clone(),
        );

        let Some(blobs) = &self.blobs else {
            return Some(track);
        };

        match blobs.get(&stored.id) {
            Ok(Some(bytes)) => {
                let file_name = stored
                    .source_name
                    .unwrap_or_else(|| format!("{}.audio", stored.id));
                let source = SourceRef::in_memory(file_name, stored.mime_type.as_deref(), bytes);
                Some(track.with_source(source))
            }
            Ok(None) if !stored.has_blob => Some(track),
            Ok(None) => {
                warn!(
                    playlist = %playlist,
                    track = %stored.id,
                    "Dropping track, stored bytes are missing"
                );
                None
            }
            Err(err) => {
                warn!(
                    playlist = %playlist,
                    track = %stored.id,
                    "Dropping track, stored bytes unreadable: {}", err
                );
                None
            }
        }
    }

    fn sync_blobs(&mut self, registry: &PlaylistRegistry) {
        let Some(blobs) = self.blobs.as_mut() else {
            return;
        };

        let mut live: HashSet<TrackId> = HashSet::new();
        for track in registry.iter().flat_map(|p| p.tracks.iter()) {
            live.insert(track.id.clone());
            let Some(source) = &track.source else {
                continue;
            };
            match blobs.contains(&track.id) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(err) => {
                    warn!(track = %track.id, "Blob lookup failed: {}", err);
                    continue;
                }
            }
            let written = source
                .read_bytes()
                .map_err(StorageError::from)
                .and_then(|bytes| blobs.put(&track.id, &bytes));
            if let Err(err) = written {
                warn!(track = %track.id, "Failed to store track bytes: {}", err);
            }
        }

        match blobs.ids() {
            Ok(ids) => {
                for id in ids.into_iter().filter(|id| !live.contains(id)) {
                    debug!(track = %id, "Deleting orphaned blob");
                    if let Err(err) = blobs.delete(&id) {
                        warn!(track = %id, "Failed to delete orphaned blob: {}", err);
                    }
                }
            }
            Err(err) => warn!("Failed to list blobs: {}", err),
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.kv.get(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Write a record; the first failure degrades the gateway
    fn write_json<T: Serialize>(&mut self, key: &str, value: &T) {
        if self.degraded {
            debug!(key, "Storage degraded, skipping save");
            return;
        }

        let result = serde_json::to_string(value)
            .map_err(StorageError::from)
            .and_then(|text| self.kv.set(key, &text));
        if let Err(err) = result {
            warn!(key, "Save failed, continuing without persistence: {}", err);
            self.degraded = true;
        }
    }
}
