//! Persistence scenarios against file-backed stores

use cadence_core::{
    PlaybackSnapshot, Playlist, PlaylistRegistry, RepeatMode, Settings, SourceRef, Track, TrackId,
};
use cadence_storage::{
    BlobStore, DirBlobStore, FileStore, KeyValueStore, MemoryBlobStore, MemoryStore,
    PersistenceGateway, StorageError, PLAYLISTS_KEY,
};

/// Reads succeed, writes fail once storage is "full"
struct QuotaStore {
    inner: MemoryStore,
    remaining_writes: usize,
}

impl KeyValueStore for QuotaStore {
    fn get(&self, key: &str) -> cadence_storage::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> cadence_storage::Result<()> {
        if self.remaining_writes == 0 {
            return Err(StorageError::backend("quota exceeded"));
        }
        self.remaining_writes -= 1;
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> cadence_storage::Result<()> {
        self.inner.remove(key)
    }
}

fn sourced_track(name: &str, bytes: &[u8]) -> Track {
    Track::from_source(SourceRef::in_memory(name, Some("audio/mpeg"), bytes.to_vec()))
}

#[test]
fn state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut gateway = PersistenceGateway::new(Box::new(FileStore::open(dir.path()).unwrap()));
        let mut registry = PlaylistRegistry::default();
        registry.active_mut().tracks.push(sourced_track("a.mp3", b"aaaa"));
        registry.create("Road Trip").unwrap();

        gateway.save_settings(&Settings {
            repeat_mode: RepeatMode::One,
            shuffle: true,
            ..Settings::default()
        });
        gateway.save_playlists(&registry);
        gateway.save_playback_state(&PlaybackSnapshot {
            active_playlist: "My Playlist".to_string(),
            current_track_index: Some(0),
            volume: 0.4,
            muted: false,
            position_secs: 42.5,
        });
        assert!(!gateway.is_degraded());
    }

    let gateway = PersistenceGateway::new(Box::new(FileStore::open(dir.path()).unwrap()));
    let settings = gateway.load_settings();
    assert_eq!(settings.repeat_mode, RepeatMode::One);
    assert!(settings.shuffle);

    let registry = gateway.load_playlists().unwrap();
    assert_eq!(registry.names(), vec!["My Playlist", "Road Trip"]);
    assert_eq!(registry.active_name(), "My Playlist");
    let track = &registry.active().tracks[0];
    assert_eq!(track.title, "a");
    assert_eq!(track.file_name.as_deref(), Some("a.mp3"));
    // Metadata-only persistence never brings bytes back
    assert!(!track.has_source());

    let snapshot = gateway.load_playback_state();
    assert_eq!(snapshot.current_track_index, Some(0));
    assert_eq!(snapshot.position_secs, 42.5);
}

#[test]
fn blob_store_restores_playable_tracks() {
    let dir = tempfile::tempdir().unwrap();
    let kv = FileStore::open(dir.path().join("kv")).unwrap();
    let blobs = DirBlobStore::open(dir.path().join("blobs")).unwrap();
    let mut gateway = PersistenceGateway::with_blob_store(Box::new(kv), Box::new(blobs));

    let mut registry = PlaylistRegistry::default();
    registry.active_mut().tracks.push(sourced_track("a.mp3", b"aaaa"));
    registry.active_mut().tracks.push(sourced_track("b.mp3", b"bbbb"));
    gateway.save_playlists(&registry);

    let restored = gateway.load_playlists().unwrap();
    let tracks = &restored.active().tracks;
    assert_eq!(tracks.len(), 2);
    let source = tracks[1].source.as_ref().unwrap();
    assert_eq!(source.read_bytes().unwrap(), b"bbbb");
    assert_eq!(source.mime_type(), Some("audio/mpeg"));
    assert_eq!(tracks[1].id, registry.active().tracks[1].id);
}

#[test]
fn removed_tracks_lose_their_blobs() {
    let dir = tempfile::tempdir().unwrap();
    let blob_dir = dir.path().join("blobs");
    let mut gateway = PersistenceGateway::with_blob_store(
        Box::new(MemoryStore::new()),
        Box::new(DirBlobStore::open(&blob_dir).unwrap()),
    );

    let mut registry = PlaylistRegistry::default();
    registry.active_mut().tracks.push(sourced_track("a.mp3", b"aaaa"));
    registry.active_mut().tracks.push(sourced_track("b.mp3", b"bbbb"));
    gateway.save_playlists(&registry);

    let removed = registry.active_mut().tracks.remove(0);
    gateway.save_playlists(&registry);

    let remaining = DirBlobStore::open(&blob_dir).unwrap().ids().unwrap();
    assert_eq!(remaining, vec![registry.active().tracks[0].id.clone()]);
    assert!(!remaining.contains(&removed.id));
}

#[test]
fn tracks_with_missing_blobs_are_dropped() {
    let mut kv = MemoryStore::new();
    kv.set(
        PLAYLISTS_KEY,
        r#"{"active":"Mix","playlists":[{"name":"Mix","tracks":[
            {"id":"1-a","title":"Kept","artist":"Unknown","duration":10,"sourceName":"kept.mp3","hasBlob":true},
            {"id":"2-b","title":"Lost","artist":"Unknown","duration":20,"sourceName":"lost.mp3","hasBlob":true},
            {"id":"3-c","title":"Imported","artist":"Y","duration":30}
        ]}]}"#,
    )
    .unwrap();
    let mut blobs = MemoryBlobStore::new();
    blobs.put(&TrackId::new("1-a"), b"kept").unwrap();

    let gateway = PersistenceGateway::with_blob_store(Box::new(kv), Box::new(blobs));
    let registry = gateway.load_playlists().unwrap();

    assert_eq!(registry.active_name(), "Mix");
    let titles: Vec<&str> = registry.active().tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Kept", "Imported"]);
    assert!(registry.active().tracks[0].has_source());
    assert!(!registry.active().tracks[1].has_source());
}

#[test]
fn metadata_only_tracks_survive_a_restart_with_blobs() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        PersistenceGateway::with_blob_store(
            Box::new(FileStore::open(dir.path().join("kv")).unwrap()),
            Box::new(DirBlobStore::open(dir.path().join("blobs")).unwrap()),
        )
    };

    let mut registry = PlaylistRegistry::default();
    registry.active_mut().tracks.push(sourced_track("a.mp3", b"aaaa"));
    let imported = PersistenceGateway::import_playlist(
        br#"{"name":"Road Trip","tracks":[{"title":"X","artist":"Y","duration":120}]}"#,
    )
    .unwrap();
    registry.insert_unique(imported);
    open().save_playlists(&registry);

    let restored = open().load_playlists().unwrap();
    assert_eq!(restored.active().len(), 1);
    assert!(restored.active().tracks[0].has_source());
    let road_trip = restored.get("Road Trip").unwrap();
    assert_eq!(road_trip.len(), 1);
    assert_eq!(road_trip.tracks[0].title, "X");
    assert!(!road_trip.tracks[0].has_source());
}

#[test]
fn corrupt_playlists_are_ignored() {
    let mut kv = MemoryStore::new();
    kv.set(PLAYLISTS_KEY, "[1, 2").unwrap();
    let gateway = PersistenceGateway::new(Box::new(kv));
    assert!(gateway.load_playlists().is_none());
}

#[test]
fn quota_failure_degrades_for_the_session() {
    let store = QuotaStore {
        inner: MemoryStore::new(),
        remaining_writes: 1,
    };
    let mut gateway = PersistenceGateway::new(Box::new(store));

    gateway.save_settings(&Settings::default());
    assert!(!gateway.is_degraded());

    gateway.save_playlists(&PlaylistRegistry::default());
    assert!(gateway.is_degraded());

    // Reads keep working from what was written before the failure
    assert_eq!(gateway.load_settings(), Settings::default());
    assert!(gateway.load_playlists().is_none());
}

#[test]
fn exported_playlist_imports_under_a_free_name() {
    let mut registry = PlaylistRegistry::default();
    registry.create("Road Trip").unwrap();
    registry.set_active("Road Trip").unwrap();
    registry.active_mut().tracks.push(Track::metadata_only(
        TrackId::new("t1"),
        "X",
        "Y",
        120.0,
        Some("x.mp3".to_string()),
    ));

    let bytes = PersistenceGateway::export_playlist(&registry, "Road Trip").unwrap();
    let imported = PersistenceGateway::import_playlist(&bytes).unwrap();
    assert_eq!(imported.name, "Road Trip");
    assert_eq!(imported.tracks[0].title, "X");
    assert_eq!(imported.tracks[0].duration_secs, 120.0);
    assert_ne!(imported.tracks[0].id, TrackId::new("t1"));

    let name = registry.insert_unique(imported);
    assert_eq!(name, "Road Trip (1)");
    assert_eq!(registry.len(), 3);
}

#[test]
fn malformed_import_leaves_registry_untouched() {
    let registry = PlaylistRegistry::default();
    let result = PersistenceGateway::import_playlist(b"{\"name\": 3}");
    assert!(matches!(result, Err(StorageError::MalformedImport(_))));
    assert_eq!(registry.len(), 1);

    let playlist: Playlist = PersistenceGateway::import_playlist(
        br#"{"name":"Empty","tracks":[]}"#,
    )
    .unwrap();
    assert!(playlist.is_empty());
}
