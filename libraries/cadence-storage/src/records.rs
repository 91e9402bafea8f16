//! Persisted and exported record shapes

use cadence_core::{Playlist, PlaylistRegistry, Track, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version written into export documents
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Track metadata as stored between sessions (never the bytes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTrack {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Bytes were handed to the blob store when this record was written
    #[serde(default)]
    pub has_blob: bool,
}

impl From<&Track> for StoredTrack {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            duration: track.duration_secs,
            source_name: track.file_name.clone(),
            mime_type: track
                .source
                .as_ref()
                .and_then(|s| s.mime_type())
                .map(str::to_string),
            has_blob: track.has_source(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPlaylist {
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<StoredTrack>,
}

/// Every playlist plus the active one's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRegistry {
    pub active: String,
    pub playlists: Vec<StoredPlaylist>,
}

impl From<&PlaylistRegistry> for StoredRegistry {
    fn from(registry: &PlaylistRegistry) -> Self {
        Self {
            active: registry.active_name().to_string(),
            playlists: registry
                .iter()
                .map(|playlist| StoredPlaylist {
                    name: playlist.name.clone(),
                    tracks: playlist.tracks.iter().map(StoredTrack::from).collect(),
                })
                .collect(),
        }
    }
}

/// One track of an export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTrack {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Playlist export document
///
/// `{name, tracks: [{title, artist, duration, fileName?}], exportedAt?, version?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub name: String,
    pub tracks: Vec<ExportedTrack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ExportDocument {
    /// Build a document for a playlist, stamped with the current time
    pub fn from_playlist(playlist: &Playlist) -> Self {
        Self {
            name: playlist.name.clone(),
            tracks: playlist
                .tracks
                .iter()
                .map(|track| ExportedTrack {
                    title: track.title.clone(),
                    artist: track.artist.clone(),
                    duration: track.duration_secs,
                    file_name: track.file_name.clone(),
                })
                .collect(),
            exported_at: Some(Utc::now()),
            version: Some(EXPORT_FORMAT_VERSION.to_string()),
        }
    }

    /// Metadata-only playlist with fresh track ids
    pub fn into_playlist(self) -> Playlist {
        let tracks = self
            .tracks
            .into_iter()
            .map(|t| {
                Track::metadata_only(
                    TrackId::generate(),
                    t.title,
                    t.artist,
                    t.duration,
                    t.file_name,
                )
            })
            .collect();
        Playlist::with_tracks(self.name, tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn export_document_uses_wire_names() {
        let playlist = Playlist::with_tracks(
            "Road Trip",
            vec![Track::metadata_only(
                TrackId::new("t1"),
                "X",
                "Y",
                120.0,
                Some("x.mp3".to_string()),
            )],
        );
        let value = serde_json::to_value(ExportDocument::from_playlist(&playlist)).unwrap();

        assert_eq!(value["name"], "Road Trip");
        assert_eq!(
            value["tracks"],
            json!([{ "title": "X", "artist": "Y", "duration": 120.0, "fileName": "x.mp3" }])
        );
        assert_eq!(value["version"], EXPORT_FORMAT_VERSION);
        assert!(value["exportedAt"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn minimal_document_parses() {
        let doc: ExportDocument = serde_json::from_str(
            r#"{"name":"Road Trip","tracks":[{"title":"X","artist":"Y","duration":120}]}"#,
        )
        .unwrap();
        assert!(doc.exported_at.is_none());

        let playlist = doc.into_playlist();
        assert_eq!(playlist.name, "Road Trip");
        assert_eq!(playlist.tracks[0].duration_secs, 120.0);
        assert!(!playlist.tracks[0].has_source());
    }
}
