/// Track domain types
use crate::types::TrackId;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Artist shown until real tags are known
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// Where a track's bytes live
#[derive(Clone)]
pub enum SourceData {
    /// File on the local filesystem
    Path(PathBuf),

    /// Bytes already held in memory (picked file, restored blob)
    Memory(Arc<[u8]>),
}

impl fmt::Debug for SourceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
        }
    }
}

/// Handle to the byte source behind a track
#[derive(Debug, Clone)]
pub struct SourceRef {
    file_name: String,
    mime_type: Option<String>,
    data: SourceData,
}

impl SourceRef {
    /// Reference a file on disk
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Self {
            file_name,
            mime_type: None,
            data: SourceData::Path(path.to_path_buf()),
        }
    }

    /// Reference bytes held in memory
    pub fn in_memory(
        file_name: impl Into<String>,
        mime_type: Option<&str>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.map(str::to_string),
            data: SourceData::Memory(bytes.into()),
        }
    }

    /// Set the MIME type reported by the host
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Original file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type, if the host reported one
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Underlying data
    pub fn data(&self) -> &SourceData {
        &self.data
    }

    /// Read the full contents
    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        match &self.data {
            SourceData::Path(path) => std::fs::read(path),
            SourceData::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }

    /// Display title derived from the file name (extension stripped)
    pub fn display_title(&self) -> String {
        title_from_file_name(&self.file_name)
    }
}

fn title_from_file_name(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => stem.to_string(),
        _ => file_name.to_string(),
    }
}

/// A track in a playlist
///
/// `source` is `None` for tracks reconstructed from metadata only (an
/// imported playlist, or a restored one without a blob store). Such a track
/// can be listed, reordered and exported but never played until the user
/// supplies the file again.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track identifier (immutable)
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Track duration in seconds (0 until probed)
    pub duration_secs: f64,

    /// Name of the original file, kept for export and re-linking
    pub file_name: Option<String>,

    /// Byte source, if available
    pub source: Option<SourceRef>,
}

impl Track {
    /// Create a track for a newly accepted file
    pub fn from_source(source: SourceRef) -> Self {
        Self {
            id: TrackId::generate(),
            title: source.display_title(),
            artist: UNKNOWN_ARTIST.to_string(),
            duration_secs: 0.0,
            file_name: Some(source.file_name().to_string()),
            source: Some(source),
        }
    }

    /// Create a metadata-only track
    pub fn metadata_only(
        id: TrackId,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_secs: f64,
        file_name: Option<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            duration_secs: sanitize_duration(duration_secs),
            file_name,
            source: None,
        }
    }

    /// Attach a byte source to a metadata-only track
    #[must_use]
    pub fn with_source(mut self, source: SourceRef) -> Self {
        if self.file_name.is_none() {
            self.file_name = Some(source.file_name().to_string());
        }
        self.source = Some(source);
        self
    }

    /// Whether the track can produce a locator
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Record a probed duration
    pub fn set_duration(&mut self, seconds: f64) {
        self.duration_secs = sanitize_duration(seconds);
    }
}

fn sanitize_duration(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_from_source_strips_extension() {
        let track = Track::from_source(SourceRef::in_memory("My Song.flac", None, vec![1u8, 2]));
        assert_eq!(track.title, "My Song");
        assert_eq!(track.artist, UNKNOWN_ARTIST);
        assert_eq!(track.duration_secs, 0.0);
        assert_eq!(track.file_name.as_deref(), Some("My Song.flac"));
        assert!(track.has_source());
    }

    #[test]
    fn title_keeps_inner_dots() {
        assert_eq!(title_from_file_name("a.b.c.mp3"), "a.b.c");
        assert_eq!(title_from_file_name("noext"), "noext");
        assert_eq!(title_from_file_name(".hidden"), ".hidden");
    }

    #[test]
    fn metadata_only_track_has_no_source() {
        let track = Track::metadata_only(TrackId::new("t1"), "X", "Y", 120.0, None);
        assert!(!track.has_source());
        assert_eq!(track.duration_secs, 120.0);
    }

    #[test]
    fn invalid_durations_become_zero() {
        let mut track = Track::metadata_only(TrackId::new("t1"), "X", "Y", f64::NAN, None);
        assert_eq!(track.duration_secs, 0.0);
        track.set_duration(-3.0);
        assert_eq!(track.duration_secs, 0.0);
        track.set_duration(42.5);
        assert_eq!(track.duration_secs, 42.5);
    }

    #[test]
    fn in_memory_source_reads_bytes() {
        let source = SourceRef::in_memory("a.mp3", Some("audio/mpeg"), vec![9u8, 8, 7]);
        assert_eq!(source.read_bytes().unwrap(), vec![9, 8, 7]);
        assert_eq!(source.mime_type(), Some("audio/mpeg"));
    }

    #[test]
    fn path_source_uses_file_name() {
        let source = SourceRef::from_path("/music/album/Intro.ogg");
        assert_eq!(source.file_name(), "Intro.ogg");
        assert_eq!(source.display_title(), "Intro");
    }
}
