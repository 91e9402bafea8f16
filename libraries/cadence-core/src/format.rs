//! Audio file acceptance
//!
//! A file is accepted when either its MIME type or its extension is known.
//! Browsers often report an empty or generic MIME type for local files,
//! so the extension check alone is enough.

use crate::error::{CadenceError, Result};
use crate::types::SourceRef;

/// MIME types accepted at intake
pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/flac",
    "audio/x-flac",
    "audio/wav",
    "audio/x-wav",
    "audio/ogg",
    "audio/x-ogg",
    "audio/aac",
    "audio/mp4",
    "audio/webm",
    "audio/opus",
];

/// File extensions accepted at intake (matched case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &[".mp3", ".flac", ".wav", ".ogg", ".aac", ".m4a", ".opus", ".webm"];

/// Check whether a file looks like playable audio
pub fn is_supported_audio(file_name: &str, mime_type: Option<&str>) -> bool {
    if let Some(mime) = mime_type {
        if SUPPORTED_MIME_TYPES.contains(&mime.trim().to_ascii_lowercase().as_str()) {
            return true;
        }
    }

    let lower = file_name.to_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Validate a source at intake
///
/// The error names the rejected file so it can be shown per file.
pub fn check_supported(source: &SourceRef) -> Result<()> {
    if is_supported_audio(source.file_name(), source.mime_type()) {
        Ok(())
    } else {
        Err(CadenceError::unsupported_format(source.file_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_by_mime_type() {
        assert!(is_supported_audio("track", Some("audio/x-flac")));
        assert!(is_supported_audio("track.bin", Some("audio/mpeg")));
    }

    #[test]
    fn accepts_by_extension_case_insensitive() {
        assert!(is_supported_audio("Song.MP3", None));
        assert!(is_supported_audio("voice.m4a", Some("")));
        assert!(is_supported_audio("clip.Opus", Some("application/octet-stream")));
    }

    #[test]
    fn rejects_unknown_files() {
        assert!(!is_supported_audio("notes.txt", Some("text/plain")));
        assert!(!is_supported_audio("cover.jpg", None));
        assert!(!is_supported_audio("mp3", None));
    }

    #[test]
    fn rejection_names_the_file() {
        let source = SourceRef::in_memory("readme.md", Some("text/markdown"), Vec::<u8>::new());
        let err = check_supported(&source).unwrap_err();
        assert!(err.to_string().contains("readme.md"));
        assert!(matches!(err, CadenceError::UnsupportedFormat { .. }));
    }
}
