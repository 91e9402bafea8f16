/// ID types for Cadence entities
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TRACK_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Track identifier
///
/// Generated ids combine a process-wide monotonic counter with a random salt,
/// so two tracks added within the same instant never collide and ids from
/// previous sessions are vanishingly unlikely to clash with new ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create a track ID from a known value (e.g. restored from storage)
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new unique track ID
    pub fn generate() -> Self {
        let sequence = NEXT_TRACK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let salt: u32 = rand::random();
        Self(format!("{sequence:x}-{salt:08x}"))
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<TrackId> = (0..1000).map(|_| TrackId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn track_id_from_string() {
        let id = TrackId::new("track-123");
        assert_eq!(id.as_str(), "track-123");
        assert_eq!(format!("{}", id), "track-123");
    }
}
