//! Playable locators
//!
//! A locator is a temporary, revocable reference that lets the media element
//! address a track's bytes without copying them (a `blob:` URL in a browser).
//! `ObjectUrlCache` is the only place locators are created or revoked.

use cadence_core::{CadenceError, Result, SourceData, SourceRef, Track, TrackId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Revocable reference to a track's bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(String);

impl Locator {
    /// Wrap an existing locator string
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform hook that mints and revokes locators
pub trait LocatorFactory {
    /// Create a locator for a source
    fn create(&mut self, track_id: &TrackId, source: &SourceRef) -> Result<Locator>;

    /// Invalidate a locator previously returned by `create`
    fn revoke(&mut self, locator: &Locator);
}

/// Mints `blob:` style locators and tracks which are live
///
/// Path-backed sources are checked for existence so a moved or deleted file
/// surfaces as `SourceUnavailable` instead of a later decode failure.
#[derive(Debug, Default)]
pub struct BlobUrlFactory {
    origin: String,
    live: HashSet<Locator>,
}

impl BlobUrlFactory {
    /// Create a factory for an origin (e.g. `http://localhost:8080`)
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            live: HashSet::new(),
        }
    }

    /// Number of locators not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether a locator is still live
    pub fn is_live(&self, locator: &Locator) -> bool {
        self.live.contains(locator)
    }
}

impl LocatorFactory for BlobUrlFactory {
    fn create(&mut self, track_id: &TrackId, source: &SourceRef) -> Result<Locator> {
        if let SourceData::Path(path) = source.data() {
            if !path.is_file() {
                warn!(track = %track_id, path = %path.display(), "Source file is missing");
                return Err(CadenceError::SourceUnavailable(track_id.clone()));
            }
        }

        let locator = Locator(format!("blob:{}/{}", self.origin, Uuid::new_v4()));
        self.live.insert(locator.clone());
        Ok(locator)
    }

    fn revoke(&mut self, locator: &Locator) {
        self.live.remove(locator);
    }
}

/// Per-track locator cache
///
/// Guarantees at most one live locator per track and idempotent release.
/// Matching every acquire with a release is the owner's job; the cache
/// releases whatever is left when dropped.
pub struct ObjectUrlCache {
    factory: Box<dyn LocatorFactory>,
    entries: HashMap<TrackId, Locator>,
}

impl fmt::Debug for ObjectUrlCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrlCache")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl ObjectUrlCache {
    /// Create a cache backed by a factory
    pub fn new(factory: Box<dyn LocatorFactory>) -> Self {
        Self {
            factory,
            entries: HashMap::new(),
        }
    }

    /// Get the track's locator, creating it on first use
    ///
    /// Fails with `SourceUnavailable` for metadata-only tracks.
    pub fn acquire(&mut self, track: &Track) -> Result<Locator> {
        if let Some(locator) = self.entries.get(&track.id) {
            return Ok(locator.clone());
        }

        let Some(source) = &track.source else {
            return Err(CadenceError::SourceUnavailable(track.id.clone()));
        };

        let locator = self.factory.create(&track.id, source)?;
        debug!(track = %track.id, locator = %locator, "Created locator");
        self.entries.insert(track.id.clone(), locator.clone());
        Ok(locator)
    }

    /// Revoke the track's locator, if any
    pub fn release(&mut self, track_id: &TrackId) {
        if let Some(locator) = self.entries.remove(track_id) {
            debug!(track = %track_id, locator = %locator, "Revoked locator");
            self.factory.revoke(&locator);
        }
    }

    /// Revoke every locator
    pub fn release_all(&mut self) {
        for (_, locator) in self.entries.drain() {
            self.factory.revoke(&locator);
        }
    }

    /// Current locator for a track, without creating one
    pub fn get(&self, track_id: &TrackId) -> Option<&Locator> {
        self.entries.get(track_id)
    }

    /// Number of live locators
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no locator is live
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for ObjectUrlCache {
    fn drop(&mut self) {
        self.release_all();
    }
}
