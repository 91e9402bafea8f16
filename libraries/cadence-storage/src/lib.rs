//! Cadence Storage
//!
//! Durable persistence for playlists, settings and playback state.
//!
//! # Architecture
//!
//! - [`KeyValueStore`]: JSON records by key ([`MemoryStore`], [`FileStore`])
//! - [`BlobStore`]: optional track bytes by id ([`MemoryBlobStore`], [`DirBlobStore`])
//! - [`PersistenceGateway`]: typed load/save on top of both, never failing the caller
//! - [`SaveThrottle`]: rate limit for position writes during playback
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{PlaylistRegistry, Settings, Theme};
//! use cadence_storage::{MemoryStore, PersistenceGateway};
//!
//! let mut gateway = PersistenceGateway::new(Box::new(MemoryStore::new()));
//! gateway.save_settings(&Settings { theme: Theme::Dark, ..Settings::default() });
//! assert_eq!(gateway.load_settings().theme, Theme::Dark);
//!
//! gateway.save_playlists(&PlaylistRegistry::default());
//! assert!(gateway.load_playlists().is_some());
//! ```

#![forbid(unsafe_code)]

mod blob;
mod error;
mod gateway;
mod kv;
pub mod records;
mod throttle;

pub use blob::{BlobStore, DirBlobStore, MemoryBlobStore};
pub use error::{Result, StorageError};
pub use gateway::{PersistenceGateway, PLAYBACK_KEY, PLAYLISTS_KEY, SETTINGS_KEY};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use records::{ExportDocument, ExportedTrack, EXPORT_FORMAT_VERSION};
pub use throttle::SaveThrottle;
