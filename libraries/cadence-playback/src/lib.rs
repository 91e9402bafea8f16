//! Cadence - Playback Management
//!
//! Platform-agnostic playlist state and transport control for Cadence.
//!
//! This crate provides:
//! - Playback order (sequential and Fisher-Yates shuffle, repeat modes)
//! - Per-track locator cache with idempotent release
//! - Track store with named playlists
//! - Playback controller driving a host media element
//! - Typed commands and change notifications
//!
//! # Architecture
//!
//! `cadence-playback` is completely platform-agnostic:
//! - No dependency on an async runtime
//! - No dependency on cadence-storage (persistence)
//! - No decoding; the host media element plays locators
//!
//! Platform-specific pieces (media element, locator minting) are provided
//! via traits.
//!
//! # Example
//!
//! ```rust
//! use cadence_playback::{
//!     BlobUrlFactory, Command, Locator, LoadTicket, MediaElement, MediaEvent, ObjectUrlCache,
//!     PlaybackConfig, PlaybackController, TrackStore,
//! };
//! use cadence_core::SourceRef;
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct SilentMedia;
//!
//! impl MediaElement for SilentMedia {
//!     fn load(&mut self, _ticket: LoadTicket, _locator: &Locator) {}
//!     fn unload(&mut self) {}
//!     fn play(&mut self, _ticket: LoadTicket) {}
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _position: Duration) {}
//!     fn set_volume(&mut self, _volume: f32) {}
//!     fn set_muted(&mut self, _muted: bool) {}
//! }
//!
//! let store = TrackStore::new(ObjectUrlCache::new(Box::new(BlobUrlFactory::new("app"))));
//! let mut player = PlaybackController::new(SilentMedia, store, PlaybackConfig::default());
//!
//! player.dispatch(Command::AddFiles(vec![
//!     SourceRef::in_memory("One.mp3", Some("audio/mpeg"), vec![0u8; 8]),
//!     SourceRef::in_memory("Two.flac", None, vec![0u8; 8]),
//! ])).unwrap();
//! player.dispatch(Command::Play).unwrap();
//!
//! // The host reports the end of the first track
//! let ticket = player.active_ticket().unwrap();
//! player.handle_media_event(MediaEvent::Ended { ticket });
//!
//! assert_eq!(player.current_index(), Some(1));
//! assert!(player.is_playing());
//! ```

mod command;
mod controller;
mod error;
mod events;
mod locator;
mod media;
pub mod order;
mod store;
pub mod types;
mod volume;

// Public exports
pub use command::Command;
pub use controller::PlaybackController;
pub use error::{MediaErrorCode, PlayRejection};
pub use events::{ErrorKind, PlaybackEvent};
pub use locator::{BlobUrlFactory, Locator, LocatorFactory, ObjectUrlCache};
pub use media::{LoadTicket, MediaElement, MediaEvent};
pub use order::{EndAction, OrderEngine};
pub use store::{IntakeReport, TrackStore};
pub use types::{PlaybackConfig, PlayerState};
pub use volume::Volume;
