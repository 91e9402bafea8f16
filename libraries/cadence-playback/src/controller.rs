//! Playback controller - core orchestration
//!
//! Owns the track store, order engine and the media element, and is the only
//! component that touches the media element. Every user intent goes through
//! a method here (or `dispatch`), and every asynchronous media outcome comes
//! back through `handle_media_event`.

use crate::{
    command::Command,
    events::{ErrorKind, PlaybackEvent},
    media::{LoadTicket, MediaElement, MediaEvent},
    order::{EndAction, OrderEngine},
    store::{IntakeReport, TrackStore},
    types::{PlaybackConfig, PlayerState},
    volume::Volume,
};
use cadence_core::{
    CadenceError, PlaybackSnapshot, Playlist, PlaylistRegistry, RepeatMode, Result, Settings,
    SourceRef, Track, TrackId,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Why the current track was loaded
///
/// Decides whether a failure may trigger the one-shot automatic skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadOrigin {
    /// Explicit user action
    Manual,

    /// Startup restore; failures are only logged
    Restore,

    /// Previous track ended with autoplay on
    AutoAdvance,

    /// Skipping past an unplayable track
    AutoSkip,
}

/// Mediates order decisions against the media element
pub struct PlaybackController<M: MediaElement> {
    media: M,
    store: TrackStore,
    order: OrderEngine,
    volume: Volume,
    repeat: RepeatMode,
    autoplay_next: bool,

    current_index: Option<usize>,
    is_playing: bool,
    position: Duration,
    duration: Option<Duration>,

    // Load bookkeeping
    ticket_seq: u64,
    active_ticket: Option<LoadTicket>,
    load_origin: LoadOrigin,
    loaded: bool,
    pending_seek: Option<Duration>,
    pending_skip: Option<LoadTicket>,
    skip_delay: Duration,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl<M: MediaElement> PlaybackController<M> {
    /// Create a controller
    pub fn new(mut media: M, store: TrackStore, config: PlaybackConfig) -> Self {
        let volume = Volume::new(config.volume);
        media.set_volume(volume.level());
        media.set_muted(volume.is_muted());

        let mut order = OrderEngine::new(config.shuffle_seed);
        order.tracks_changed(store.len());

        Self {
            media,
            store,
            order,
            volume,
            repeat: RepeatMode::Off,
            autoplay_next: true,
            current_index: None,
            is_playing: false,
            position: Duration::ZERO,
            duration: None,
            ticket_seq: 0,
            active_ticket: None,
            load_origin: LoadOrigin::Manual,
            loaded: false,
            pending_seek: None,
            pending_skip: None,
            skip_delay: config.skip_delay(),
            pending_events: Vec::new(),
        }
    }

    // ===== Queries =====

    /// Read-only view of the player state
    pub fn state(&self) -> PlayerState {
        PlayerState {
            active_playlist_name: self.store.active_name().to_string(),
            current_track_index: self.current_index,
            is_playing: self.is_playing,
            is_muted: self.volume.is_muted(),
            volume: self.volume.level(),
            shuffle_enabled: self.order.is_shuffled(),
            repeat_mode: self.repeat,
            order_permutation: self.order.permutation().to_vec(),
        }
    }

    /// Restorable snapshot of the current position
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            active_playlist: self.store.active_name().to_string(),
            current_track_index: self.current_index,
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            position_secs: self.position.as_secs_f64(),
        }
    }

    /// Copy the controller-owned settings into a settings record
    pub fn sync_settings(&self, settings: &mut Settings) {
        settings.autoplay_next = self.autoplay_next;
        settings.volume = self.volume.level();
        settings.repeat_mode = self.repeat;
        settings.shuffle = self.order.is_shuffled();
    }

    pub fn store(&self) -> &TrackStore {
        &self.store
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Currently selected track
    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|index| self.store.track(index))
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Last reported playhead position
    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn is_shuffled(&self) -> bool {
        self.order.is_shuffled()
    }

    pub fn autoplay_next(&self) -> bool {
        self.autoplay_next
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Ticket of the current load, if any
    pub fn active_ticket(&self) -> Option<LoadTicket> {
        self.active_ticket
    }

    /// Take the change notifications recorded so far
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.absorb_store_events();
        std::mem::take(&mut self.pending_events)
    }

    // ===== Setup =====

    /// Apply persisted settings (volume, modes, autoplay)
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume.set_level(settings.volume);
        self.sync_media_volume();
        self.repeat = settings.repeat_mode;
        self.autoplay_next = settings.autoplay_next;
        self.order.set_shuffle(settings.shuffle, self.store.len());
        self.emit_volume_changed();
        self.emit_modes_changed();
    }

    /// Replace every playlist (startup load)
    pub fn replace_registry(&mut self, registry: PlaylistRegistry) {
        self.stop_and_unload();
        self.store.replace_registry(registry);
        self.absorb_store_events();
        self.order.tracks_changed(self.store.len());
    }

    /// Restore a saved position without starting playback
    pub fn restore(&mut self, snapshot: &PlaybackSnapshot) {
        if !snapshot.active_playlist.is_empty()
            && snapshot.active_playlist != self.store.active_name()
        {
            if let Err(err) = self.switch_playlist(&snapshot.active_playlist) {
                warn!(
                    playlist = %snapshot.active_playlist,
                    "Could not restore active playlist: {}", err
                );
            }
        }

        self.volume.set_level(snapshot.volume);
        if snapshot.muted {
            self.volume.mute();
        }
        self.sync_media_volume();
        self.emit_volume_changed();

        let Some(index) = snapshot.current_track_index else {
            return;
        };
        if index >= self.store.len() {
            debug!(index, "Saved track index no longer exists");
            return;
        }

        if self.load_index(index, LoadOrigin::Restore).is_ok() {
            let position = Duration::try_from_secs_f64(snapshot.position_secs).unwrap_or_default();
            if !position.is_zero() {
                self.pending_seek = Some(position);
                self.position = position;
            }
            info!(index, position_secs = snapshot.position_secs, "Restored playback position");
        }
    }

    // ===== Commands =====

    /// Handle a typed user intent
    pub fn dispatch(&mut self, command: Command) -> Result<()> {
        debug!(command = command.name(), "Dispatching command");
        match command {
            Command::Play => self.play(),
            Command::Pause => {
                self.pause();
                Ok(())
            }
            Command::TogglePlayPause => self.toggle_play_pause(),
            Command::Next => self.next(),
            Command::Previous => self.previous(),
            Command::Select(index) => self.select(index),
            Command::Load(index) => self.load_track(index),
            Command::Seek(fraction) => self.seek_to(fraction),
            Command::SetVolume(volume) => {
                self.set_volume(volume);
                Ok(())
            }
            Command::ToggleMute => {
                self.toggle_mute();
                Ok(())
            }
            Command::ToggleShuffle => {
                self.toggle_shuffle();
                Ok(())
            }
            Command::CycleRepeat => {
                self.cycle_repeat();
                Ok(())
            }
            Command::SetRepeat(mode) => {
                self.set_repeat(mode);
                Ok(())
            }
            Command::SetAutoplayNext(enabled) => {
                self.set_autoplay_next(enabled);
                Ok(())
            }
            Command::AddFiles(sources) => {
                self.add_files(sources);
                Ok(())
            }
            Command::Remove(index) => {
                self.remove_track(index);
                Ok(())
            }
            Command::Clear => {
                self.clear_playlist();
                Ok(())
            }
            Command::CreatePlaylist(name) => self.create_playlist(&name),
            Command::RenamePlaylist { from, to } => self.rename_playlist(&from, &to),
            Command::DeletePlaylist(name) => self.delete_playlist(&name),
            Command::SwitchPlaylist(name) => self.switch_playlist(&name),
        }
    }

    // ===== Playback Control =====

    /// Load a track without starting it
    pub fn load_track(&mut self, index: usize) -> Result<()> {
        self.load_index(index, LoadOrigin::Manual)?;
        self.set_playing(false);
        Ok(())
    }

    /// Load a track and start it
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.load_index(index, LoadOrigin::Manual)?;
        self.start_current();
        Ok(())
    }

    /// Start or resume playback
    ///
    /// With nothing selected, starts at the head of the current order.
    pub fn play(&mut self) -> Result<()> {
        if self.store.is_empty() {
            self.emit_error(ErrorKind::LoadFailed, "The playlist has no tracks.");
            return Err(CadenceError::invalid_input("playlist is empty"));
        }

        let index = match self.current_index {
            Some(index) => index,
            None => self
                .order
                .next(None, self.store.len())
                .ok_or(CadenceError::IndexOutOfBounds(0))?,
        };

        if !self.loaded || self.current_index != Some(index) {
            self.load_index(index, LoadOrigin::Manual)?;
        }
        self.load_origin = LoadOrigin::Manual;
        self.start_current();
        Ok(())
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.media.pause();
        self.set_playing(false);
    }

    /// Toggle between playing and paused
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.is_playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Skip to next track in the current order
    ///
    /// Keeps playing if playback was running. No-op on an empty playlist.
    pub fn next(&mut self) -> Result<()> {
        let target = self.order.next(self.current_index, self.store.len());
        self.skip_to(target)
    }

    /// Go to the previous track in the current order
    pub fn previous(&mut self) -> Result<()> {
        let target = self.order.previous(self.current_index, self.store.len());
        self.skip_to(target)
    }

    /// Seek to a fraction of the current track
    ///
    /// Ignored while the duration is unknown.
    pub fn seek_to(&mut self, fraction: f32) -> Result<()> {
        if !fraction.is_finite() {
            return Err(CadenceError::invalid_input("seek fraction must be finite"));
        }
        if !self.loaded {
            return Ok(());
        }
        let Some(duration) = self.current_duration() else {
            debug!("Seek ignored, duration unknown");
            return Ok(());
        };

        let position = duration.mul_f32(fraction.clamp(0.0, 1.0));
        self.media.seek(position);
        self.position = position;
        self.emit_position_changed();
        Ok(())
    }

    // ===== Volume =====

    /// Set volume in [0, 1]; 0 mutes, anything else unmutes
    pub fn set_volume(&mut self, volume: f32) {
        self.volume.set_level(volume);
        self.sync_media_volume();
        self.emit_volume_changed();
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.sync_media_volume();
        self.emit_volume_changed();
    }

    // ===== Modes =====

    /// Enable or disable shuffle
    pub fn set_shuffle(&mut self, enabled: bool) {
        self.order.set_shuffle(enabled, self.store.len());
        self.emit_modes_changed();
    }

    pub fn toggle_shuffle(&mut self) {
        self.set_shuffle(!self.order.is_shuffled());
    }

    /// Advance the repeat mode one step in its cycle
    pub fn cycle_repeat(&mut self) {
        self.set_repeat(self.repeat.next());
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
        self.emit_modes_changed();
    }

    pub fn set_autoplay_next(&mut self, enabled: bool) {
        self.autoplay_next = enabled;
        self.emit_modes_changed();
    }

    // ===== Tracks =====

    /// Validate and append files to the active playlist
    ///
    /// A file named like a metadata-only track of the playlist is attached to
    /// that track instead of being appended.
    /// Selects the first track (without playing) when nothing was selected.
    pub fn add_files(&mut self, sources: Vec<SourceRef>) -> IntakeReport {
        let report = self.store.add_files(sources);
        self.absorb_store_events();
        self.order.tracks_changed(self.store.len());

        for rejected in &report.rejected {
            self.emit_error(ErrorKind::UnsupportedFormat, rejected.to_string());
        }

        if report.changed() && self.current_index.is_none() && !self.is_playing {
            if let Err(err) = self.load_track(0) {
                debug!("First track could not be loaded: {}", err);
            }
        }
        report
    }

    /// Record a probed duration for a track
    pub fn update_duration(&mut self, track_id: &TrackId, seconds: f64) -> bool {
        let updated = self.store.update_duration(track_id, seconds);
        self.absorb_store_events();
        updated
    }

    /// Remove a track and re-home playback
    ///
    /// Removing the current track loads the track that slid into its slot
    /// (wrapping to the start) and keeps playing if playback was running.
    pub fn remove_track(&mut self, index: usize) -> Option<Track> {
        let removed = self.store.remove(index)?;
        self.absorb_store_events();

        let len = self.store.len();
        self.order.tracks_changed(len);

        match self.current_index {
            _ if len == 0 => self.stop_and_unload(),
            Some(current) if current == index => {
                let was_playing = self.is_playing;
                if self.load_index(index % len, LoadOrigin::Manual).is_ok() && was_playing {
                    self.start_current();
                }
            }
            Some(current) if index < current => {
                self.current_index = Some(current - 1);
                self.emit_track_changed();
            }
            _ => {}
        }
        Some(removed)
    }

    /// Remove every track from the active playlist and stop
    pub fn clear_playlist(&mut self) {
        self.stop_and_unload();
        let removed = self.store.clear();
        self.absorb_store_events();
        self.order.tracks_changed(0);
        info!(removed, "Playlist cleared");
    }

    // ===== Playlists =====

    pub fn create_playlist(&mut self, name: &str) -> Result<()> {
        self.store.create_playlist(name)?;
        self.absorb_store_events();
        Ok(())
    }

    pub fn rename_playlist(&mut self, from: &str, to: &str) -> Result<()> {
        self.store.rename_playlist(from, to)?;
        self.absorb_store_events();
        Ok(())
    }

    /// Delete a playlist
    ///
    /// Deleting the active playlist stops playback and activates the first
    /// remaining playlist.
    pub fn delete_playlist(&mut self, name: &str) -> Result<()> {
        let was_active = self.store.active_name() == name;
        if was_active && self.store.registry().len() > 1 {
            self.stop_and_unload();
        }

        self.store.delete_playlist(name)?;
        self.absorb_store_events();

        if was_active {
            self.order.tracks_changed(self.store.len());
            self.emit(PlaybackEvent::ActivePlaylistChanged {
                name: self.store.active_name().to_string(),
                length: self.store.len(),
            });
        }
        Ok(())
    }

    /// Make another playlist active
    ///
    /// Stops playback, releases the current playlist's locators and clears
    /// the selection.
    pub fn switch_playlist(&mut self, name: &str) -> Result<()> {
        if !self.store.registry().contains(name) {
            return Err(CadenceError::PlaylistNotFound(name.to_string()));
        }

        self.stop_and_unload();
        self.store.switch_active(name)?;
        self.absorb_store_events();
        self.order.tracks_changed(self.store.len());
        info!(playlist = %name, tracks = self.store.len(), "Switched playlist");
        Ok(())
    }

    /// Add an imported playlist; returns the name it was stored under
    pub fn import_playlist(&mut self, playlist: Playlist) -> String {
        let name = self.store.adopt_playlist(playlist);
        self.absorb_store_events();
        name
    }

    /// Stop playback and release every locator
    pub fn shutdown(&mut self) {
        self.stop_and_unload();
        self.store.release_all();
    }

    // ===== Media Events =====

    /// Apply an asynchronous outcome reported by the media element
    ///
    /// Events from a superseded load are ignored.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        let ticket = event.ticket();
        if self.active_ticket != Some(ticket) {
            debug!(ticket = %ticket, "Ignoring stale media event");
            return;
        }

        match event {
            MediaEvent::MetadataLoaded { duration, .. } => self.on_metadata_loaded(duration),
            MediaEvent::Playing { .. } => self.set_playing(true),
            MediaEvent::PlayRejected { cause, .. } => {
                warn!(ticket = %ticket, "Play rejected: {}", cause);
                self.report_failure(
                    ErrorKind::PlaybackRejected,
                    cause.to_string(),
                    cause.is_track_specific(),
                );
            }
            MediaEvent::Paused { .. } => self.set_playing(false),
            MediaEvent::TimeUpdate { position, .. } => {
                self.position = position;
                self.emit_position_changed();
            }
            MediaEvent::Ended { .. } => self.on_track_end(),
            MediaEvent::Failed { code, .. } => {
                warn!(ticket = %ticket, "Media error: {}", code);
                self.media.pause();
                self.report_failure(ErrorKind::LoadFailed, code.to_string(), true);
            }
            MediaEvent::SkipTimerElapsed { .. } => self.on_skip_timer(ticket),
        }
    }

    fn on_metadata_loaded(&mut self, duration: Duration) {
        self.duration = Some(duration);
        if let Some(track_id) = self.current_track().map(|t| t.id.clone()) {
            self.store.update_duration(&track_id, duration.as_secs_f64());
            self.absorb_store_events();
        }

        if let Some(position) = self.pending_seek.take() {
            if position < duration {
                self.media.seek(position);
                self.position = position;
            } else {
                self.position = Duration::ZERO;
            }
        }
        self.emit_position_changed();
    }

    fn on_track_end(&mut self) {
        let Some(current) = self.current_index else {
            return;
        };
        if let Some(track_id) = self.current_track().map(|t| t.id.clone()) {
            self.emit(PlaybackEvent::TrackFinished { track_id });
        }

        let len = self.store.len();
        match self.order.on_track_end(self.repeat, current, len) {
            EndAction::ReplayCurrent => {
                self.media.seek(Duration::ZERO);
                self.position = Duration::ZERO;
                self.start_current();
            }
            EndAction::Advance => {
                let Some(next) = self.order.next(Some(current), len) else {
                    return;
                };
                if self.autoplay_next {
                    if self.load_index(next, LoadOrigin::AutoAdvance).is_ok() {
                        self.start_current();
                    }
                } else {
                    if let Err(err) = self.load_index(next, LoadOrigin::Manual) {
                        debug!("Next track could not be loaded: {}", err);
                    }
                    self.set_playing(false);
                }
            }
            EndAction::Stop => {
                self.media.pause();
                self.set_playing(false);
                self.emit(PlaybackEvent::PlaybackEnded);
            }
        }
    }

    fn on_skip_timer(&mut self, ticket: LoadTicket) {
        if self.pending_skip != Some(ticket) {
            return;
        }
        self.pending_skip = None;

        let Some(next) = self.order.next(self.current_index, self.store.len()) else {
            return;
        };
        info!(from = ?self.current_index, to = next, "Skipping unplayable track");
        if self.load_index(next, LoadOrigin::AutoSkip).is_ok() {
            self.start_current();
        }
    }

    // ===== Internals =====

    /// Point the media element at a track
    ///
    /// Issues a fresh ticket, so every result of earlier loads becomes stale.
    fn load_index(&mut self, index: usize, origin: LoadOrigin) -> Result<()> {
        let track_id = self
            .store
            .track(index)
            .map(|t| t.id.clone())
            .ok_or(CadenceError::IndexOutOfBounds(index))?;

        let ticket = self.next_ticket();
        self.active_ticket = Some(ticket);
        self.load_origin = origin;
        self.current_index = Some(index);
        self.position = Duration::ZERO;
        self.duration = self.known_duration(index);
        self.pending_seek = None;
        self.pending_skip = None;
        self.emit_track_changed();

        match self.store.acquire(index) {
            Ok(locator) => {
                debug!(index, track = %track_id, ticket = %ticket, "Loading track");
                self.media.load(ticket, &locator);
                self.loaded = true;
                Ok(())
            }
            Err(err) => {
                self.media.unload();
                self.loaded = false;
                let kind = match err {
                    CadenceError::SourceUnavailable(_) => ErrorKind::SourceUnavailable,
                    _ => ErrorKind::LoadFailed,
                };
                self.report_failure(kind, err.to_string(), true);
                Err(err)
            }
        }
    }

    fn skip_to(&mut self, target: Option<usize>) -> Result<()> {
        let Some(index) = target else {
            return Ok(());
        };
        let was_playing = self.is_playing;
        self.load_index(index, LoadOrigin::Manual)?;
        if was_playing {
            self.start_current();
        }
        Ok(())
    }

    fn start_current(&mut self) {
        if !self.loaded {
            return;
        }
        if let Some(ticket) = self.active_ticket {
            self.media.play(ticket);
            self.set_playing(true);
        }
    }

    /// Stop, surface the error and maybe schedule the one-shot skip
    ///
    /// Only a track reached by autoplay may be skipped, and the track reached
    /// by that skip is never skipped again, so a playlist of unplayable files
    /// cannot loop.
    fn report_failure(&mut self, kind: ErrorKind, message: String, track_specific: bool) {
        self.set_playing(false);

        if self.load_origin == LoadOrigin::Restore {
            warn!("Restored track is not playable: {}", message);
            return;
        }
        self.emit_error(kind, message);

        if track_specific && self.load_origin == LoadOrigin::AutoAdvance && self.store.len() > 1 {
            if let Some(ticket) = self.active_ticket {
                self.pending_skip = Some(ticket);
                let delay_ms = u64::try_from(self.skip_delay.as_millis()).unwrap_or(u64::MAX);
                self.emit(PlaybackEvent::SkipScheduled { ticket, delay_ms });
            }
        }
    }

    fn stop_and_unload(&mut self) {
        self.media.pause();
        self.media.unload();
        self.active_ticket = None;
        self.loaded = false;
        self.pending_seek = None;
        self.pending_skip = None;
        self.position = Duration::ZERO;
        self.duration = None;
        self.set_playing(false);
        if self.current_index.take().is_some() {
            self.emit_track_changed();
        }
    }

    fn next_ticket(&mut self) -> LoadTicket {
        self.ticket_seq += 1;
        LoadTicket::new(self.ticket_seq)
    }

    fn known_duration(&self, index: usize) -> Option<Duration> {
        self.store
            .track(index)
            .filter(|t| t.duration_secs > 0.0)
            .and_then(|t| Duration::try_from_secs_f64(t.duration_secs).ok())
    }

    fn current_duration(&self) -> Option<Duration> {
        self.duration
            .filter(|d| !d.is_zero())
            .or_else(|| self.current_index.and_then(|i| self.known_duration(i)))
    }

    fn sync_media_volume(&mut self) {
        self.media.set_volume(self.volume.level());
        self.media.set_muted(self.volume.is_muted());
    }

    fn set_playing(&mut self, playing: bool) {
        if self.is_playing != playing {
            self.is_playing = playing;
            self.emit(PlaybackEvent::StateChanged {
                is_playing: playing,
            });
        }
    }

    fn absorb_store_events(&mut self) {
        let events = self.store.drain_events();
        self.pending_events.extend(events);
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }

    fn emit_error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.emit(PlaybackEvent::Error {
            kind,
            message: message.into(),
        });
    }

    fn emit_track_changed(&mut self) {
        let track_id = self.current_track().map(|t| t.id.clone());
        self.emit(PlaybackEvent::TrackChanged {
            index: self.current_index,
            track_id,
        });
    }

    fn emit_volume_changed(&mut self) {
        self.emit(PlaybackEvent::VolumeChanged {
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
        });
    }

    fn emit_modes_changed(&mut self) {
        self.emit(PlaybackEvent::ModesChanged {
            shuffle: self.order.is_shuffled(),
            repeat: self.repeat,
            autoplay_next: self.autoplay_next,
        });
    }

    fn emit_position_changed(&mut self) {
        let duration_ms = self
            .current_duration()
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        let position_ms = u64::try_from(self.position.as_millis()).unwrap_or(u64::MAX);
        self.emit(PlaybackEvent::PositionChanged {
            position_ms,
            duration_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MediaErrorCode, PlayRejection};
    use crate::locator::{BlobUrlFactory, Locator, ObjectUrlCache};

    /// Records every call the controller makes
    #[derive(Debug, Default)]
    struct RecordingMedia {
        loads: Vec<(LoadTicket, Locator)>,
        plays: Vec<LoadTicket>,
        seeks: Vec<Duration>,
        pauses: usize,
        volume: f32,
        muted: bool,
    }

    impl MediaElement for RecordingMedia {
        fn load(&mut self, ticket: LoadTicket, locator: &Locator) {
            self.loads.push((ticket, locator.clone()));
        }
        fn unload(&mut self) {}
        fn play(&mut self, ticket: LoadTicket) {
            self.plays.push(ticket);
        }
        fn pause(&mut self) {
            self.pauses += 1;
        }
        fn seek(&mut self, position: Duration) {
            self.seeks.push(position);
        }
        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }
        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
    }

    fn controller_with(names: &[&str]) -> PlaybackController<RecordingMedia> {
        let store = TrackStore::new(ObjectUrlCache::new(Box::new(BlobUrlFactory::new("test"))));
        let mut controller = PlaybackController::new(
            RecordingMedia::default(),
            store,
            PlaybackConfig {
                shuffle_seed: Some(5),
                ..PlaybackConfig::default()
            },
        );
        let sources = names
            .iter()
            .map(|name| SourceRef::in_memory(*name, Some("audio/mpeg"), vec![0u8; 4]))
            .collect();
        controller.add_files(sources);
        controller.drain_events();
        controller
    }

    fn ticket(controller: &PlaybackController<RecordingMedia>) -> LoadTicket {
        controller.active_ticket().unwrap()
    }

    #[test]
    fn intake_selects_first_track_without_playing() {
        let controller = controller_with(&["A.mp3", "B.mp3"]);
        assert_eq!(controller.current_index(), Some(0));
        assert!(!controller.is_playing());
        assert!(controller.media().plays.is_empty());
        assert_eq!(controller.media().loads.len(), 1);
    }

    #[test]
    fn play_on_empty_playlist_fails() {
        let mut controller = controller_with(&[]);
        assert!(matches!(controller.play(), Err(CadenceError::InvalidInput(_))));
        assert!(!controller.is_playing());
    }

    #[test]
    fn next_keeps_playing_state() {
        let mut controller = controller_with(&["A.mp3", "B.mp3", "C.mp3"]);
        controller.play().unwrap();
        controller.next().unwrap();
        assert_eq!(controller.current_index(), Some(1));
        assert!(controller.is_playing());
        assert_eq!(controller.media().plays.len(), 2);

        controller.pause();
        controller.previous().unwrap();
        assert_eq!(controller.current_index(), Some(0));
        assert!(!controller.is_playing());
    }

    #[test]
    fn repeat_one_replays_current() {
        let mut controller = controller_with(&["A.mp3", "B.mp3"]);
        controller.set_repeat(RepeatMode::One);
        controller.play().unwrap();
        let t = ticket(&controller);

        controller.handle_media_event(MediaEvent::Ended { ticket: t });
        assert_eq!(controller.current_index(), Some(0));
        assert_eq!(controller.media().seeks.last(), Some(&Duration::ZERO));
        assert!(controller.is_playing());
    }

    #[test]
    fn last_track_stops_without_repeat() {
        let mut controller = controller_with(&["A.mp3", "B.mp3"]);
        controller.select(1).unwrap();
        let t = ticket(&controller);
        controller.drain_events();

        controller.handle_media_event(MediaEvent::Ended { ticket: t });
        assert!(!controller.is_playing());
        assert_eq!(controller.current_index(), Some(1));
        assert!(controller
            .drain_events()
            .contains(&PlaybackEvent::PlaybackEnded));
    }

    #[test]
    fn autoplay_off_loads_next_without_playing() {
        let mut controller = controller_with(&["A.mp3", "B.mp3"]);
        controller.set_autoplay_next(false);
        controller.play().unwrap();
        let t = ticket(&controller);

        controller.handle_media_event(MediaEvent::Ended { ticket: t });
        assert_eq!(controller.current_index(), Some(1));
        assert!(!controller.is_playing());
        assert_eq!(controller.media().plays.len(), 1);
    }

    #[test]
    fn not_allowed_rejection_is_not_retried() {
        let mut controller = controller_with(&["A.mp3", "B.mp3"]);
        controller.play().unwrap();
        let t = ticket(&controller);
        controller.drain_events();

        controller.handle_media_event(MediaEvent::PlayRejected {
            ticket: t,
            cause: PlayRejection::NotAllowed,
        });

        assert!(!controller.is_playing());
        assert_eq!(controller.media().plays.len(), 1);
        let events = controller.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            PlaybackEvent::Error { kind: ErrorKind::PlaybackRejected, message }
                if message.contains("Press play")
        )));
        assert!(!events
            .iter()
            .any(|e| matches!(e, PlaybackEvent::SkipScheduled { .. })));
    }

    #[test]
    fn metadata_applies_restored_position() {
        let mut controller = controller_with(&["A.mp3", "B.mp3"]);
        let active_playlist = controller.store().active_name().to_string();
        controller.restore(&PlaybackSnapshot {
            active_playlist,
            current_track_index: Some(1),
            volume: 0.4,
            muted: false,
            position_secs: 42.0,
        });
        assert_eq!(controller.current_index(), Some(1));
        assert!(!controller.is_playing());
        assert!(controller.media().plays.is_empty());

        let t = ticket(&controller);
        controller.handle_media_event(MediaEvent::MetadataLoaded {
            ticket: t,
            duration: Duration::from_secs(200),
        });
        assert_eq!(controller.media().seeks, vec![Duration::from_secs(42)]);
        assert_eq!(controller.store().tracks()[1].duration_secs, 200.0);
        assert_eq!(controller.volume().level(), 0.4);
    }

    #[test]
    fn seek_uses_fraction_of_duration() {
        let mut controller = controller_with(&["A.mp3"]);
        let t = ticket(&controller);
        controller.seek_to(0.5).unwrap();
        assert!(controller.media().seeks.is_empty());

        controller.handle_media_event(MediaEvent::MetadataLoaded {
            ticket: t,
            duration: Duration::from_secs(100),
        });
        controller.seek_to(0.25).unwrap();
        assert_eq!(controller.media().seeks, vec![Duration::from_secs(25)]);
        assert!(controller.seek_to(f32::NAN).is_err());
    }

    #[test]
    fn volume_zero_mutes() {
        let mut controller = controller_with(&["A.mp3"]);
        controller.set_volume(0.0);
        assert!(controller.state().is_muted);
        assert!(controller.media().muted);

        controller.set_volume(0.5);
        assert!(!controller.state().is_muted);
        assert_eq!(controller.media().volume, 0.5);
    }

    #[test]
    fn removing_earlier_track_shifts_index() {
        let mut controller = controller_with(&["A.mp3", "B.mp3", "C.mp3"]);
        controller.select(2).unwrap();
        controller.remove_track(0);
        assert_eq!(controller.current_index(), Some(1));
        assert_eq!(controller.current_track().unwrap().title, "C");
        assert!(controller.is_playing());
    }

    #[test]
    fn removing_current_track_rehomes_and_keeps_playing() {
        let mut controller = controller_with(&["A.mp3", "B.mp3", "C.mp3"]);
        controller.select(2).unwrap();
        controller.remove_track(2);
        assert_eq!(controller.current_index(), Some(0));
        assert!(controller.is_playing());
    }

    #[test]
    fn clear_stops_and_resets() {
        let mut controller = controller_with(&["A.mp3", "B.mp3"]);
        controller.play().unwrap();
        controller.clear_playlist();
        let state = controller.state();
        assert_eq!(state.current_track_index, None);
        assert!(!state.is_playing);
        assert!(state.order_permutation.is_empty());
        assert_eq!(controller.store().live_locators(), 0);
    }

    #[test]
    fn stale_failure_after_newer_load_is_ignored() {
        let mut controller = controller_with(&["A.mp3", "B.mp3"]);
        controller.play().unwrap();
        let old = ticket(&controller);
        controller.next().unwrap();

        controller.handle_media_event(MediaEvent::Failed {
            ticket: old,
            code: MediaErrorCode::Decode,
        });
        assert!(controller.is_playing());
        assert_eq!(controller.current_index(), Some(1));
    }
}
