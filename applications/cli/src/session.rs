//! Player session: controller, persistence and the glue between them

use crate::config::CadenceConfig;
use crate::error::Result;
use crate::media::HeadlessMedia;
use cadence_core::{PlaylistRegistry, Settings, SourceRef, Theme};
use cadence_playback::{
    BlobUrlFactory, Command, IntakeReport, MediaEvent, ObjectUrlCache, PlaybackConfig,
    PlaybackController, PlaybackEvent, TrackStore,
};
use cadence_storage::{DirBlobStore, FileStore, PersistenceGateway, SaveThrottle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Origin used for minted locators
const LOCATOR_ORIGIN: &str = "cadence://local";

/// A running player with its durable state
pub struct Session {
    controller: PlaybackController<HeadlessMedia>,
    gateway: PersistenceGateway,
    throttle: SaveThrottle,
    settings: Settings,
    errors: Vec<String>,
}

impl Session {
    /// Open the stores under the configured data directory and restore state
    pub fn open(config: &CadenceConfig) -> Result<Self> {
        let data_dir = &config.storage.data_dir;
        let kv = FileStore::open(data_dir.join("state"))?;
        let gateway = if config.storage.blob_store {
            let blobs = DirBlobStore::open(data_dir.join("blobs"))?;
            PersistenceGateway::with_blob_store(Box::new(kv), Box::new(blobs))
        } else {
            PersistenceGateway::new(Box::new(kv))
        };
        debug!(data_dir = %data_dir.display(), blobs = config.storage.blob_store, "Opened storage");

        let playback = PlaybackConfig {
            skip_delay_ms: config.playback.skip_delay_ms,
            ..PlaybackConfig::default()
        };
        Ok(Self::new(gateway, playback, config.position_save_interval()))
    }

    /// Build a session around a gateway, restoring whatever it holds
    pub fn new(
        gateway: PersistenceGateway,
        playback: PlaybackConfig,
        save_interval: Duration,
    ) -> Self {
        let settings = gateway.load_settings();
        let registry = gateway.load_playlists().unwrap_or_default();
        let snapshot = gateway.load_playback_state();

        let locators = ObjectUrlCache::new(Box::new(BlobUrlFactory::new(LOCATOR_ORIGIN)));
        let store = TrackStore::with_registry(registry, locators);
        let playback = PlaybackConfig {
            volume: settings.volume,
            ..playback
        };
        let mut controller = PlaybackController::new(HeadlessMedia::new(), store, playback);
        controller.apply_settings(&settings);
        controller.restore(&snapshot);
        // Restoring only reproduces what is already stored
        controller.drain_events();
        controller.media_mut().take_events();

        info!(
            playlist = %controller.store().active_name(),
            tracks = controller.store().len(),
            "Session restored"
        );

        Self {
            controller,
            gateway,
            throttle: SaveThrottle::new(save_interval),
            settings,
            errors: Vec::new(),
        }
    }

    pub fn controller(&self) -> &PlaybackController<HeadlessMedia> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController<HeadlessMedia> {
        &mut self.controller
    }

    pub fn registry(&self) -> &PlaylistRegistry {
        self.controller.store().registry()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// User-visible error messages collected since the last call
    pub fn take_errors(&mut self) -> Vec<String> {
        std::mem::take(&mut self.errors)
    }

    /// Run a command and persist its effects
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<PlaybackEvent>> {
        self.controller.dispatch(command)?;
        Ok(self.pump())
    }

    /// Add files from disk to the active playlist
    pub fn add_paths(&mut self, paths: &[PathBuf]) -> IntakeReport {
        let sources = paths.iter().map(SourceRef::from_path).collect();
        let report = self.controller.add_files(sources);
        self.pump();
        report
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.settings.theme = theme;
        self.gateway.save_settings(&self.settings);
    }

    /// Serialize a playlist for export
    pub fn export(&self, name: &str) -> Result<Vec<u8>> {
        Ok(PersistenceGateway::export_playlist(self.registry(), name)?)
    }

    /// Import an export document; returns the name it was stored under
    pub fn import(&mut self, bytes: &[u8]) -> Result<String> {
        let playlist = PersistenceGateway::import_playlist(bytes)?;
        let name = self.controller.import_playlist(playlist);
        self.pump();
        Ok(name)
    }

    /// Play through the active playlist, ending each track as soon as it starts
    ///
    /// Returns the visited track indices, at most `limit` of them.
    pub fn simulate(&mut self, limit: usize) -> Result<Vec<usize>> {
        let mut visited = Vec::new();
        if limit == 0 || self.controller.store().is_empty() {
            return Ok(visited);
        }

        self.dispatch(Command::Play)?;
        while visited.len() < limit && self.controller.is_playing() {
            let (Some(index), Some(ticket)) =
                (self.controller.current_index(), self.controller.active_ticket())
            else {
                break;
            };
            visited.push(index);

            self.controller.handle_media_event(MediaEvent::Ended { ticket });
            let events = self.pump();
            if events.iter().any(|e| matches!(e, PlaybackEvent::PlaybackEnded)) {
                break;
            }
        }
        Ok(visited)
    }

    /// Deliver pending media outcomes and persist every change
    ///
    /// Scheduled skips fire immediately; a headless host has nothing to wait
    /// for.
    pub fn pump(&mut self) -> Vec<PlaybackEvent> {
        let mut seen = Vec::new();
        loop {
            let media_events = self.controller.media_mut().take_events();
            let idle = media_events.is_empty();
            for event in media_events {
                self.controller.handle_media_event(event);
            }

            let events = self.controller.drain_events();
            if idle && events.is_empty() {
                break;
            }
            for event in &events {
                match event {
                    PlaybackEvent::SkipScheduled { ticket, delay_ms } => {
                        debug!(ticket = %ticket, delay_ms, "Skipping without delay");
                        self.controller
                            .handle_media_event(MediaEvent::SkipTimerElapsed { ticket: *ticket });
                    }
                    PlaybackEvent::Error { message, .. } => self.errors.push(message.clone()),
                    _ => {}
                }
            }
            self.persist(&events, Instant::now());
            seen.extend(events);
        }
        seen
    }

    /// Save everything and release the player
    pub fn close(mut self) {
        self.pump();
        self.controller.sync_settings(&mut self.settings);
        self.gateway.save_settings(&self.settings);
        self.gateway.save_playlists(self.controller.store().registry());
        self.gateway.save_playback_state(&self.controller.snapshot());
        self.controller.shutdown();
        if self.gateway.is_degraded() {
            info!("Session closed without persistence");
        } else {
            debug!("Session closed");
        }
    }

    fn persist(&mut self, events: &[PlaybackEvent], now: Instant) {
        let playlists_changed = events.iter().any(|e| {
            matches!(
                e,
                PlaybackEvent::PlaylistChanged { .. }
                    | PlaybackEvent::ActivePlaylistChanged { .. }
                    | PlaybackEvent::PlaylistsChanged { .. }
                    | PlaybackEvent::DurationChanged { .. }
            )
        });
        let settings_changed = events.iter().any(|e| {
            matches!(
                e,
                PlaybackEvent::ModesChanged { .. } | PlaybackEvent::VolumeChanged { .. }
            )
        });
        let meaningful = events.iter().any(PlaybackEvent::is_meaningful);

        if playlists_changed {
            self.gateway.save_playlists(self.controller.store().registry());
        }
        if settings_changed {
            self.controller.sync_settings(&mut self.settings);
            self.gateway.save_settings(&self.settings);
        }
        if meaningful || (!events.is_empty() && self.throttle.should_flush(now)) {
            self.gateway.save_playback_state(&self.controller.snapshot());
            self.throttle.mark_flushed(now);
        }
    }
}
