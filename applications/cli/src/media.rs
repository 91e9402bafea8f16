//! Media element for hosts without audio output

use cadence_playback::{LoadTicket, Locator, MediaElement, MediaEvent};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// Accepts every load and play, reporting outcomes as queued events
///
/// Nothing is decoded, so durations stay unknown and tracks only end when
/// the host says so.
#[derive(Debug, Default)]
pub struct HeadlessMedia {
    source: Option<Locator>,
    volume: f32,
    muted: bool,
    position: Duration,
    outbox: VecDeque<MediaEvent>,
}

impl HeadlessMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator currently loaded
    pub fn source(&self) -> Option<&Locator> {
        self.source.as_ref()
    }

    /// Last seek target
    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Outcomes not yet delivered to the controller
    pub fn take_events(&mut self) -> Vec<MediaEvent> {
        self.outbox.drain(..).collect()
    }
}

impl MediaElement for HeadlessMedia {
    fn load(&mut self, ticket: LoadTicket, locator: &Locator) {
        debug!(ticket = %ticket, locator = %locator, "Headless load");
        self.source = Some(locator.clone());
        self.position = Duration::ZERO;
    }

    fn unload(&mut self) {
        self.source = None;
    }

    fn play(&mut self, ticket: LoadTicket) {
        if self.source.is_some() {
            self.outbox.push_back(MediaEvent::Playing { ticket });
        }
    }

    fn pause(&mut self) {}

    fn seek(&mut self, position: Duration) {
        self.position = position;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}
