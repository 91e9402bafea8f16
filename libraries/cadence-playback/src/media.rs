//! Media element seam
//!
//! The host owns decoding and output. The controller drives it through
//! `MediaElement` and receives the outcome of every asynchronous operation as
//! a `MediaEvent`, tagged with the ticket of the load that caused it.

use crate::error::{MediaErrorCode, PlayRejection};
use crate::locator::Locator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifies one `load` call
///
/// Results carrying a ticket other than the controller's current one belong
/// to a superseded load and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Create a ticket from a raw sequence number
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw sequence number
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The single playable media primitive
///
/// Implementations must not call back into the controller; outcomes are
/// reported later through `PlaybackController::handle_media_event`.
pub trait MediaElement {
    /// Replace the current source
    fn load(&mut self, ticket: LoadTicket, locator: &Locator);

    /// Drop the current source
    fn unload(&mut self);

    /// Start playback of the loaded source
    ///
    /// Resolves later as `Playing` or `PlayRejected`.
    fn play(&mut self, ticket: LoadTicket);

    /// Pause playback
    fn pause(&mut self);

    /// Move the playhead
    fn seek(&mut self, position: Duration);

    /// Set output volume in [0, 1]
    fn set_volume(&mut self, volume: f32);

    /// Mute or unmute output
    fn set_muted(&mut self, muted: bool);
}

/// Asynchronous outcome reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaEvent {
    /// Source metadata is known
    MetadataLoaded { ticket: LoadTicket, duration: Duration },

    /// Playback started
    Playing { ticket: LoadTicket },

    /// `play` was refused
    PlayRejected {
        ticket: LoadTicket,
        cause: PlayRejection,
    },

    /// Playback paused by the host (e.g. OS media controls)
    Paused { ticket: LoadTicket },

    /// Playhead moved during playback
    TimeUpdate { ticket: LoadTicket, position: Duration },

    /// Track reached its end
    Ended { ticket: LoadTicket },

    /// Loading or decoding failed
    Failed {
        ticket: LoadTicket,
        code: MediaErrorCode,
    },

    /// Host timer fired after a scheduled skip delay
    SkipTimerElapsed { ticket: LoadTicket },
}

impl MediaEvent {
    /// Ticket of the load this event belongs to
    pub fn ticket(&self) -> LoadTicket {
        match self {
            Self::MetadataLoaded { ticket, .. }
            | Self::Playing { ticket }
            | Self::PlayRejected { ticket, .. }
            | Self::Paused { ticket }
            | Self::TimeUpdate { ticket, .. }
            | Self::Ended { ticket }
            | Self::Failed { ticket, .. }
            | Self::SkipTimerElapsed { ticket } => *ticket,
        }
    }
}
