//! Position save throttling

use std::time::{Duration, Instant};

/// Limits how often the playback position is written while playing
///
/// Meaningful changes (track, volume, playlist) are flushed immediately by
/// the caller; only position ticks go through the throttle.
#[derive(Debug, Clone)]
pub struct SaveThrottle {
    last_flush: Option<Instant>,
    interval: Duration,
}

impl SaveThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            last_flush: None,
            interval,
        }
    }

    /// Whether enough time has passed since the last flush
    pub fn should_flush(&self, now: Instant) -> bool {
        match self.last_flush {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    pub fn mark_flushed(&mut self, now: Instant) {
        self.last_flush = Some(now);
    }
}

impl Default for SaveThrottle {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
