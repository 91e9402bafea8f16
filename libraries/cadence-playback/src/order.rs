//! Playback order
//!
//! Maps the current position plus shuffle/repeat modes to the next position,
//! and maintains the shuffle permutation.

use cadence_core::RepeatMode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// What to do when the current track finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAction {
    /// Seek to the start and keep playing
    ReplayCurrent,

    /// Move on to the next track in order
    Advance,

    /// Stop playback
    Stop,
}

/// Fisher-Yates shuffle over `[0, track_count)`
///
/// Walks from the last index down to the second, swapping each with a
/// uniformly chosen index at or before it.
pub fn regenerate_permutation<R: Rng + ?Sized>(track_count: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..track_count).collect();
    for i in (1..track_count).rev() {
        let j = rng.gen_range(0..=i);
        order.swap(i, j);
    }
    order
}

/// Next index after `current`, wrapping to the start
///
/// Without a current track the first entry of the order is returned.
/// Returns `None` only for an empty playlist.
pub fn next_index(
    current: Option<usize>,
    track_count: usize,
    shuffled: bool,
    permutation: &[usize],
) -> Option<usize> {
    step(current, track_count, shuffled, permutation, Direction::Forward)
}

/// Previous index before `current`, wrapping to the end
///
/// Without a current track the last entry of the order is returned.
pub fn previous_index(
    current: Option<usize>,
    track_count: usize,
    shuffled: bool,
    permutation: &[usize],
) -> Option<usize> {
    step(current, track_count, shuffled, permutation, Direction::Backward)
}

/// Decide what happens when a track finishes
///
/// With repeat off, shuffle mode always advances: a randomized order has no
/// meaningful last track.
pub fn on_track_end(
    repeat: RepeatMode,
    shuffled: bool,
    current_index: usize,
    track_count: usize,
) -> EndAction {
    match repeat {
        RepeatMode::One => EndAction::ReplayCurrent,
        RepeatMode::All => EndAction::Advance,
        RepeatMode::Off => {
            if shuffled || current_index + 1 < track_count {
                EndAction::Advance
            } else {
                EndAction::Stop
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Backward,
}

fn step(
    current: Option<usize>,
    track_count: usize,
    shuffled: bool,
    permutation: &[usize],
    direction: Direction,
) -> Option<usize> {
    if track_count == 0 {
        return None;
    }

    // A permutation that does not cover the playlist is stale; fall back to
    // sequential order rather than yielding an out-of-range index.
    let use_permutation = shuffled && permutation.len() == track_count;
    let position = current.and_then(|index| {
        if use_permutation {
            permutation.iter().position(|&p| p == index)
        } else {
            (index < track_count).then_some(index)
        }
    });

    let new_position = match (position, direction) {
        (Some(pos), Direction::Forward) => (pos + 1) % track_count,
        (Some(pos), Direction::Backward) => (pos + track_count - 1) % track_count,
        (None, Direction::Forward) => 0,
        (None, Direction::Backward) => track_count - 1,
    };

    Some(if use_permutation {
        permutation[new_position]
    } else {
        new_position
    })
}

/// Order state for the active playlist
///
/// Keeps the permutation in sync with the track count: identity while
/// sequential, regenerated on every count change while shuffled and once
/// when shuffle is switched on.
#[derive(Debug, Clone)]
pub struct OrderEngine {
    shuffled: bool,
    permutation: Vec<usize>,
    rng: StdRng,
}

impl Default for OrderEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

impl OrderEngine {
    /// Create an engine, optionally with a fixed seed
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            shuffled: false,
            permutation: Vec::new(),
            rng,
        }
    }

    /// Whether shuffle is enabled
    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Current traversal order
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// Enable or disable shuffle
    pub fn set_shuffle(&mut self, enabled: bool, track_count: usize) {
        self.shuffled = enabled;
        self.rebuild(track_count);
    }

    /// Recompute the order after tracks were added or removed
    pub fn tracks_changed(&mut self, track_count: usize) {
        self.rebuild(track_count);
    }

    /// Next index in the current order
    pub fn next(&self, current: Option<usize>, track_count: usize) -> Option<usize> {
        next_index(current, track_count, self.shuffled, &self.permutation)
    }

    /// Previous index in the current order
    pub fn previous(&self, current: Option<usize>, track_count: usize) -> Option<usize> {
        previous_index(current, track_count, self.shuffled, &self.permutation)
    }

    /// Decide what happens when the current track finishes
    pub fn on_track_end(
        &self,
        repeat: RepeatMode,
        current_index: usize,
        track_count: usize,
    ) -> EndAction {
        on_track_end(repeat, self.shuffled, current_index, track_count)
    }

    fn rebuild(&mut self, track_count: usize) {
        self.permutation = if self.shuffled {
            regenerate_permutation(track_count, &mut self.rng)
        } else {
            (0..track_count).collect()
        };
    }
}
