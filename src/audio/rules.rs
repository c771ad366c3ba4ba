//! Pure transport decisions.
//!
//! The player thread delegates its index stepping and end-of-track policy to
//! these helpers, which carry no engine state and are tested directly.

use super::types::PlayState;

/// What to do when the current track reports that it ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum EndedAction {
    /// Restart the same track from the beginning.
    RestartCurrent,
    /// Move on to the next track and keep playing.
    Advance,
    /// Single track, no repeat: stay put, paused.
    StopHere,
}

pub(crate) fn on_ended(playlist_len: usize, repeat_one: bool) -> EndedAction {
    if repeat_one {
        EndedAction::RestartCurrent
    } else if playlist_len > 1 {
        EndedAction::Advance
    } else {
        EndedAction::StopHere
    }
}

/// Step `current` through `order` by `delta` positions, wrapping at both
/// ends. `order` is a permutation of playlist indices (the identity when
/// shuffle is off).
pub(crate) fn step(order: &[usize], current: usize, delta: isize) -> usize {
    if order.is_empty() {
        return current;
    }
    let len = order.len() as isize;
    let pos = order.iter().position(|&i| i == current).unwrap_or(0) as isize;
    let next = (pos + delta).rem_euclid(len) as usize;
    order[next]
}

/// Whether a resume request should actually start the engine. Resuming an
/// already-playing session is a no-op, so pressing play twice cannot
/// double-start a track.
pub(crate) fn should_start(state: PlayState) -> bool {
    state != PlayState::Playing
}

/// Build a playback order over `len` tracks: the identity, or a shuffled
/// permutation.
pub(crate) fn playback_order(len: usize, shuffle: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    if shuffle {
        use rand::seq::SliceRandom;
        order.shuffle(&mut rand::rng());
    }
    order
}
