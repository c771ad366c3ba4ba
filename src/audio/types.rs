//! Audio-related small types and handles.
//!
//! This module defines the command enum, the transport state and the shared
//! playback info handle read by the UI and MPRIS.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Transport state of the current track.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayState {
    /// Loaded but never started since the last stop.
    #[default]
    Idle,
    Playing,
    Paused,
}

#[derive(Debug)]
pub enum PlayerCmd {
    /// Jump to the track at the given playlist index and start it.
    Play(usize),
    /// Start the current track; a no-op when already playing.
    Resume,
    /// Pause the current track; a no-op unless playing.
    Pause,
    /// Toggle between playing and paused.
    PlayPause,
    /// Pause and rewind to the start of the current track.
    Stop,
    /// Advance to the next track (wraps at the end of the playlist).
    Next,
    /// Step back to the previous track (wraps at the start).
    Prev,
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i32),
    /// Set the session volume (clamped to 0.0..=1.0).
    SetVolume(f32),
    SetMuted(bool),
    SetRepeatOne(bool),
    SetShuffle(bool),
    /// Quit the player thread, fading the native sink out over `fade_out_ms`.
    Quit { fade_out_ms: u64 },
}

/// Runtime playback information shared with the UI and MPRIS.
#[derive(Debug, Clone)]
pub struct PlaybackInfo {
    /// Index of the current track in the playlist.
    pub index: usize,
    pub state: PlayState,
    /// Elapsed playback time for the current track.
    pub elapsed: Duration,
    pub volume: f32,
    pub muted: bool,
    pub repeat_one: bool,
    pub shuffle: bool,
    /// Soft playback notice ("couldn't play ..."), cleared on the next
    /// successful load.
    pub notice: Option<String>,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            index: 0,
            state: PlayState::Idle,
            elapsed: Duration::ZERO,
            volume: 1.0,
            muted: false,
            repeat_one: false,
            shuffle: false,
            notice: None,
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;
