//! Application model: the playlist, cursor and playback snapshot shared with
//! the UI.

use std::time::Duration;

use crate::audio::{PlayState, PlaybackHandle};
use crate::playlist::Track;

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    /// Cursor position in the playlist panel.
    pub selected: usize,

    // Snapshot of the player thread's shared info, refreshed each loop.
    pub state: PlayState,
    pub current: usize,
    pub elapsed: Duration,
    pub volume: f32,
    pub muted: bool,
    pub repeat_one: bool,
    pub shuffle: bool,
    pub notice: Option<String>,

    pub playback_handle: Option<PlaybackHandle>,

    /// Whether the cursor follows the currently playing track.
    pub follow_playback: bool,
    /// Whether the playlist panel is open.
    pub panel_open: bool,
}

impl App {
    /// Create a new `App` with the provided resolved playlist.
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            selected: 0,
            state: PlayState::Idle,
            current: 0,
            elapsed: Duration::ZERO,
            volume: 1.0,
            muted: false,
            repeat_one: false,
            shuffle: false,
            notice: None,
            playback_handle: None,
            follow_playback: true,
            panel_open: true,
        }
    }

    /// Attach the `PlaybackHandle` used to observe playback state.
    pub fn set_playback_handle(&mut self, handle: PlaybackHandle) {
        self.playback_handle = Some(handle);
    }

    /// Pull the latest shared playback info into the model. With
    /// follow-playback on, the cursor tracks the current index.
    pub fn sync_playback(&mut self) {
        // Clone the Arc handle to avoid borrowing `self` across mutations.
        let Some(handle) = self.playback_handle.as_ref().cloned() else {
            return;
        };
        if let Ok(info) = handle.lock() {
            self.state = info.state;
            self.current = info.index;
            self.elapsed = info.elapsed;
            self.volume = info.volume;
            self.muted = info.muted;
            self.repeat_one = info.repeat_one;
            self.shuffle = info.shuffle;
            self.notice = info.notice.clone();
        }

        if self.follow_playback && self.selected != self.current {
            self.selected = self.current;
        }
    }

    /// Return true if the playlist contains any tracks. The resolver
    /// guarantees it does, but the UI does not rely on that.
    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn current_title(&self) -> &str {
        self.tracks
            .get(self.current)
            .map(|t| t.title.as_str())
            .unwrap_or("")
    }

    /// Position indicator for the transport bar.
    pub fn position_label(&self) -> String {
        format!("{} / {}", self.current + 1, self.tracks.len())
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }
    /// Disable follow-playback so manual cursor moves stick.
    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    /// Move the cursor to the next track, wrapping at the end.
    pub fn select_next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.tracks.len();
    }

    /// Move the cursor to the previous track, wrapping at the start.
    pub fn select_prev(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(self.tracks.len() - 1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        if !self.tracks.is_empty() {
            self.selected = self.tracks.len() - 1;
        }
    }
}
