//! The player thread: the transport state machine that drives both engines.
//!
//! Commands arrive on an mpsc channel with a 200 ms receive timeout; every
//! wakeup also drains engine events, so the event-driven path is primary and
//! the timeout doubles as the bounded end-of-track poll.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::{AudioSettings, EmbeddedSettings};
use crate::playlist::Track;

use super::engine::{Adapter, EngineEvent};
use super::rules::{self, EndedAction};
use super::types::{PlayState, PlaybackHandle, PlayerCmd};

pub(super) fn spawn_player_thread(
    tracks: Vec<Track>,
    rx: Receiver<PlayerCmd>,
    info: PlaybackHandle,
    audio_settings: AudioSettings,
    embedded_settings: EmbeddedSettings,
) -> JoinHandle<()> {
    thread::spawn(move || run(tracks, rx, info, audio_settings, embedded_settings))
}

/// Everything the player thread owns. The adapter's engine handles are
/// mutated from here and nowhere else.
struct Session {
    tracks: Vec<Track>,
    adapter: Adapter,
    info: PlaybackHandle,

    index: usize,
    state: PlayState,
    /// Whether the current index actually loaded; a failed load leaves the
    /// session silent until the user retries.
    loaded_ok: bool,

    volume: f32,
    muted: bool,
    repeat_one: bool,
    shuffle: bool,
    order: Vec<usize>,

    // Elapsed bookkeeping; a ticker thread advances the shared counter.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl Session {
    fn publish(&self) {
        if let Ok(mut info) = self.info.lock() {
            info.index = self.index;
            info.state = self.state;
            info.volume = self.volume;
            info.muted = self.muted;
            info.repeat_one = self.repeat_one;
            info.shuffle = self.shuffle;
        }
    }

    fn set_notice(&self, notice: Option<String>) {
        if let Ok(mut info) = self.info.lock() {
            info.notice = notice;
        }
    }

    fn set_elapsed(&mut self, elapsed: Duration) {
        self.accumulated = elapsed;
        self.started_at = if self.state == PlayState::Playing {
            Some(Instant::now())
        } else {
            None
        };
        if let Ok(mut info) = self.info.lock() {
            info.elapsed = elapsed;
        }
    }

    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |t| t.elapsed())
    }

    /// Load the track at `index`, re-applying the session-scoped settings to
    /// the fresh handle. Transport state is the caller's business.
    fn load(&mut self, index: usize) -> bool {
        self.index = index;
        let track = self.tracks[index].clone();
        self.loaded_ok = match self.adapter.load_track(&track, self.volume, self.muted) {
            Ok(()) => {
                self.set_notice(None);
                true
            }
            Err(e) => {
                // Soft failure: surface a notice and stay silent.
                self.set_notice(Some(format!("couldn't play \"{}\": {e}", track.title)));
                false
            }
        };
        self.loaded_ok
    }

    /// Switch to `index`; when `then_play` the new track starts immediately,
    /// so playback state survives track changes.
    fn start(&mut self, index: usize, then_play: bool) {
        if self.load(index) {
            if then_play {
                self.play();
            } else {
                self.state = PlayState::Idle;
            }
        } else {
            self.state = PlayState::Paused;
        }
        self.set_elapsed(Duration::ZERO);
        self.publish();
    }

    fn play(&mut self) {
        self.adapter.play();
        if self.state != PlayState::Playing {
            self.state = PlayState::Playing;
            self.started_at = Some(Instant::now());
        }
        self.publish();
    }

    fn pause(&mut self) {
        self.adapter.pause();
        if self.state == PlayState::Playing {
            self.accumulated += self.started_at.map_or(Duration::ZERO, |t| t.elapsed());
        }
        self.started_at = None;
        self.state = PlayState::Paused;
        self.publish();
    }

    /// Start the current track, retrying a previously failed load. This is
    /// the user-driven retry path for "couldn't play" notices.
    fn resume(&mut self) {
        if !rules::should_start(self.state) {
            return;
        }
        if !self.loaded_ok && !self.load(self.index) {
            self.state = PlayState::Paused;
            self.publish();
            return;
        }
        self.play();
    }

    fn stop(&mut self) {
        self.adapter.pause();
        self.adapter.seek_to(Duration::ZERO);
        self.state = PlayState::Idle;
        self.set_elapsed(Duration::ZERO);
        self.publish();
    }

    fn skip(&mut self, delta: isize) {
        let target = rules::step(&self.order, self.index, delta);
        let keep_playing = self.state == PlayState::Playing;
        self.start(target, keep_playing);
    }

    fn seek_by(&mut self, secs: i32) {
        if !self.loaded_ok {
            return;
        }
        let cur = self.elapsed().as_secs() as i64;
        let new = (cur + secs as i64).max(0) as u64;
        let new_elapsed = Duration::from_secs(new);
        self.adapter.seek_to(new_elapsed);
        self.set_elapsed(new_elapsed);
    }

    fn handle_ended(&mut self) {
        match rules::on_ended(self.tracks.len(), self.repeat_one) {
            EndedAction::RestartCurrent => {
                // The platform has no single-track loop primitive; restart
                // by hand on the same loaded handle.
                self.adapter.seek_to(Duration::ZERO);
                self.adapter.play();
                self.state = PlayState::Playing;
                self.set_elapsed(Duration::ZERO);
                self.publish();
            }
            EndedAction::Advance => self.skip(1),
            EndedAction::StopHere => {
                self.adapter.pause();
                self.state = PlayState::Paused;
                self.started_at = None;
                self.publish();
            }
        }
    }

    fn poll_events(&mut self) {
        for event in self.adapter.take_events() {
            match event {
                EngineEvent::Ended => self.handle_ended(),
                EngineEvent::Ready => {
                    // The helper finished initializing after we tried to use
                    // it: reconcile by reloading the current embedded track.
                    if self.tracks[self.index].is_embedded() {
                        let keep_playing = self.state == PlayState::Playing;
                        self.start(self.index, keep_playing);
                    }
                }
                // Confirmations; the session state machine is authoritative.
                EngineEvent::Playing | EngineEvent::Paused => {}
            }
        }
    }
}

fn run(
    tracks: Vec<Track>,
    rx: Receiver<PlayerCmd>,
    info: PlaybackHandle,
    audio_settings: AudioSettings,
    embedded_settings: EmbeddedSettings,
) {
    // The resolver guarantees at least one track; bail out rather than
    // index into nothing if a caller ever bypasses it.
    if tracks.is_empty() {
        return;
    }

    let order = rules::playback_order(tracks.len(), false);
    let mut session = Session {
        tracks,
        adapter: Adapter::new(audio_settings, embedded_settings),
        info: info.clone(),
        index: 0,
        state: PlayState::Idle,
        loaded_ok: false,
        volume: 1.0,
        muted: false,
        repeat_one: false,
        shuffle: false,
        order,
        started_at: None,
        accumulated: Duration::ZERO,
    };

    // Ticker thread: advance the shared elapsed counter while playing.
    let info_for_ticker = info;
    thread::spawn(move || {
        loop {
            thread::sleep(Duration::from_millis(500));
            let Ok(mut info) = info_for_ticker.lock() else {
                break;
            };
            if info.state == PlayState::Playing {
                info.elapsed += Duration::from_millis(500);
            }
        }
    });

    // Track 0 is loaded up front so the session starts in Idle(0); a load
    // failure only leaves a notice behind.
    session.load(0);
    session.state = PlayState::Idle;
    session.publish();

    loop {
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(cmd) => {
                match cmd {
                    PlayerCmd::Play(i) => {
                        if i < session.tracks.len() {
                            session.start(i, true);
                        }
                    }
                    PlayerCmd::Resume => session.resume(),
                    PlayerCmd::Pause => {
                        if session.state == PlayState::Playing {
                            session.pause();
                        }
                    }
                    PlayerCmd::PlayPause => {
                        if session.state == PlayState::Playing {
                            session.pause();
                        } else {
                            session.resume();
                        }
                    }
                    PlayerCmd::Stop => session.stop(),
                    PlayerCmd::Next => session.skip(1),
                    PlayerCmd::Prev => session.skip(-1),
                    PlayerCmd::SeekBy(secs) => session.seek_by(secs),
                    PlayerCmd::SetVolume(v) => {
                        session.volume = v.clamp(0.0, 1.0);
                        let (volume, muted) = (session.volume, session.muted);
                        session.adapter.apply_volume(volume, muted);
                        session.publish();
                    }
                    PlayerCmd::SetMuted(muted) => {
                        session.muted = muted;
                        let volume = session.volume;
                        session.adapter.apply_volume(volume, muted);
                        session.publish();
                    }
                    PlayerCmd::SetRepeatOne(repeat_one) => {
                        session.repeat_one = repeat_one;
                        session.publish();
                    }
                    PlayerCmd::SetShuffle(shuffle) => {
                        session.shuffle = shuffle;
                        session.order = rules::playback_order(session.tracks.len(), shuffle);
                        session.publish();
                    }
                    PlayerCmd::Quit { fade_out_ms } => {
                        if session.state == PlayState::Playing {
                            session.adapter.fade_out_native(fade_out_ms);
                        }
                        session.adapter.release();
                        session.state = PlayState::Paused;
                        session.publish();
                        break;
                    }
                }
                session.poll_events();
            }
            Err(RecvTimeoutError::Timeout) => session.poll_events(),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
