//! The uniform capability set over the two playback engines, and the adapter
//! that owns one instance of each.

use std::time::Duration;

use crate::config::{AudioSettings, EmbeddedSettings};
use crate::playlist::{Track, TrackKind};

use super::bridge::EmbeddedEngine;
use super::native::NativeEngine;

/// Events an engine reports back to the transport.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(super) enum EngineEvent {
    /// The loaded track played to completion.
    Ended,
    /// The engine confirmed it is playing.
    Playing,
    /// The engine confirmed it is paused.
    Paused,
    /// The embedded helper finished initializing.
    Ready,
}

/// Capability set shared by both engines. Commands on an engine whose
/// underlying handle is not ready are no-ops, never errors; callers retry
/// through the user's next action.
pub(super) trait Engine {
    /// Load `track` at `start_at`. A paused engine stays paused; an engine
    /// that was audibly playing keeps playing the new track (the native
    /// variant crossfades into it).
    fn load(&mut self, track: &Track, start_at: Duration) -> Result<(), String>;
    fn play(&mut self);
    fn pause(&mut self);
    /// Stop and silence this engine entirely; used when the other engine
    /// takes over so at most one backend is ever audible.
    fn silence(&mut self);
    fn seek_to(&mut self, pos: Duration);
    fn apply_volume(&mut self, volume: f32, muted: bool);
    /// Drain events that arrived since the last call. Completions belonging
    /// to superseded loads have already been filtered out.
    fn take_events(&mut self) -> Vec<EngineEvent>;
    fn release(&mut self);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ActiveKind {
    Native,
    Embedded,
}

/// Owns the single native and embedded engine instances of a session and
/// routes calls to whichever one the current track needs. Only the player
/// thread ever touches it.
pub(super) struct Adapter {
    native: NativeEngine,
    embedded: Option<EmbeddedEngine>,
    embedded_settings: EmbeddedSettings,
    active: Option<ActiveKind>,
}

impl Adapter {
    pub(super) fn new(audio: AudioSettings, embedded: EmbeddedSettings) -> Self {
        Self {
            native: NativeEngine::new(audio),
            embedded: None,
            embedded_settings: embedded,
            active: None,
        }
    }

    /// Load `track` on the engine its kind selects, silencing the other
    /// engine first. The session volume/mute is re-applied to the fresh
    /// handle so it survives track changes.
    pub(super) fn load_track(
        &mut self,
        track: &Track,
        volume: f32,
        muted: bool,
    ) -> Result<(), String> {
        match track.kind {
            TrackKind::NativeAudio => {
                if self.active == Some(ActiveKind::Embedded) {
                    if let Some(embedded) = self.embedded.as_mut() {
                        embedded.silence();
                    }
                }
                self.active = Some(ActiveKind::Native);
                self.native.load(track, Duration::ZERO)?;
                self.native.apply_volume(volume, muted);
                Ok(())
            }
            TrackKind::EmbeddedVideo { .. } => {
                if self.active == Some(ActiveKind::Native) {
                    self.native.silence();
                }
                self.active = Some(ActiveKind::Embedded);
                if self.embedded.is_none() {
                    // Lazy: the helper process only exists once an embedded
                    // track is actually needed.
                    self.embedded = Some(EmbeddedEngine::spawn(&self.embedded_settings)?);
                }
                let Some(embedded) = self.embedded.as_mut() else {
                    return Err("embedded player unavailable".to_string());
                };
                embedded.load(track, Duration::ZERO)?;
                embedded.apply_volume(volume, muted);
                Ok(())
            }
        }
    }

    fn current(&mut self) -> Option<&mut dyn Engine> {
        match self.active? {
            ActiveKind::Native => Some(&mut self.native),
            ActiveKind::Embedded => self.embedded.as_mut().map(|e| e as &mut dyn Engine),
        }
    }

    pub(super) fn play(&mut self) {
        if let Some(engine) = self.current() {
            engine.play();
        }
    }

    pub(super) fn pause(&mut self) {
        if let Some(engine) = self.current() {
            engine.pause();
        }
    }

    pub(super) fn seek_to(&mut self, pos: Duration) {
        if let Some(engine) = self.current() {
            engine.seek_to(pos);
        }
    }

    /// Session-scoped: both engines track the latest volume/mute so a later
    /// switch between them starts at the right level.
    pub(super) fn apply_volume(&mut self, volume: f32, muted: bool) {
        self.native.apply_volume(volume, muted);
        if let Some(embedded) = self.embedded.as_mut() {
            embedded.apply_volume(volume, muted);
        }
    }

    pub(super) fn take_events(&mut self) -> Vec<EngineEvent> {
        let mut events = self.native.take_events();
        if let Some(embedded) = self.embedded.as_mut() {
            events.extend(embedded.take_events());
        }
        events
    }

    /// Fade the native sink down before shutdown; the embedded helper has no
    /// equivalent and is simply released.
    pub(super) fn fade_out_native(&mut self, fade_out_ms: u64) {
        self.native.fade_out(fade_out_ms);
    }

    pub(super) fn release(&mut self) {
        self.native.release();
        if let Some(embedded) = self.embedded.as_mut() {
            embedded.release();
        }
        self.embedded = None;
        self.active = None;
    }
}
