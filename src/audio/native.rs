//! The native playback engine, backed by one reusable `rodio` output stream
//! and sink.
//!
//! The sink is rebuilt per load/seek (decode-from-offset is the seeking
//! primitive); end-of-track is detected by the transport's bounded poll of
//! `Sink::empty`, since rodio has no completion callback.

use std::fs::File;
use std::io::BufReader;
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::config::AudioSettings;
use crate::playlist::Track;

use super::engine::{Engine, EngineEvent};

pub(super) struct NativeEngine {
    settings: AudioSettings,
    stream: Option<OutputStream>,
    stream_failed: bool,
    sink: Option<Sink>,
    loaded: Option<Track>,
    paused: bool,
    volume: f32,
    muted: bool,
}

impl NativeEngine {
    pub(super) fn new(settings: AudioSettings) -> Self {
        Self {
            settings,
            stream: None,
            stream_failed: false,
            sink: None,
            loaded: None,
            paused: true,
            volume: 1.0,
            muted: false,
        }
    }

    /// Lazily open the default output device. Failure disables this engine
    /// instead of crashing the player; every load then reports a soft error.
    fn ensure_stream(&mut self) {
        if self.stream.is_some() || self.stream_failed {
            return;
        }
        match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped. That's
                // useful in debugging, but noisy for a TUI app.
                stream.log_on_drop(false);
                self.stream = Some(stream);
            }
            Err(e) => {
                eprintln!("serenata: no audio output device: {e}");
                self.stream_failed = true;
            }
        }
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Open and decode `track` into a fresh paused sink starting at
    /// `start_at`.
    fn open_sink(stream: &OutputStream, track: &Track, start_at: Duration) -> Result<Sink, String> {
        let file = File::open(&track.url).map_err(|e| format!("open {}: {e}", track.url))?;

        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| format!("decode {}: {e}", track.url))?
            // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
            .skip_duration(start_at);

        let sink = Sink::connect_new(stream.mixer());
        sink.append(source);
        sink.pause();
        Ok(sink)
    }

    /// Fade the current sink down over `fade_out_ms` before shutdown.
    pub(super) fn fade_out(&mut self, fade_out_ms: u64) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if fade_out_ms == 0 {
            sink.set_volume(0.0);
            return;
        }
        let steps: u64 = 20;
        let step_ms = (fade_out_ms / steps).max(1);
        let from = self.effective_volume();
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            sink.set_volume(from * (1.0 - t));
            thread::sleep(Duration::from_millis(step_ms));
        }
        sink.set_volume(0.0);
    }
}

impl Engine for NativeEngine {
    fn load(&mut self, track: &Track, start_at: Duration) -> Result<(), String> {
        let target = self.effective_volume();
        let crossfade_ms = self.settings.crossfade_ms;
        let crossfade_steps = self.settings.crossfade_steps.max(1);

        self.ensure_stream();
        let Some(stream) = self.stream.as_ref() else {
            self.sink = None;
            self.loaded = None;
            return Err("no audio output device".to_string());
        };

        let old = self.sink.take();
        match Self::open_sink(stream, track, start_at) {
            Ok(new_sink) => {
                match old {
                    Some(old_sink) if !self.paused && crossfade_ms > 0 => {
                        old_sink.set_volume(target);
                        new_sink.set_volume(0.0);
                        new_sink.play();

                        // Fade volumes in a short blocking loop. This is
                        // simple and good enough for a TUI player; audio
                        // continues in rodio's mixer thread.
                        for step in 1..=crossfade_steps {
                            let t = step as f32 / crossfade_steps as f32;
                            old_sink.set_volume(target * (1.0 - t));
                            new_sink.set_volume(target * t);
                            thread::sleep(Duration::from_millis(
                                (crossfade_ms / crossfade_steps).max(1),
                            ));
                        }
                        old_sink.stop();
                        // Disposition preserved: the engine keeps playing.
                    }
                    other => {
                        if let Some(old_sink) = other {
                            old_sink.stop();
                        }
                        new_sink.set_volume(target);
                        if !self.paused {
                            new_sink.play();
                        }
                    }
                }
                self.sink = Some(new_sink);
                self.loaded = Some(track.clone());
                Ok(())
            }
            Err(e) => {
                if let Some(old_sink) = old {
                    old_sink.stop();
                }
                self.loaded = None;
                self.paused = true;
                Err(e)
            }
        }
    }

    fn play(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
            self.paused = false;
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        self.paused = true;
    }

    fn silence(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.loaded = None;
        self.paused = true;
    }

    /// Seeking rebuilds the sink and skips into the file, preserving the
    /// playing/paused disposition.
    fn seek_to(&mut self, pos: Duration) {
        let Some(track) = self.loaded.clone() else {
            return;
        };
        let was_paused = self.paused;

        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        let Some(stream) = self.stream.as_ref() else {
            return;
        };

        match Self::open_sink(stream, &track, pos) {
            Ok(sink) => {
                sink.set_volume(self.effective_volume());
                if !was_paused {
                    sink.play();
                }
                self.sink = Some(sink);
                self.paused = was_paused;
            }
            Err(e) => {
                eprintln!("serenata: seek failed: {e}");
                self.paused = true;
            }
        }
    }

    fn apply_volume(&mut self, volume: f32, muted: bool) {
        self.volume = volume;
        self.muted = muted;
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(self.effective_volume());
        }
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        // An empty sink while unpaused is the end-of-track signal (bounded
        // poll driven by the transport's receive timeout).
        if !self.paused {
            if let Some(sink) = self.sink.as_ref() {
                if sink.empty() {
                    self.sink = None;
                    self.paused = true;
                    return vec![EngineEvent::Ended];
                }
            }
        }
        Vec::new()
    }

    fn release(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.loaded = None;
        self.paused = true;
        self.stream = None;
    }
}
