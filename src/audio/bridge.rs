//! The embedded playback engine: an external helper player driven over a
//! newline-delimited JSON message bridge.
//!
//! Commands go to the helper's stdin; `ready` and numeric `state` events come
//! back on its stdout. State codes follow the embedded platform player:
//! 0 = ended, 1 = playing, 2 = paused. The helper has no single-track loop
//! primitive, so repeat-one is the transport's job (seek to 0, play again).
//!
//! Every inbound event is stamped with the load generation current at receive
//! time; a load bumps the generation first, so completions that belong to a
//! superseded track are recognizable as stale and dropped.

use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::EmbeddedSettings;
use crate::playlist::{Track, TrackKind};

use super::engine::{Engine, EngineEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub(super) enum BridgeCmd {
    Load { video: String },
    Play,
    Pause,
    Seek { seconds: f64 },
    Volume { value: f32 },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub(super) enum BridgeEvent {
    Ready,
    State { code: i32 },
}

pub(super) const STATE_ENDED: i32 = 0;
pub(super) const STATE_PLAYING: i32 = 1;
pub(super) const STATE_PAUSED: i32 = 2;

/// An event stamped with the load generation current when it arrived.
#[derive(Debug, Clone, Copy)]
pub(super) struct Stamped {
    pub generation: u64,
    pub event: BridgeEvent,
}

/// Transport seam: how commands reach the helper. Production uses the child
/// process; tests inject an in-memory fake.
pub(super) trait BridgeTransport: Send {
    fn send(&mut self, cmd: &BridgeCmd) -> io::Result<()>;
}

pub(super) struct EmbeddedEngine {
    transport: Box<dyn BridgeTransport>,
    events: Receiver<Stamped>,
    generation: Arc<AtomicU64>,
    ready: Arc<AtomicBool>,
    /// Whether the helper has been told about the current track.
    loaded: bool,
    playing: bool,
}

impl EmbeddedEngine {
    /// Spawn the configured helper process and wire its stdout into the
    /// stamped event channel.
    pub(super) fn spawn(settings: &EmbeddedSettings) -> Result<Self, String> {
        let mut argv = settings.command.iter();
        let Some(program) = argv.next() else {
            return Err("embedded playback is not configured".to_string());
        };

        let mut child = Command::new(program)
            .args(argv)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("spawn {program}: {e}"))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| "helper stdin unavailable".to_string())?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| "helper stdout unavailable".to_string())?;

        let generation = Arc::new(AtomicU64::new(0));
        let ready = Arc::new(AtomicBool::new(false));
        let (event_tx, events) = mpsc::channel();

        spawn_reader(stdout, event_tx, generation.clone(), ready.clone());

        Ok(Self::from_parts(
            Box::new(ProcessTransport { stdin, child }),
            events,
            generation,
            ready,
        ))
    }

    /// Assemble an engine from pre-wired parts (tests use this with an
    /// in-memory transport).
    pub(super) fn from_parts(
        transport: Box<dyn BridgeTransport>,
        events: Receiver<Stamped>,
        generation: Arc<AtomicU64>,
        ready: Arc<AtomicBool>,
    ) -> Self {
        Self {
            transport,
            events,
            generation,
            ready,
            loaded: false,
            playing: false,
        }
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn send(&mut self, cmd: &BridgeCmd) {
        // A helper that went away degrades to silence; the user's next
        // action is the retry.
        if let Err(e) = self.transport.send(cmd) {
            eprintln!("serenata: embedded bridge send failed: {e}");
        }
    }
}

impl Engine for EmbeddedEngine {
    fn load(&mut self, track: &Track, start_at: Duration) -> Result<(), String> {
        let TrackKind::EmbeddedVideo { video } = &track.kind else {
            return Err(format!("not an embedded track: {}", track.url));
        };
        let video = video.clone();

        // Supersede in-flight completions before the helper sees the new id.
        self.generation.fetch_add(1, Ordering::SeqCst);
        while self.events.try_recv().is_ok() {}

        if !self.is_ready() {
            // Not an error: commands before `ready` are dropped by contract,
            // and the transport reloads once the ready event arrives.
            self.loaded = false;
            self.playing = false;
            return Ok(());
        }

        let resume = self.playing;
        self.send(&BridgeCmd::Load { video });
        if !start_at.is_zero() {
            self.send(&BridgeCmd::Seek {
                seconds: start_at.as_secs_f64(),
            });
        }
        if resume {
            self.send(&BridgeCmd::Play);
        } else {
            self.send(&BridgeCmd::Pause);
        }
        self.loaded = true;
        Ok(())
    }

    fn play(&mut self) {
        if self.is_ready() && self.loaded {
            self.send(&BridgeCmd::Play);
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        if self.is_ready() && self.loaded {
            self.send(&BridgeCmd::Pause);
        }
        self.playing = false;
    }

    fn silence(&mut self) {
        // Superseded: anything the helper still reports belongs to the past.
        self.generation.fetch_add(1, Ordering::SeqCst);
        if self.is_ready() && self.loaded {
            self.send(&BridgeCmd::Pause);
        }
        self.loaded = false;
        self.playing = false;
    }

    fn seek_to(&mut self, pos: Duration) {
        if self.is_ready() && self.loaded {
            self.send(&BridgeCmd::Seek {
                seconds: pos.as_secs_f64(),
            });
        }
    }

    fn apply_volume(&mut self, volume: f32, muted: bool) {
        if self.is_ready() {
            let value = if muted { 0.0 } else { volume };
            self.send(&BridgeCmd::Volume { value });
        }
    }

    fn take_events(&mut self) -> Vec<EngineEvent> {
        let current = self.generation.load(Ordering::SeqCst);
        let mut out = Vec::new();
        while let Ok(stamped) = self.events.try_recv() {
            match stamped.event {
                BridgeEvent::Ready => out.push(EngineEvent::Ready),
                // State changes from a superseded load are stale.
                BridgeEvent::State { .. } if stamped.generation != current => {}
                BridgeEvent::State { code } => match code {
                    STATE_ENDED => {
                        self.playing = false;
                        out.push(EngineEvent::Ended);
                    }
                    STATE_PLAYING => {
                        self.playing = true;
                        out.push(EngineEvent::Playing);
                    }
                    STATE_PAUSED => {
                        self.playing = false;
                        out.push(EngineEvent::Paused);
                    }
                    _ => {}
                },
            }
        }
        out
    }

    fn release(&mut self) {
        if self.is_ready() {
            self.send(&BridgeCmd::Quit);
        }
        self.loaded = false;
        self.playing = false;
    }
}

fn spawn_reader(
    stdout: ChildStdout,
    tx: Sender<Stamped>,
    generation: Arc<AtomicU64>,
    ready: Arc<AtomicBool>,
) {
    thread::spawn(move || {
        let reader = BufReader::new(stdout);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            // Unknown lines are helper chatter, not protocol errors.
            let Ok(event) = serde_json::from_str::<BridgeEvent>(line) else {
                continue;
            };
            if matches!(event, BridgeEvent::Ready) {
                ready.store(true, Ordering::SeqCst);
            }
            let stamped = Stamped {
                generation: generation.load(Ordering::SeqCst),
                event,
            };
            if tx.send(stamped).is_err() {
                break;
            }
        }
    });
}

struct ProcessTransport {
    stdin: ChildStdin,
    child: Child,
}

impl BridgeTransport for ProcessTransport {
    fn send(&mut self, cmd: &BridgeCmd) -> io::Result<()> {
        let mut line = serde_json::to_string(cmd).map_err(io::Error::other)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.flush()
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeTransport {
        sent: Arc<Mutex<Vec<BridgeCmd>>>,
    }

    impl BridgeTransport for FakeTransport {
        fn send(&mut self, cmd: &BridgeCmd) -> io::Result<()> {
            self.sent.lock().unwrap().push(cmd.clone());
            Ok(())
        }
    }

    struct Rig {
        engine: EmbeddedEngine,
        events: Sender<Stamped>,
        sent: Arc<Mutex<Vec<BridgeCmd>>>,
        generation: Arc<AtomicU64>,
        ready: Arc<AtomicBool>,
    }

    fn rig() -> Rig {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let generation = Arc::new(AtomicU64::new(0));
        let ready = Arc::new(AtomicBool::new(false));
        let (events, rx) = mpsc::channel();

        let engine = EmbeddedEngine::from_parts(
            Box::new(FakeTransport { sent: sent.clone() }),
            rx,
            generation.clone(),
            ready.clone(),
        );

        Rig {
            engine,
            events,
            sent,
            generation,
            ready,
        }
    }

    fn embedded_track() -> Track {
        Track::new("https://youtu.be/abc123", "Our Song")
    }

    fn push_state(rig: &Rig, generation: u64, code: i32) {
        rig.events
            .send(Stamped {
                generation,
                event: BridgeEvent::State { code },
            })
            .unwrap();
    }

    #[test]
    fn wire_format_matches_the_protocol() {
        let cmd = BridgeCmd::Load {
            video: "abc123".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&cmd).unwrap(),
            r#"{"cmd":"load","video":"abc123"}"#
        );
        assert_eq!(
            serde_json::to_string(&BridgeCmd::Play).unwrap(),
            r#"{"cmd":"play"}"#
        );

        let event: BridgeEvent = serde_json::from_str(r#"{"event":"ready"}"#).unwrap();
        assert_eq!(event, BridgeEvent::Ready);
        let event: BridgeEvent = serde_json::from_str(r#"{"event":"state","code":0}"#).unwrap();
        assert_eq!(event, BridgeEvent::State { code: STATE_ENDED });
    }

    #[test]
    fn commands_before_ready_are_dropped() {
        let mut rig = rig();

        rig.engine.load(&embedded_track(), Duration::ZERO).unwrap();
        rig.engine.play();
        rig.engine.seek_to(Duration::from_secs(10));

        assert!(rig.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn load_and_play_after_ready_send_commands() {
        let mut rig = rig();
        rig.ready.store(true, Ordering::SeqCst);

        rig.engine.load(&embedded_track(), Duration::ZERO).unwrap();
        rig.engine.play();

        let sent = rig.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![
                BridgeCmd::Load {
                    video: "abc123".to_string()
                },
                BridgeCmd::Pause,
                BridgeCmd::Play,
            ]
        );
    }

    #[test]
    fn load_bumps_the_generation_and_clears_pending_events() {
        let mut rig = rig();
        rig.ready.store(true, Ordering::SeqCst);

        push_state(&rig, 0, STATE_PLAYING);
        rig.engine.load(&embedded_track(), Duration::ZERO).unwrap();

        assert_eq!(rig.generation.load(Ordering::SeqCst), 1);
        assert!(rig.engine.take_events().is_empty());
    }

    #[test]
    fn stale_state_events_are_discarded() {
        let mut rig = rig();
        rig.ready.store(true, Ordering::SeqCst);
        rig.engine.load(&embedded_track(), Duration::ZERO).unwrap();

        // A completion from the previous load must not advance anything.
        push_state(&rig, 0, STATE_ENDED);
        assert!(rig.engine.take_events().is_empty());

        push_state(&rig, 1, STATE_ENDED);
        assert_eq!(rig.engine.take_events(), vec![EngineEvent::Ended]);
    }

    #[test]
    fn ready_events_pass_regardless_of_generation() {
        let mut rig = rig();
        rig.generation.store(5, Ordering::SeqCst);

        rig.events
            .send(Stamped {
                generation: 0,
                event: BridgeEvent::Ready,
            })
            .unwrap();

        assert_eq!(rig.engine.take_events(), vec![EngineEvent::Ready]);
    }

    #[test]
    fn state_codes_map_to_engine_events() {
        let mut rig = rig();

        push_state(&rig, 0, STATE_PLAYING);
        push_state(&rig, 0, STATE_PAUSED);
        push_state(&rig, 0, STATE_ENDED);
        push_state(&rig, 0, 7); // unknown codes are ignored

        assert_eq!(
            rig.engine.take_events(),
            vec![EngineEvent::Playing, EngineEvent::Paused, EngineEvent::Ended]
        );
    }

    #[test]
    fn mute_sends_zero_volume_and_unmute_restores_the_level() {
        let mut rig = rig();
        rig.ready.store(true, Ordering::SeqCst);

        rig.engine.apply_volume(0.3, true);
        rig.engine.apply_volume(0.3, false);

        let sent = rig.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![
                BridgeCmd::Volume { value: 0.0 },
                BridgeCmd::Volume { value: 0.3 },
            ]
        );
    }

    #[test]
    fn switching_away_silences_and_supersedes() {
        let mut rig = rig();
        rig.ready.store(true, Ordering::SeqCst);
        rig.engine.load(&embedded_track(), Duration::ZERO).unwrap();

        rig.engine.silence();

        assert_eq!(rig.generation.load(Ordering::SeqCst), 2);
        assert_eq!(rig.sent.lock().unwrap().last(), Some(&BridgeCmd::Pause));

        // The helper's trailing paused confirmation is now stale.
        push_state(&rig, 1, STATE_PAUSED);
        assert!(rig.engine.take_events().is_empty());
    }
}
