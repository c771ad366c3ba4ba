use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::{AudioSettings, EmbeddedSettings};
use crate::playlist::Track;

use super::thread::spawn_player_thread;
use super::types::{PlayerCmd, PlaybackHandle, PlaybackInfo};

/// Front-end handle to the player thread: a command sender plus the shared
/// playback info the UI and MPRIS read.
pub struct AudioPlayer {
    tx: Sender<PlayerCmd>,
    info: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(
        tracks: Vec<Track>,
        audio_settings: AudioSettings,
        embedded_settings: EmbeddedSettings,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();
        let info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let join = spawn_player_thread(
            tracks,
            rx,
            info.clone(),
            audio_settings,
            embedded_settings,
        );

        Self {
            tx,
            info,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.info.clone()
    }

    pub fn send(&self, cmd: PlayerCmd) -> Result<(), mpsc::SendError<PlayerCmd>> {
        self.tx.send(cmd)
    }

    /// Quit with a fade-out, waiting for the player thread to wind down so no
    /// audio outlives the process.
    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(PlayerCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }
}
