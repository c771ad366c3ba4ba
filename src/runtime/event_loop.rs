use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{AudioPlayer, PlayState, PlayerCmd};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Last snapshot emitted to MPRIS, to avoid redundant updates.
    last_mpris: MprisSnapshot,
}

type MprisSnapshot = (usize, PlayState, u32, bool, bool);

fn mpris_snapshot(app: &App) -> MprisSnapshot {
    (
        app.current,
        app.state,
        (app.volume * 100.0).round() as u32,
        app.repeat_one,
        app.shuffle,
    )
}

impl EventLoopState {
    /// Construct a new `EventLoopState` seeded from `app`.
    pub fn new(app: &App) -> Self {
        Self {
            pending_gg: false,
            last_mpris: mpris_snapshot(app),
        }
    }
}

/// Main terminal event loop: handles input, UI drawing, sync with the player
/// thread and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Pull the player thread's state; with follow-playback on this also
        // moves the cursor along auto-advances.
        app.sync_playback();

        // Keep MPRIS in sync even when playback changes come from media keys
        // or auto-advance.
        let snapshot = mpris_snapshot(app);
        if snapshot != state.last_mpris {
            update_mpris(mpris, app);
            state.last_mpris = snapshot;
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, app, audio_player) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, audio_player, control_tx, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Handle one control command (MPRIS or keyboard-routed). Returns `true`
/// when the application should shut down.
fn handle_control_cmd(
    cmd: ControlCmd,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
) -> bool {
    match cmd {
        ControlCmd::Quit => {
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return true;
        }
        ControlCmd::Play => {
            app.follow_playback_on();
            let _ = audio_player.send(PlayerCmd::Resume);
        }
        ControlCmd::Pause => {
            let _ = audio_player.send(PlayerCmd::Pause);
        }
        ControlCmd::PlayPause => {
            app.follow_playback_on();
            let _ = audio_player.send(PlayerCmd::PlayPause);
        }
        ControlCmd::Stop => {
            let _ = audio_player.send(PlayerCmd::Stop);
        }
        ControlCmd::Next => {
            app.follow_playback_on();
            let _ = audio_player.send(PlayerCmd::Next);
        }
        ControlCmd::Prev => {
            app.follow_playback_on();
            let _ = audio_player.send(PlayerCmd::Prev);
        }
        ControlCmd::SetVolume(v) => {
            let _ = audio_player.send(PlayerCmd::SetVolume(v.clamp(0.0, 1.0) as f32));
        }
        ControlCmd::SetRepeatOne(b) => {
            let _ = audio_player.send(PlayerCmd::SetRepeatOne(b));
        }
        ControlCmd::SetShuffle(b) => {
            let _ = audio_player.send(PlayerCmd::SetShuffle(b));
        }
    }

    false
}

/// Handle one key press. Returns `true` when the application should shut
/// down.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    control_tx: &mpsc::Sender<ControlCmd>,
    state: &mut EventLoopState,
) -> bool {
    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return true;
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.select_last();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.select_next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.follow_playback_off();
            app.select_prev();
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            if app.has_tracks() {
                app.follow_playback_on();
                let _ = audio_player.send(PlayerCmd::Play(app.selected));
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.pending_gg = false;
            // Behave like MPRIS PlayPause.
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('L') => {
            state.pending_gg = false;
            let secs = settings.controls.scrub_seconds.min(i32::MAX as u64) as i32;
            let _ = audio_player.send(PlayerCmd::SeekBy(secs));
        }
        KeyCode::Char('H') => {
            state.pending_gg = false;
            let secs = settings.controls.scrub_seconds.min(i32::MAX as u64) as i32;
            let _ = audio_player.send(PlayerCmd::SeekBy(-secs));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            state.pending_gg = false;
            let target = (app.volume + settings.controls.volume_step).clamp(0.0, 1.0);
            let _ = audio_player.send(PlayerCmd::SetVolume(target));
        }
        KeyCode::Char('-') => {
            state.pending_gg = false;
            let target = (app.volume - settings.controls.volume_step).clamp(0.0, 1.0);
            let _ = audio_player.send(PlayerCmd::SetVolume(target));
        }
        KeyCode::Char('m') => {
            state.pending_gg = false;
            let _ = audio_player.send(PlayerCmd::SetMuted(!app.muted));
        }
        KeyCode::Char('r') => {
            state.pending_gg = false;
            let _ = audio_player.send(PlayerCmd::SetRepeatOne(!app.repeat_one));
        }
        KeyCode::Char('s') => {
            state.pending_gg = false;
            let _ = audio_player.send(PlayerCmd::SetShuffle(!app.shuffle));
        }
        KeyCode::Tab => {
            state.pending_gg = false;
            app.toggle_panel();
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char.
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}
