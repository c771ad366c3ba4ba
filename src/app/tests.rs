use super::*;
use crate::audio::{PlayState, PlaybackInfo};
use crate::playlist::Track;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn t(title: &str) -> Track {
    Track::new(format!("uploads/{title}.mp3"), title)
}

fn app3() -> App {
    App::new(vec![t("Alpha"), t("Beta"), t("Gamma")])
}

#[test]
fn selection_wraps_both_ways() {
    let mut app = app3();

    app.select_prev();
    assert_eq!(app.selected, 2);
    app.select_next();
    assert_eq!(app.selected, 0);
    app.select_next();
    app.select_next();
    app.select_next();
    assert_eq!(app.selected, 0);

    app.select_last();
    assert_eq!(app.selected, 2);
    app.select_first();
    assert_eq!(app.selected, 0);
}

#[test]
fn position_label_is_one_based() {
    let mut app = app3();
    assert_eq!(app.position_label(), "1 / 3");
    app.current = 2;
    assert_eq!(app.position_label(), "3 / 3");
}

#[test]
fn sync_playback_copies_the_shared_snapshot() {
    let mut app = app3();
    let handle = Arc::new(Mutex::new(PlaybackInfo {
        index: 1,
        state: PlayState::Playing,
        elapsed: Duration::from_secs(12),
        volume: 0.3,
        muted: true,
        repeat_one: true,
        shuffle: false,
        notice: Some("couldn't play \"Gamma\"".to_string()),
    }));
    app.set_playback_handle(handle);

    app.sync_playback();

    assert_eq!(app.current, 1);
    assert_eq!(app.state, PlayState::Playing);
    assert_eq!(app.elapsed, Duration::from_secs(12));
    assert_eq!(app.volume, 0.3);
    assert!(app.muted);
    assert!(app.repeat_one);
    assert_eq!(app.current_title(), "Beta");
    assert!(app.notice.is_some());
}

#[test]
fn follow_playback_moves_the_cursor_only_when_on() {
    let mut app = app3();
    let handle = Arc::new(Mutex::new(PlaybackInfo {
        index: 2,
        ..PlaybackInfo::default()
    }));
    app.set_playback_handle(handle);

    app.follow_playback_off();
    app.sync_playback();
    assert_eq!(app.selected, 0);

    app.follow_playback_on();
    app.sync_playback();
    assert_eq!(app.selected, 2);
}

#[test]
fn panel_toggles() {
    let mut app = app3();
    assert!(app.panel_open);
    app.toggle_panel();
    assert!(!app.panel_open);
    app.toggle_panel();
    assert!(app.panel_open);
}
