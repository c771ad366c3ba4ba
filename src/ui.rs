//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::audio::PlayState;
use crate::config::{ControlsSettings, UiSettings};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play selected song".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next song".to_string());
    // H/L and +/- are filled dynamically from config.
    map.insert("m".to_string(), "mute".to_string());
    map.insert("r".to_string(), "repeat-one".to_string());
    map.insert("s".to_string(), "shuffle".to_string());
    map.insert("tab".to_string(), "playlist panel".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating the configured steps.
fn controls_text(scrub_seconds: u64, volume_step: f32) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "+/-", "m", "r", "s", "gg/G", "tab", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else if *k == "+/-" {
                Some(format!("[+/-] volume ±{}%", (volume_step * 100.0).round()))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the transport status line: state, title, position, time.
fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    let state = match app.state {
        PlayState::Idle => "Stopped",
        PlayState::Playing => "Playing",
        PlayState::Paused => "Paused",
    };
    parts.push(state.to_string());

    let title = app.current_title();
    if !title.is_empty() {
        parts.push(format!(
            "Song: {} ({}) [{}]",
            title,
            app.position_label(),
            format_mmss(app.elapsed)
        ));
    }

    let volume = format!("Vol: {}%", (app.volume * 100.0).round());
    parts.push(if app.muted {
        format!("{volume} (muted)")
    } else {
        volume
    });

    if app.repeat_one {
        parts.push("Repeat-one: ON".to_string());
    }
    if app.shuffle {
        parts.push("Shuffle: ON".to_string());
    }
    if app.follow_playback {
        parts.push("CURSOR: Follow".to_string());
    } else {
        parts.push("CURSOR: Free-roam".to_string());
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame` using `app` state and
/// settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let playlist_height = if app.panel_open {
        Constraint::Min(1)
    } else {
        Constraint::Length(0)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            playlist_height,
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" serenata ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box: transport line plus an optional soft notice.
    let mut status = status_text(app);
    if let Some(notice) = app.notice.as_deref() {
        status.push_str("\n! ");
        status.push_str(notice);
        status.push_str(" - press play to retry");
    }
    let status_par = Paragraph::new(status)
        .slow_blink()
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Playlist panel
    if app.panel_open {
        let total = app.tracks.len();
        let list_height = chunks[2].height as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));

        // Center the selected item when possible by creating a visible
        // window; only build ListItems for that window.
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = if sel_pos > half { sel_pos - half } else { 0 };
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = app.tracks[start..end]
            .iter()
            .enumerate()
            .map(|(offset, track)| {
                let i = start + offset;
                let marker = if i == app.current {
                    match app.state {
                        PlayState::Playing => "▶ ",
                        PlayState::Paused => "‖ ",
                        PlayState::Idle => "· ",
                    }
                } else {
                    "  "
                };
                let tag = if track.is_embedded() { " [yt]" } else { "" };
                ListItem::new(format!("{marker}{}{tag}", track.title))
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" playlist "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    let footer_text = controls_text(
        controls_settings.scrub_seconds,
        controls_settings.volume_step,
    );
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
