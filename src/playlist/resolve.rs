use std::path::Path;

use lofty::prelude::*;
use lofty::tag::ItemKey;
use walkdir::WalkDir;

use crate::config::{MusicSettings, SourceEntry, SourceKind};

use super::model::Track;

/// Built-in fallback playlist used when configuration yields nothing.
const DEFAULT_TRACKS: &[(&str, &str)] = &[
    ("assets/music/canon-in-d.mp3", "Canon in D"),
    ("assets/music/air-on-the-g-string.mp3", "Air on the G String"),
    ("assets/music/clair-de-lune.mp3", "Clair de Lune"),
];

pub fn default_playlist() -> Vec<Track> {
    DEFAULT_TRACKS
        .iter()
        .map(|(url, title)| Track::new(*url, *title))
        .collect()
}

/// Resolve configured sources into an ordered track list.
///
/// Ordering is preserved as configured and nothing is de-duplicated. Every
/// per-source failure degrades or skips that source; if the configuration
/// yields zero tracks the built-in default playlist is returned, so the
/// result is never empty and this never panics.
pub fn resolve(music: &MusicSettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    if music.sources.is_empty() {
        // Legacy shape: a flat list of raw URLs, no names attached.
        for url in &music.urls {
            if url.trim().is_empty() {
                continue;
            }
            let title = format!("Song {}", tracks.len() + 1);
            tracks.push(Track::new(url.clone(), title));
        }
    } else {
        for source in &music.sources {
            resolve_source(source, music, &mut tracks);
        }
    }

    if tracks.is_empty() {
        return default_playlist();
    }
    tracks
}

fn resolve_source(source: &SourceEntry, music: &MusicSettings, out: &mut Vec<Track>) {
    if source.url.trim().is_empty() {
        return;
    }

    match source.kind {
        SourceKind::File => {
            let title = configured_name(source)
                .or_else(|| tag_title(Path::new(&source.url)))
                .unwrap_or_else(|| format!("Song {}", out.len() + 1));
            out.push(Track::new(source.url.clone(), title));
        }
        SourceKind::Link => {
            // Kept even when the link is not a recognized platform URL; the
            // classifier downgrades those to native playback.
            let title =
                configured_name(source).unwrap_or_else(|| format!("Song {}", out.len() + 1));
            out.push(Track::new(source.url.clone(), title));
        }
        SourceKind::Folder => expand_folder(Path::new(&source.url), music, out),
    }
}

fn configured_name(source: &SourceEntry) -> Option<String> {
    source
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Expand a folder source to every audio file under it, sorted by title
/// case-insensitively. An unreadable folder contributes nothing.
fn expand_folder(dir: &Path, music: &MusicSettings, out: &mut Vec<Track>) {
    let mut found: Vec<Track> = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file() && is_audio_file(path, &music.extensions) {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("UNKNOWN")
                .to_string();
            let title = tag_title(path).unwrap_or(stem);
            found.push(Track::new(path.to_string_lossy().into_owned(), title));
        }
    }

    found.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    out.extend(found);
}

fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    let exts: Vec<String> = extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Title from the file's embedded tags, when the file is readable and tagged.
fn tag_title(path: &Path) -> Option<String> {
    let tagged = lofty::read_from_path(path).ok()?;
    let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
    tag.get_string(ItemKey::TrackTitle)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
