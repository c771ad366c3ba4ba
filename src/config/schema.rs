use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/serenata/config.toml` or
/// `~/.config/serenata/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SERENATA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub music: MusicSettings,
    pub embedded: EmbeddedSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio: AudioSettings::default(),
            playback: PlaybackSettings::default(),
            music: MusicSettings::default(),
            embedded: EmbeddedSettings::default(),
            ui: UiSettings::default(),
            controls: ControlsSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial session volume, 0.0 to 1.0.
    pub volume: f32,
    /// Crossfade duration when switching native tracks (milliseconds).
    /// Set to 0 to disable crossfade.
    pub crossfade_ms: u64,
    /// Number of steps used to fade volumes (higher = smoother, more CPU).
    pub crossfade_steps: u64,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            crossfade_ms: 250,
            crossfade_steps: 10,
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether playback starts by itself once the playlist is loaded.
    pub autoplay: bool,
    /// Whether the current track repeats when it ends.
    pub repeat_one: bool,
    /// Whether next/previous step through a shuffled order.
    pub shuffle: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            autoplay: false,
            repeat_one: false,
            shuffle: false,
        }
    }
}

/// The configured music sources. Two shapes are accepted: the `sources`
/// table list, and a legacy flat `urls` list that is honored only when
/// `sources` is empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MusicSettings {
    pub sources: Vec<SourceEntry>,
    /// Legacy shape: raw URLs with no names attached.
    pub urls: Vec<String>,
    /// File extensions treated as audio when expanding folder sources
    /// (case-insensitive, without dot).
    pub extensions: Vec<String>,
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            urls: Vec::new(),
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceEntry {
    /// Opaque id carried through from the configuring side; unused here.
    pub id: Option<String>,
    #[serde(alias = "type")]
    pub kind: SourceKind,
    #[serde(alias = "path")]
    pub url: String,
    pub name: Option<String>,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// A single audio file.
    #[default]
    #[serde(alias = "upload")]
    File,
    /// A share link; plays embedded when a video id can be extracted.
    #[serde(alias = "youtube")]
    Link,
    /// A directory of audio files, expanded at resolve time.
    Folder,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddedSettings {
    /// Command line of the embedded helper player. Empty = embedded playback
    /// unavailable; commands for it are dropped silently.
    pub command: Vec<String>,
}

impl Default for EmbeddedSettings {
    fn default() -> Self {
        Self {
            command: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Whether the cursor starts in "follow playback" mode.
    pub follow_playback: bool,
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Whether the playlist panel starts open.
    pub panel_open: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            follow_playback: true,
            header_text: " ~ serenata: music, quietly ~ ".to_string(),
            panel_open: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change applied per `+` / `-` press, 0.0 to 1.0.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}
