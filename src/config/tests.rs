use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_serenata_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("SERENATA_CONFIG_PATH", "/tmp/serenata-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/serenata-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("serenata")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("serenata")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file_with_source_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
volume = 0.4
crossfade_ms = 0
crossfade_steps = 3
quit_fade_out_ms = 123

[playback]
autoplay = true
repeat_one = true
shuffle = true

[embedded]
command = ["serenata-embed", "--quiet"]

[ui]
follow_playback = false
header_text = "hello"
panel_open = false

[controls]
scrub_seconds = 9
volume_step = 0.1

[music]
extensions = ["mp3"]

[[music.sources]]
id = "a1"
type = "upload"
path = "uploads/march.mp3"
name = "march.mp3"

[[music.sources]]
kind = "youtube"
url = "https://youtu.be/abc123"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SERENATA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("SERENATA__AUDIO__VOLUME");

    let s = Settings::load().unwrap();
    assert!(s.validate().is_ok());

    assert_eq!(s.audio.volume, 0.4);
    assert_eq!(s.audio.crossfade_ms, 0);
    assert_eq!(s.audio.crossfade_steps, 3);
    assert_eq!(s.audio.quit_fade_out_ms, 123);

    assert!(s.playback.autoplay);
    assert!(s.playback.repeat_one);
    assert!(s.playback.shuffle);

    assert_eq!(s.embedded.command, vec!["serenata-embed", "--quiet"]);

    assert!(!s.ui.follow_playback);
    assert_eq!(s.ui.header_text, "hello");
    assert!(!s.ui.panel_open);

    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.controls.volume_step, 0.1);

    assert_eq!(s.music.extensions, vec!["mp3".to_string()]);
    assert_eq!(s.music.sources.len(), 2);
    assert_eq!(s.music.sources[0].id.as_deref(), Some("a1"));
    assert_eq!(s.music.sources[0].kind, SourceKind::File);
    assert_eq!(s.music.sources[0].url, "uploads/march.mp3");
    assert_eq!(s.music.sources[0].name.as_deref(), Some("march.mp3"));
    assert_eq!(s.music.sources[1].kind, SourceKind::Link);
    assert_eq!(s.music.sources[1].url, "https://youtu.be/abc123");
    assert_eq!(s.music.sources[1].name, None);
}

#[test]
fn settings_accept_the_legacy_flat_url_list() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[music]
urls = ["https://youtu.be/abc123", "uploads/march.mp3"]
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SERENATA_CONFIG_PATH", cfg_path.to_str().unwrap());

    let s = Settings::load().unwrap();
    assert!(s.music.sources.is_empty());
    assert_eq!(s.music.urls.len(), 2);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
quit_fade_out_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SERENATA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("SERENATA__AUDIO__QUIT_FADE_OUT_MS", "0");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.quit_fade_out_ms, 0);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.audio.volume = 1.5;
    assert!(s.validate().is_err());

    s.audio.volume = 0.5;
    s.audio.crossfade_steps = 0;
    assert!(s.validate().is_err());

    s.audio.crossfade_steps = 1;
    s.controls.volume_step = 0.0;
    assert!(s.validate().is_err());
}
