use crate::audio::{AudioPlayer, PlayerCmd};
use crate::config;

/// Apply configured playback defaults to the freshly spawned player thread.
/// Autoplay is best effort: a blocked start only leaves a notice behind.
pub fn apply_playback_defaults(audio_player: &AudioPlayer, settings: &config::Settings) {
    let _ = audio_player.send(PlayerCmd::SetVolume(settings.audio.volume));

    if settings.playback.repeat_one {
        let _ = audio_player.send(PlayerCmd::SetRepeatOne(true));
    }
    if settings.playback.shuffle {
        let _ = audio_player.send(PlayerCmd::SetShuffle(true));
    }
    if settings.playback.autoplay {
        let _ = audio_player.send(PlayerCmd::Resume);
    }
}
