use crate::app::App;
use crate::mpris::MprisHandle;

pub fn update_mpris(mpris: &MprisHandle, app: &App) {
    let track = app.tracks.get(app.current);
    mpris.set_track_metadata(track.map(|_| app.current), track);
    mpris.set_playback(app.state);
    mpris.set_flags(app.volume, app.repeat_one, app.shuffle);
}
