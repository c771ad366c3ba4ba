use url::Url;

/// Which engine plays a track. Derived from the source location alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackKind {
    /// Decoded and played by the native rodio engine.
    NativeAudio,
    /// Played by the embedded helper player, addressed by video id.
    EmbeddedVideo { video: String },
}

impl TrackKind {
    /// Classify a source location. Pure: the result depends on `url` alone,
    /// so classifying the same string twice always agrees.
    ///
    /// Anything that does not yield a platform video id plays as native
    /// audio; malformed or unsupported links degrade instead of being
    /// dropped.
    pub fn classify(url: &str) -> TrackKind {
        match video_id(url) {
            Some(video) => TrackKind::EmbeddedVideo { video },
            None => TrackKind::NativeAudio,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    /// Source location: a local path, a direct audio URL or a share link.
    pub url: String,
    pub title: String,
    pub kind: TrackKind,
}

impl Track {
    /// Build a track. `kind` is always computed from `url` here; there is no
    /// other way to set it, so it can never drift from the source location.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        let url = url.into();
        let kind = TrackKind::classify(&url);
        Self {
            url,
            title: title.into(),
            kind,
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.kind, TrackKind::EmbeddedVideo { .. })
    }
}

/// Extract the canonical video id from the known share-URL shapes:
/// `watch?v=<id>`, `youtu.be/<id>` short links and `/embed/<id>`.
pub fn video_id(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    let candidate = if host == "youtu.be" {
        parsed.path_segments()?.next().map(str::to_string)
    } else if matches!(host, "youtube.com" | "m.youtube.com" | "music.youtube.com") {
        if parsed.path() == "/watch" {
            parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())
        } else {
            let mut segments = parsed.path_segments()?;
            match segments.next() {
                Some("embed") => segments.next().map(str::to_string),
                _ => None,
            }
        }
    } else {
        None
    };

    candidate.filter(|id| {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}
