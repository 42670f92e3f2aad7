//! Reference resolution for user-supplied YouTube URLs and identifiers.
//!
//! A reference is whatever the user pasted: a playlist link, a video link,
//! or a bare identifier. Classification runs ordered pattern matching —
//! playlist shapes first, then video shapes, then a bare-identifier
//! fallback — and never fails internally; an unrecognized string simply
//! resolves to nothing and surfaces as `InvalidReference` at the
//! aggregation layer.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[allow(clippy::expect_used)]
static PLAYLIST_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // youtube.com/playlist?list=PLAYLIST_ID
        Regex::new(r"youtube\.com/playlist\?(?:[^#\s]*&)?list=([A-Za-z0-9_-]+)"),
        // youtu.be/VIDEO_ID?list=PLAYLIST_ID
        Regex::new(r"youtu\.be/[A-Za-z0-9_-]+\?(?:[^#\s]*&)?list=([A-Za-z0-9_-]+)"),
        // youtube.com/watch?v=VIDEO_ID&list=PLAYLIST_ID
        Regex::new(r"youtube\.com/watch\?(?:[^#\s]*&)?list=([A-Za-z0-9_-]+)"),
    ]
    .map(|p| p.expect("playlist pattern is valid"))
});

#[allow(clippy::expect_used)]
static VIDEO_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        // youtube.com/watch?v=VIDEO_ID
        Regex::new(r"youtube\.com/watch\?(?:[^#\s]*&)?v=([A-Za-z0-9_-]+)"),
        // youtu.be/VIDEO_ID
        Regex::new(r"youtu\.be/([A-Za-z0-9_-]+)"),
        // youtube.com/embed/VIDEO_ID
        Regex::new(r"youtube\.com/embed/([A-Za-z0-9_-]+)"),
        // youtube.com/v/VIDEO_ID
        Regex::new(r"youtube\.com/v/([A-Za-z0-9_-]+)"),
    ]
    .map(|p| p.expect("video pattern is valid"))
});

#[allow(clippy::expect_used)]
static BARE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("identifier pattern is valid"));

/// A classified user-supplied reference.
///
/// `Bare` covers raw identifiers with no URL context; whether such an
/// identifier names a playlist or a video is only knowable by asking the
/// upstream API, so the aggregator tries it as a playlist first and falls
/// back to a video lookup when the playlist does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reference {
    /// A playlist identifier extracted from a recognized URL shape.
    Playlist(String),
    /// A video identifier extracted from a recognized URL shape.
    Video(String),
    /// A bare identifier that could name either a playlist or a video.
    Bare(String),
}

impl Reference {
    /// Classify a raw reference string.
    ///
    /// Returns `None` when the string matches no playlist shape, no video
    /// shape, and is not a bare identifier (letters, digits, hyphen,
    /// underscore only).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(id) = first_capture(PLAYLIST_PATTERNS.as_slice(), raw) {
            return Some(Self::Playlist(id));
        }
        if let Some(id) = first_capture(VIDEO_PATTERNS.as_slice(), raw) {
            return Some(Self::Video(id));
        }
        if BARE_IDENTIFIER.is_match(raw) {
            return Some(Self::Bare(raw.to_string()));
        }

        None
    }

    /// The extracted identifier, whichever kind it is.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Playlist(id) | Self::Video(id) | Self::Bare(id) => id,
        }
    }
}

fn first_capture(patterns: &[Regex], raw: &str) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures(raw)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    })
}
