//! ISO-8601 duration parsing and clock-style formatting.
//!
//! The YouTube Data API reports video lengths as ISO-8601 durations
//! (`PT1H2M3S`). This module converts those into whole seconds, formats
//! seconds as zero-padded `HH:MM:SS`, and scales durations by a playback
//! speed factor.

use std::sync::LazyLock;

use regex::Regex;

/// Playback speed presets offered alongside every aggregated duration.
pub const PLAYBACK_SPEED_PRESETS: [f64; 4] = [1.25, 1.5, 1.75, 2.0];

#[allow(clippy::expect_used)]
static ISO8601_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?").expect("duration pattern is valid")
});

/// Parse an ISO-8601 duration string into whole seconds.
///
/// Any subset of the hour/minute/second components may be absent; missing
/// components count as zero. Input that matches nothing at all yields `0`
/// rather than an error, so malformed upstream durations degrade silently
/// to zero length. Fractional seconds are truncated.
#[must_use]
pub fn parse_duration(encoded: &str) -> u64 {
    let Some(captures) = ISO8601_DURATION.captures(encoded) else {
        return 0;
    };

    let component = |index: usize| -> u64 {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    component(1) * 3600 + component(2) * 60 + component(3)
}

/// Format a duration in seconds as zero-padded `HH:MM:SS`.
///
/// The input is rounded to the nearest whole second before decomposition.
/// Hours do not wrap at 24, and every component is at least two digits.
/// Callers must guarantee non-negative input; negative values saturate
/// to `00:00:00`.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Scale a duration by a playback speed factor.
///
/// Watching 3600 seconds of content at 1.5x takes `duration_at_speed(3600.0,
/// 1.5)` = 2400 seconds of wall-clock time. `speed` must be positive.
#[must_use]
pub fn duration_at_speed(seconds: f64, speed: f64) -> f64 {
    seconds / speed
}
