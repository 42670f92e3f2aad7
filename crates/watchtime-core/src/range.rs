//! Optional 1-indexed inclusive sub-range over an ordered item list.

use serde::{Deserialize, Serialize};

/// A sub-window of a playlist's membership list to analyze.
///
/// Both bounds are 1-indexed and inclusive; absence of both means the
/// entire collection. `start` must be at least 1 when present. The
/// effective window is clamped to the collection, so an out-of-bounds
/// start yields an empty window rather than an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    /// First position to include, 1-indexed.
    #[serde(default)]
    pub start: Option<usize>,
    /// Last position to include, 1-indexed.
    #[serde(default)]
    pub end: Option<usize>,
}

impl RangeSpec {
    /// The whole collection, no bounds.
    pub const FULL: Self = Self {
        start: None,
        end: None,
    };

    /// Create a range from optional 1-indexed inclusive bounds.
    #[must_use]
    pub const fn new(start: Option<usize>, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Whether neither bound was given.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Apply the range to an ordered item list.
    ///
    /// Returns the clamped window and a human-readable description of
    /// what was analyzed: `"Full playlist"` when no bound was given,
    /// otherwise `"Videos {start} to {end} of {total}"` with the end
    /// clamped to the collection size.
    #[must_use]
    pub fn apply<'a, T>(&self, items: &'a [T]) -> (&'a [T], String) {
        let len = items.len();
        if self.is_full() {
            return (items, "Full playlist".to_string());
        }

        let start = self.start.map_or(0, |s| s.saturating_sub(1));
        let end = self.end.unwrap_or(len);

        let lo = start.min(len);
        let hi = end.clamp(lo, len);
        let description = format!("Videos {} to {} of {}", start + 1, end.min(len), len);

        (&items[lo..hi], description)
    }
}
