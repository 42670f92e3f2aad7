//! Source aggregation: one normalized result per user reference, plus
//! run-wide totals.
//!
//! References are processed strictly in the order supplied; a failure at
//! any reference aborts the whole run with no partial results, and the
//! triggering error is wrapped with the reference that caused it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::{VideoDetail, YouTubeClient};
use crate::config::ApiConfig;
use crate::duration::{duration_at_speed, format_duration};
use crate::error::{Error, Result};
use crate::range::RangeSpec;
use crate::reference::Reference;
use crate::transport::Transport;

/// What a resolved reference turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A playlist of videos.
    Playlist,
    /// A single video.
    Video,
}

/// One per-video record in an expanded result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    /// Video identifier.
    pub id: String,
    /// Video title.
    pub title: String,
    /// Formatted `HH:MM:SS` playback duration.
    pub duration: String,
    /// Default thumbnail URL.
    pub thumbnail: String,
    /// Canonical watch URL.
    pub url: String,
}

impl From<&VideoDetail> for VideoEntry {
    fn from(detail: &VideoDetail) -> Self {
        Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            duration: format_duration(detail.duration_secs as f64),
            thumbnail: detail.thumbnail_url.clone(),
            url: detail.watch_url(),
        }
    }
}

/// Normalized analysis result for one resolved reference.
///
/// Constructed once per reference and immutable thereafter; results for
/// the same run share no state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    /// Resolved playlist or video identifier.
    pub id: String,
    /// Whether the reference resolved to a playlist or a single video.
    pub kind: SourceKind,
    /// Display title.
    pub title: String,
    /// Channel/owner name.
    pub channel: String,
    /// Number of videos actually analyzed (after range filtering).
    pub analyzed_count: usize,
    /// Full collection size before range filtering.
    pub total_count: usize,
    /// Human-readable description of the analyzed range.
    pub range_info: String,
    /// Total playback duration of the analyzed videos, in seconds.
    pub duration_secs: u64,
    /// Average playback duration, `0` when nothing was analyzed.
    pub average_duration_secs: f64,
    /// Whether playlist membership was cut off at the pagination cap.
    pub truncated: bool,
    /// Per-video records, populated only when detail expansion was
    /// requested, in detail-fetch order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<VideoEntry>>,
}

impl SourceResult {
    /// Total duration formatted as `HH:MM:SS`.
    #[must_use]
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_secs as f64)
    }

    /// Average duration formatted as `HH:MM:SS`.
    #[must_use]
    pub fn formatted_average_duration(&self) -> String {
        format_duration(self.average_duration_secs)
    }

    /// Wall-clock seconds to watch this source at the given speed.
    #[must_use]
    pub fn duration_at_speed(&self, speed: f64) -> f64 {
        duration_at_speed(self.duration_secs as f64, speed)
    }
}

/// Run-wide sums across all results, in input order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    /// Sum of analyzed video counts.
    pub video_count: usize,
    /// Sum of analyzed durations, in seconds.
    pub duration_secs: u64,
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// One result per reference, in input order.
    pub results: Vec<SourceResult>,
    /// Run-wide totals.
    pub totals: RunTotals,
}

/// Orchestrates resolution, fetching, filtering, and summation for a run.
pub struct Analyzer<T: Transport> {
    client: YouTubeClient<T>,
}

impl<T: Transport> Analyzer<T> {
    /// Create an analyzer over the given configuration and transport.
    #[must_use]
    pub fn new(config: ApiConfig, transport: T) -> Self {
        Self {
            client: YouTubeClient::new(config, transport),
        }
    }

    /// Create an analyzer over an explicitly constructed client.
    #[must_use]
    pub const fn with_client(client: YouTubeClient<T>) -> Self {
        Self { client }
    }

    /// Analyze every reference, strictly in order, and combine the
    /// results into run-wide totals.
    ///
    /// The range applies to playlist references only; single videos have
    /// no range concept. When `include_videos` is set, each result
    /// carries its per-video records.
    ///
    /// # Errors
    ///
    /// Fails fast: the first unresolvable reference aborts with
    /// [`Error::InvalidReference`], and any pipeline failure aborts with
    /// [`Error::ReferenceFailed`] wrapping the cause. No partial results
    /// are returned.
    pub async fn analyze(
        &self,
        references: &[String],
        range: RangeSpec,
        include_videos: bool,
    ) -> Result<AnalysisReport> {
        info!(references = references.len(), "starting analysis run");

        let mut results = Vec::with_capacity(references.len());
        let mut totals = RunTotals::default();

        for raw in references {
            let result = self
                .analyze_reference(raw, range, include_videos)
                .await
                .map_err(|e| Error::for_reference(raw.trim(), e))?;

            totals.video_count += result.analyzed_count;
            totals.duration_secs += result.duration_secs;
            results.push(result);
        }

        info!(
            videos = totals.video_count,
            duration_secs = totals.duration_secs,
            "analysis run complete"
        );
        Ok(AnalysisReport { results, totals })
    }

    async fn analyze_reference(
        &self,
        raw: &str,
        range: RangeSpec,
        include_videos: bool,
    ) -> Result<SourceResult> {
        let reference = Reference::parse(raw)
            .ok_or_else(|| Error::InvalidReference(raw.trim().to_string()))?;

        match reference {
            Reference::Playlist(id) => self.analyze_playlist(&id, range, include_videos).await,
            Reference::Video(id) => self.analyze_video(&id, include_videos).await,
            // A bare identifier could name either; try it as a playlist
            // and fall back to a video lookup when no playlist exists.
            Reference::Bare(id) => {
                match self.analyze_playlist(&id, range, include_videos).await {
                    Err(Error::PlaylistNotFound(_)) => {
                        debug!(id = %id, "bare identifier is not a playlist, retrying as video");
                        self.analyze_video(&id, include_videos).await
                    }
                    other => other,
                }
            }
        }
    }

    async fn analyze_playlist(
        &self,
        playlist_id: &str,
        range: RangeSpec,
        include_videos: bool,
    ) -> Result<SourceResult> {
        let snippet = self.client.playlist_snippet(playlist_id).await?;
        let membership = self.client.playlist_members(playlist_id).await?;

        let (window, range_info) = range.apply(&membership.video_ids);
        let details = self.client.video_details(playlist_id, window).await?;

        let duration_secs: u64 = details.iter().map(|d| d.duration_secs).sum();
        let analyzed_count = window.len();
        let average_duration_secs = if analyzed_count > 0 {
            duration_secs as f64 / analyzed_count as f64
        } else {
            0.0
        };
        let videos =
            include_videos.then(|| details.iter().map(VideoEntry::from).collect());

        Ok(SourceResult {
            id: playlist_id.to_string(),
            kind: SourceKind::Playlist,
            title: snippet.title,
            channel: snippet.channel,
            analyzed_count,
            total_count: membership.video_ids.len(),
            range_info,
            duration_secs,
            average_duration_secs,
            truncated: membership.truncated,
            videos,
        })
    }

    async fn analyze_video(&self, video_id: &str, include_videos: bool) -> Result<SourceResult> {
        let ids = [video_id.to_string()];
        let details = self.client.video_details(video_id, &ids).await?;

        let Some(detail) = details.into_iter().next() else {
            return Err(Error::VideoNotFound(video_id.to_string()));
        };

        let videos = include_videos.then(|| vec![VideoEntry::from(&detail)]);
        Ok(SourceResult {
            id: video_id.to_string(),
            kind: SourceKind::Video,
            title: detail.title,
            channel: detail.channel,
            analyzed_count: 1,
            total_count: 1,
            range_info: "Single video".to_string(),
            duration_secs: detail.duration_secs,
            average_duration_secs: detail.duration_secs as f64,
            truncated: false,
            videos,
        })
    }
}
