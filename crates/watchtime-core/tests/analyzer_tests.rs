//! Integration tests for Watchtime core analysis runs.
//!
//! These tests drive the full pipeline — reference resolution, playlist
//! metadata, pagination, detail batching, range filtering, aggregation —
//! against a fake transport serving canned YouTube Data API payloads.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use watchtime_core::{
    Analyzer, ApiConfig, Error, RangeSpec, Result, SourceKind, Transport, YouTubeClient,
};

// =============================================================================
// Test Fixtures and Utilities
// =============================================================================

/// Fake transport that routes URLs to a canned handler and records every
/// outbound call.
#[derive(Clone)]
struct FakeTransport {
    handler: Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
    fn new(handler: impl Fn(&str) -> Result<Value> + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn calls_matching(&self, fragment: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }
}

impl Transport for FakeTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        self.calls.lock().unwrap().push(url.to_string());
        (self.handler)(url)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

fn refs(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn video_item(id: &str) -> Value {
    // Playlist members run 4 minutes each; the known single video is 3:32.
    let duration = if id == "dQw4w9WgXcQ" { "PT3M32S" } else { "PT4M" };
    json!({
        "id": id,
        "snippet": {
            "title": format!("Video {id}"),
            "channelTitle": "Channel A",
            "thumbnails": {"default": {"url": format!("https://i.ytimg.com/vi/{id}/default.jpg")}}
        },
        "contentDetails": {"duration": duration}
    })
}

/// Canned world: playlist `PLAYLIST_A` with five 4-minute members, plus
/// detail lookups for any requested video id. Unknown playlists resolve
/// to an empty result set.
fn youtube_world(url: &str) -> Result<Value> {
    if url.contains("/playlists?") {
        let id = query_param(url, "id").unwrap_or_default();
        if id == "PLAYLIST_A" {
            Ok(json!({
                "items": [{"snippet": {"title": "Playlist A", "channelTitle": "Channel A"}}]
            }))
        } else {
            Ok(json!({"items": []}))
        }
    } else if url.contains("/playlistItems?") {
        let members: Vec<Value> = (1..=5)
            .map(|n| json!({"snippet": {"resourceId": {"videoId": format!("vid_{n}")}}}))
            .collect();
        Ok(json!({"items": members}))
    } else if url.contains("/videos?") {
        let ids = query_param(url, "id").unwrap_or_default();
        let items: Vec<Value> = ids
            .split(',')
            .filter(|id| !id.is_empty())
            .map(video_item)
            .collect();
        Ok(json!({"items": items}))
    } else {
        Ok(json!({}))
    }
}

fn world_analyzer() -> (Analyzer<FakeTransport>, FakeTransport) {
    let transport = FakeTransport::new(youtube_world);
    let analyzer = Analyzer::new(ApiConfig::new("test-key"), transport.clone());
    (analyzer, transport)
}

// =============================================================================
// Aggregation Runs
// =============================================================================

#[tokio::test]
async fn test_playlist_and_video_totals() {
    init_tracing();
    let (analyzer, _) = world_analyzer();

    let report = analyzer
        .analyze(
            &refs(&["PLAYLIST_A", "dQw4w9WgXcQ"]),
            RangeSpec::FULL,
            false,
        )
        .await
        .unwrap();

    assert_eq!(report.totals.video_count, 6);
    assert_eq!(report.totals.duration_secs, 1412);

    let playlist = &report.results[0];
    assert_eq!(playlist.kind, SourceKind::Playlist);
    assert_eq!(playlist.title, "Playlist A");
    assert_eq!(playlist.channel, "Channel A");
    assert_eq!(playlist.analyzed_count, 5);
    assert_eq!(playlist.total_count, 5);
    assert_eq!(playlist.range_info, "Full playlist");
    assert_eq!(playlist.duration_secs, 1200);
    assert_eq!(playlist.average_duration_secs, 240.0);
    assert!(!playlist.truncated);

    let video = &report.results[1];
    assert_eq!(video.kind, SourceKind::Video);
    assert_eq!(video.analyzed_count, 1);
    assert_eq!(video.total_count, 1);
    assert_eq!(video.range_info, "Single video");
    assert_eq!(video.duration_secs, 212);
}

#[tokio::test]
async fn test_results_preserve_input_order() {
    let (analyzer, _) = world_analyzer();

    let report = analyzer
        .analyze(
            &refs(&["dQw4w9WgXcQ", "PLAYLIST_A"]),
            RangeSpec::FULL,
            false,
        )
        .await
        .unwrap();

    assert_eq!(report.results[0].kind, SourceKind::Video);
    assert_eq!(report.results[1].kind, SourceKind::Playlist);
}

#[tokio::test]
async fn test_range_applies_to_playlists_only() {
    let (analyzer, _) = world_analyzer();

    let report = analyzer
        .analyze(
            &refs(&["PLAYLIST_A", "dQw4w9WgXcQ"]),
            RangeSpec::new(Some(2), Some(3)),
            false,
        )
        .await
        .unwrap();

    let playlist = &report.results[0];
    assert_eq!(playlist.analyzed_count, 2);
    assert_eq!(playlist.total_count, 5);
    assert_eq!(playlist.range_info, "Videos 2 to 3 of 5");
    assert_eq!(playlist.duration_secs, 480);

    let video = &report.results[1];
    assert_eq!(video.range_info, "Single video");
    assert_eq!(video.duration_secs, 212);

    assert_eq!(report.totals.video_count, 3);
    assert_eq!(report.totals.duration_secs, 692);
}

#[tokio::test]
async fn test_range_beyond_playlist_yields_empty_result() {
    let (analyzer, _) = world_analyzer();

    let report = analyzer
        .analyze(
            &refs(&["PLAYLIST_A"]),
            RangeSpec::new(Some(20), None),
            false,
        )
        .await
        .unwrap();

    let playlist = &report.results[0];
    assert_eq!(playlist.analyzed_count, 0);
    assert_eq!(playlist.duration_secs, 0);
    assert_eq!(playlist.average_duration_secs, 0.0);
    assert_eq!(report.totals, watchtime_core::RunTotals::default());
}

#[tokio::test]
async fn test_include_videos_populates_entries() {
    let (analyzer, _) = world_analyzer();

    let report = analyzer
        .analyze(&refs(&["PLAYLIST_A"]), RangeSpec::FULL, true)
        .await
        .unwrap();

    let videos = report.results[0].videos.as_ref().unwrap();
    assert_eq!(videos.len(), 5);
    assert_eq!(videos[0].id, "vid_1");
    assert_eq!(videos[0].duration, "00:04:00");
    assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=vid_1");
    assert!(videos[0].thumbnail.contains("vid_1"));
}

#[tokio::test]
async fn test_videos_omitted_without_detail_expansion() {
    let (analyzer, _) = world_analyzer();

    let report = analyzer
        .analyze(&refs(&["PLAYLIST_A"]), RangeSpec::FULL, false)
        .await
        .unwrap();

    assert!(report.results[0].videos.is_none());
}

// =============================================================================
// Reference Resolution and Fallback
// =============================================================================

#[tokio::test]
async fn test_invalid_reference_aborts_run() {
    let (analyzer, transport) = world_analyzer();

    let err = analyzer
        .analyze(
            &refs(&["PLAYLIST_A", "not a reference!"]),
            RangeSpec::FULL,
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidReference(_)));
    assert!(err.to_string().contains("not a reference!"));
    // The first reference had already been fetched; the run still
    // surfaces nothing.
    assert!(transport.call_count() > 0);
}

#[tokio::test]
async fn test_bare_video_id_falls_back_from_playlist() {
    let (analyzer, transport) = world_analyzer();

    let report = analyzer
        .analyze(&refs(&["dQw4w9WgXcQ"]), RangeSpec::FULL, false)
        .await
        .unwrap();

    assert_eq!(report.results[0].kind, SourceKind::Video);
    // The playlist lookup ran first and came back empty.
    assert_eq!(transport.calls_matching("/playlists?"), 1);
    assert_eq!(transport.calls_matching("/videos?"), 1);
}

#[tokio::test]
async fn test_full_urls_resolve() {
    let (analyzer, _) = world_analyzer();

    let report = analyzer
        .analyze(
            &refs(&[
                "https://www.youtube.com/playlist?list=PLAYLIST_A",
                "https://youtu.be/dQw4w9WgXcQ",
            ]),
            RangeSpec::FULL,
            false,
        )
        .await
        .unwrap();

    assert_eq!(report.results[0].kind, SourceKind::Playlist);
    assert_eq!(report.results[1].kind, SourceKind::Video);
    assert_eq!(report.totals.video_count, 6);
}

#[tokio::test]
async fn test_unknown_video_url_surfaces_not_found() {
    let transport = FakeTransport::new(|url| {
        if url.contains("/videos?") {
            Ok(json!({"items": []}))
        } else {
            Ok(json!({}))
        }
    });
    let analyzer = Analyzer::new(ApiConfig::new("test-key"), transport);

    let err = analyzer
        .analyze(
            &refs(&["https://youtu.be/gone4567890"]),
            RangeSpec::FULL,
            false,
        )
        .await
        .unwrap_err();

    match err {
        Error::ReferenceFailed { source, .. } => {
            assert!(matches!(*source, Error::VideoNotFound(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Failure Propagation
// =============================================================================

#[tokio::test]
async fn test_pagination_error_marker_aborts_reference() {
    let transport = FakeTransport::new(|url| {
        if url.contains("/playlists?") {
            Ok(json!({
                "items": [{"snippet": {"title": "Playlist A", "channelTitle": "Channel A"}}]
            }))
        } else if url.contains("/playlistItems?") {
            Ok(json!({"error": {"message": "quotaExceeded"}}))
        } else {
            Ok(json!({}))
        }
    });
    let analyzer = Analyzer::new(ApiConfig::new("test-key"), transport);

    let err = analyzer
        .analyze(&refs(&["PLAYLIST_A"]), RangeSpec::FULL, false)
        .await
        .unwrap_err();

    match err {
        Error::ReferenceFailed { reference, source } => {
            assert_eq!(reference, "PLAYLIST_A");
            assert!(matches!(*source, Error::PlaylistFetchFailed { .. }));
            assert!(source.to_string().contains("quotaExceeded"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_detail_error_marker_aborts_reference() {
    let transport = FakeTransport::new(|url| {
        if url.contains("/videos?") {
            Ok(json!({"error": {"message": "backendError"}}))
        } else {
            youtube_world(url)
        }
    });
    let analyzer = Analyzer::new(ApiConfig::new("test-key"), transport);

    let err = analyzer
        .analyze(&refs(&["PLAYLIST_A"]), RangeSpec::FULL, false)
        .await
        .unwrap_err();

    match err {
        Error::ReferenceFailed { reference, source } => {
            assert_eq!(reference, "PLAYLIST_A");
            assert!(matches!(*source, Error::DetailFetchFailed { .. }));
            assert!(source.to_string().contains("backendError"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    let transport =
        FakeTransport::new(|_| Err(Error::Transport("connection refused".to_string())));
    let analyzer = Analyzer::new(ApiConfig::new("test-key"), transport);

    let err = analyzer
        .analyze(&refs(&["PLAYLIST_A"]), RangeSpec::FULL, false)
        .await
        .unwrap_err();

    match err {
        Error::ReferenceFailed { source, .. } => {
            assert!(matches!(*source, Error::Transport(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_failure_stops_subsequent_references() {
    let transport = FakeTransport::new(|url| {
        if url.contains("id=PLMISSING") {
            Ok(json!({"items": []}))
        } else {
            youtube_world(url)
        }
    });
    let recorder = transport.clone();
    let analyzer = Analyzer::new(ApiConfig::new("test-key"), transport);

    // PLMISSING is playlist-shaped but unknown upstream; the following
    // reference must never be contacted.
    let err = analyzer
        .analyze(
            &refs(&[
                "https://www.youtube.com/playlist?list=PLMISSING",
                "PLAYLIST_A",
            ]),
            RangeSpec::FULL,
            false,
        )
        .await
        .unwrap_err();

    match err {
        Error::ReferenceFailed { source, .. } => {
            assert!(matches!(*source, Error::PlaylistNotFound(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(recorder.calls_matching("PLAYLIST_A"), 0);
}

// =============================================================================
// Pagination and Batching
// =============================================================================

#[tokio::test]
async fn test_pagination_stops_at_page_cap() {
    init_tracing();
    let transport = FakeTransport::new(|url| {
        // Every page points at another one; termination must come from
        // the cap.
        let page: usize = query_param(url, "pageToken")
            .and_then(|token| token.trim_start_matches('T').parse().ok())
            .unwrap_or(0);
        let members: Vec<Value> = (0..50)
            .map(|n| json!({"snippet": {"resourceId": {"videoId": format!("vid_{page}_{n}")}}}))
            .collect();
        Ok(json!({"items": members, "nextPageToken": format!("T{}", page + 1)}))
    });
    let recorder = transport.clone();
    let client = YouTubeClient::new(ApiConfig::new("test-key"), transport);

    let membership = client.playlist_members("PLENDLESS").await.unwrap();

    assert_eq!(membership.video_ids.len(), 1000);
    assert!(membership.truncated);
    assert_eq!(recorder.call_count(), 20);
}

#[tokio::test]
async fn test_pagination_follows_tokens_to_the_end() {
    let transport = FakeTransport::new(|url| {
        let page: usize = query_param(url, "pageToken")
            .and_then(|token| token.trim_start_matches('T').parse().ok())
            .unwrap_or(0);
        let members: Vec<Value> = (0..50)
            .map(|n| json!({"snippet": {"resourceId": {"videoId": format!("vid_{page}_{n}")}}}))
            .collect();
        if page < 2 {
            Ok(json!({"items": members, "nextPageToken": format!("T{}", page + 1)}))
        } else {
            Ok(json!({"items": members}))
        }
    });
    let recorder = transport.clone();
    let client = YouTubeClient::new(ApiConfig::new("test-key"), transport);

    let membership = client.playlist_members("PLTHREE").await.unwrap();

    assert_eq!(membership.video_ids.len(), 150);
    assert!(!membership.truncated);
    assert_eq!(recorder.call_count(), 3);
    assert_eq!(membership.video_ids[0], "vid_0_0");
    assert_eq!(membership.video_ids[149], "vid_2_49");
}

#[tokio::test]
async fn test_details_are_chunked_per_batch_size() {
    let transport = FakeTransport::new(youtube_world);
    let recorder = transport.clone();
    let client = YouTubeClient::new(ApiConfig::new("test-key"), transport);

    let ids: Vec<String> = (0..60).map(|n| format!("vid_{n}")).collect();
    let details = client.video_details("PLBIG", &ids).await.unwrap();

    assert_eq!(details.len(), 60);
    assert_eq!(recorder.calls_matching("/videos?"), 3);
}

// =============================================================================
// Caching Across Runs
// =============================================================================

#[tokio::test]
async fn test_repeated_run_is_served_from_cache() {
    let (analyzer, transport) = world_analyzer();
    let references = refs(&["PLAYLIST_A", "dQw4w9WgXcQ"]);

    let first = analyzer
        .analyze(&references, RangeSpec::FULL, false)
        .await
        .unwrap();
    let calls_after_first = transport.call_count();

    let second = analyzer
        .analyze(&references, RangeSpec::FULL, false)
        .await
        .unwrap();

    assert_eq!(transport.call_count(), calls_after_first);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_different_chunk_composition_misses_cache() {
    let transport = FakeTransport::new(youtube_world);
    let recorder = transport.clone();
    let client = YouTubeClient::new(ApiConfig::new("test-key"), transport);

    let ids_a = refs(&["vid_1", "vid_2"]);
    let ids_b = refs(&["vid_1", "vid_3"]);

    client.video_details("A", &ids_a).await.unwrap();
    client.video_details("A", &ids_a).await.unwrap();
    assert_eq!(recorder.calls_matching("/videos?"), 1);

    // One different id in the chunk is a full cache miss.
    client.video_details("A", &ids_b).await.unwrap();
    assert_eq!(recorder.calls_matching("/videos?"), 2);
}
