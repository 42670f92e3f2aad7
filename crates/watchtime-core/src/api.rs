//! YouTube Data API v3 client: playlist metadata, membership pagination,
//! and batched per-video detail lookups.
//!
//! All requests flow through the injected [`Transport`] and the
//! [`ResponseCache`]; cache keys encode the full request shape so distinct
//! parameterizations never collide. Pagination and batching are both
//! all-or-nothing: the first upstream error marker aborts the operation
//! and discards anything already accumulated.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::config::ApiConfig;
use crate::duration::parse_duration;
use crate::error::{Error, Result};
use crate::transport::Transport;

/// Title and owner of a playlist, from the `playlists` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSnippet {
    /// Playlist title.
    pub title: String,
    /// Channel/owner name.
    pub channel: String,
}

/// Full membership of a playlist, in playlist order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistMembership {
    /// Referenced video identifiers, one per membership entry.
    pub video_ids: Vec<String>,
    /// Whether pagination stopped at the page cap with more pages left.
    pub truncated: bool,
}

/// Per-video metadata from the `videos` detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetail {
    /// Video identifier.
    pub id: String,
    /// Video title.
    pub title: String,
    /// Channel/uploader name.
    pub channel: String,
    /// Playback duration in whole seconds.
    pub duration_secs: u64,
    /// Default thumbnail URL, empty when the upstream omits it.
    pub thumbnail_url: String,
}

impl VideoDetail {
    /// Canonical watch URL for this video.
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

// Upstream JSON shapes, treated as an opaque external contract.

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistResource {
    #[serde(default)]
    snippet: PlaylistSnippetBody,
}

#[derive(Debug, Default, Deserialize)]
struct PlaylistSnippetBody {
    #[serde(default)]
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemResource {
    snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemSnippet {
    #[serde(rename = "resourceId")]
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
struct ResourceId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
    #[serde(default)]
    snippet: VideoSnippetBody,
    #[serde(rename = "contentDetails", default)]
    content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
struct VideoSnippetBody {
    #[serde(default)]
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

/// Client for the upstream listing/detail API.
pub struct YouTubeClient<T: Transport> {
    transport: T,
    cache: ResponseCache,
    config: ApiConfig,
}

impl<T: Transport> YouTubeClient<T> {
    /// Create a client with a fresh response cache sized from the config.
    #[must_use]
    pub fn new(config: ApiConfig, transport: T) -> Self {
        let cache = ResponseCache::new(config.cache_ttl());
        Self {
            transport,
            cache,
            config,
        }
    }

    /// Create a client with an explicitly constructed cache, e.g. one
    /// with an injected clock.
    #[must_use]
    pub fn with_cache(config: ApiConfig, transport: T, cache: ResponseCache) -> Self {
        Self {
            transport,
            cache,
            config,
        }
    }

    async fn fetch(&self, key: &str, url: &str) -> Result<Value> {
        self.cache
            .get_or_fetch(key, || self.transport.get_json(url))
            .await
    }

    /// Look up a playlist's title and owner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlaylistNotFound`] when the upstream result set is
    /// empty, and [`Error::PlaylistFetchFailed`] when the payload carries
    /// an error marker.
    pub async fn playlist_snippet(&self, playlist_id: &str) -> Result<PlaylistSnippet> {
        let url = format!(
            "{}/playlists?part=snippet&id={}&key={}",
            self.config.base_url, playlist_id, self.config.api_key
        );
        let key = format!("playlist_info_{playlist_id}");
        let payload = self.fetch(&key, &url).await?;
        let response: ListResponse<PlaylistResource> = serde_json::from_value(payload)?;

        if let Some(error) = response.error {
            return Err(Error::PlaylistFetchFailed {
                id: playlist_id.to_string(),
                message: error.message,
            });
        }

        let Some(first) = response.items.into_iter().next() else {
            return Err(Error::PlaylistNotFound(playlist_id.to_string()));
        };

        Ok(PlaylistSnippet {
            title: first.snippet.title,
            channel: first.snippet.channel_title,
        })
    }

    /// Retrieve every membership entry of a playlist, in playlist order.
    ///
    /// Requests pages of up to `page_size` entries, each cached under
    /// `(playlist, page index)`, following the continuation token until it
    /// disappears or the page cap is reached. Hitting the cap is not an
    /// error; the result is marked `truncated` instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlaylistFetchFailed`] on the first page whose
    /// payload carries an error marker; pages already accumulated are
    /// discarded.
    pub async fn playlist_members(&self, playlist_id: &str) -> Result<PlaylistMembership> {
        let mut video_ids = Vec::new();
        let mut page_token: Option<String> = None;
        let mut truncated = false;

        for page_index in 0..self.config.max_pages {
            let mut url = format!(
                "{}/playlistItems?part=snippet&maxResults={}&playlistId={}&key={}",
                self.config.base_url, self.config.page_size, playlist_id, self.config.api_key
            );
            if let Some(token) = &page_token {
                url.push_str("&pageToken=");
                url.push_str(token);
            }

            let key = format!("playlist_{playlist_id}_page_{page_index}");
            let payload = self.fetch(&key, &url).await?;
            let response: ListResponse<PlaylistItemResource> = serde_json::from_value(payload)?;

            if let Some(error) = response.error {
                return Err(Error::PlaylistFetchFailed {
                    id: playlist_id.to_string(),
                    message: error.message,
                });
            }

            debug!(
                playlist_id,
                page_index,
                entries = response.items.len(),
                "fetched playlist page"
            );
            video_ids.extend(
                response
                    .items
                    .into_iter()
                    .map(|item| item.snippet.resource_id.video_id),
            );

            page_token = response.next_page_token.filter(|token| !token.is_empty());
            if page_token.is_none() {
                break;
            }
            if page_index + 1 == self.config.max_pages {
                truncated = true;
            }
        }

        if truncated {
            warn!(
                playlist_id,
                pages = self.config.max_pages,
                "page cap reached; membership truncated"
            );
        }

        Ok(PlaylistMembership {
            video_ids,
            truncated,
        })
    }

    /// Retrieve per-video details for the given identifiers.
    ///
    /// Identifiers are split into consecutive chunks of at most
    /// `batch_size`; each chunk is one cached request keyed by its joined
    /// identifiers, so the same chunk composition is never re-fetched
    /// within the TTL window. Output order follows the upstream
    /// responses, not the input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DetailFetchFailed`] on the first chunk whose
    /// payload carries an error marker; earlier chunks are discarded.
    pub async fn video_details(
        &self,
        reference_id: &str,
        video_ids: &[String],
    ) -> Result<Vec<VideoDetail>> {
        let mut details = Vec::with_capacity(video_ids.len());

        for chunk in video_ids.chunks(self.config.batch_size.max(1)) {
            let key = format!("videos_{}", chunk.join("_"));
            let url = format!(
                "{}/videos?part=contentDetails,snippet&id={}&key={}",
                self.config.base_url,
                chunk.join(","),
                self.config.api_key
            );

            let payload = self.fetch(&key, &url).await?;
            let response: ListResponse<VideoResource> = serde_json::from_value(payload)?;

            if let Some(error) = response.error {
                return Err(Error::DetailFetchFailed {
                    id: reference_id.to_string(),
                    message: error.message,
                });
            }

            debug!(
                reference_id,
                requested = chunk.len(),
                returned = response.items.len(),
                "fetched video detail batch"
            );
            details.extend(response.items.into_iter().map(|resource| VideoDetail {
                duration_secs: parse_duration(&resource.content_details.duration),
                thumbnail_url: resource
                    .snippet
                    .thumbnails
                    .default
                    .map(|thumbnail| thumbnail.url)
                    .unwrap_or_default(),
                id: resource.id,
                title: resource.snippet.title,
                channel: resource.snippet.channel_title,
            }));
        }

        Ok(details)
    }
}
