//! Engine configuration.
//!
//! Collects the knobs of the aggregation engine: the API key, the upstream
//! base URL, page/batch sizing, and the response-cache TTL. The presentation
//! collaborator passes this over the boundary, hence the serde derives;
//! nothing is persisted to disk.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_RESPONSE_TTL_SECS;

/// Default base URL of the YouTube Data API v3.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Maximum membership entries requested per playlist page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Hard cap on playlist pages fetched per playlist (1000 entries).
pub const DEFAULT_MAX_PAGES: u32 = 20;

/// Maximum video identifiers per detail request.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Configuration for the YouTube Data API client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// API key appended to every request.
    pub api_key: String,

    /// Base URL of the listing/detail API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Membership entries requested per playlist page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Hard cap on pages fetched per playlist.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Video identifiers per detail request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Time-to-live for cached responses, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

const fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

const fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

const fn default_cache_ttl() -> u64 {
    DEFAULT_RESPONSE_TTL_SECS
}

impl ApiConfig {
    /// Create a configuration with the given API key and default sizing.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            batch_size: DEFAULT_BATCH_SIZE,
            cache_ttl_secs: DEFAULT_RESPONSE_TTL_SECS,
        }
    }

    /// Override the upstream base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the playlist page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Override the pagination cap.
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Override the detail batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Override the response-cache TTL.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl_secs: u64) -> Self {
        self.cache_ttl_secs = ttl_secs;
        self
    }

    /// The response-cache TTL as a [`Duration`].
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
