//! Time-expiring response cache for upstream API payloads.
//!
//! Identical outbound requests within a short window are served from
//! memory instead of re-contacting the upstream API. Keys are built by the
//! caller from the full request shape (endpoint plus parameters) so that
//! distinct parameterizations never collide. Expiry is driven by an
//! injectable [`Clock`] so tests can advance time deterministically.
//!
//! Upstream payloads that carry an application-level error marker are
//! cached like any other payload: a second call within the TTL window for
//! the same erroring request replays the stored error without another
//! upstream round trip. Transport-level failures are never stored.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;

/// Default time-to-live for cached responses (5 minutes).
pub const DEFAULT_RESPONSE_TTL_SECS: u64 = 5 * 60;

/// Source of the current time, injectable for deterministic expiry tests.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Production clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    payload: Value,
    expires_at: Instant,
}

/// In-memory key→payload store with a fixed time-to-live per entry.
///
/// Expired entries are swept on every access, so memory stays bounded
/// even for keys that are never read again.
pub struct ResponseCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Create a cache with the given TTL and the system clock.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache with the given TTL and an explicit clock.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached payload for `key`, or run `loader` and store its
    /// result with expiry = now + TTL.
    ///
    /// The check-then-fetch-then-store sequence runs under the cache lock,
    /// so concurrent callers can never race duplicate fetches for the same
    /// key. Loader errors propagate without touching the store.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, loader: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let mut entries = self.entries.lock().await;
        let now = self.clock.now();
        entries.retain(|_, entry| entry.expires_at > now);

        if let Some(entry) = entries.get(key) {
            debug!(key, "response cache hit");
            return Ok(entry.payload.clone());
        }

        debug!(key, "response cache miss");
        let payload = loader().await?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                payload: payload.clone(),
                expires_at: now + self.ttl,
            },
        );
        Ok(payload)
    }
}
