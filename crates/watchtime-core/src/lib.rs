//! Watchtime Core Library
//!
//! This crate provides the core functionality for the Watchtime application:
//! - Resolving mixed YouTube playlist/video references
//! - Paginating playlist membership and batching per-video detail lookups
//! - Caching upstream responses within a bounded time window
//! - Parsing/formatting ISO-8601 durations and playback-speed scaling
//! - Aggregating per-source results into run-wide totals

pub mod analyzer;
pub mod api;
pub mod cache;
pub mod config;
pub mod duration;
pub mod error;
pub mod range;
pub mod reference;
pub mod transport;

pub use analyzer::{AnalysisReport, Analyzer, RunTotals, SourceKind, SourceResult, VideoEntry};
pub use api::{PlaylistMembership, PlaylistSnippet, VideoDetail, YouTubeClient};
pub use cache::{Clock, ResponseCache, SystemClock};
pub use config::ApiConfig;
pub use duration::{PLAYBACK_SPEED_PRESETS, duration_at_speed, format_duration, parse_duration};
pub use error::{Error, Result};
pub use range::RangeSpec;
pub use reference::Reference;
pub use transport::{HttpTransport, Transport};
