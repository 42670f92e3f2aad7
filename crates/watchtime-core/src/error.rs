//! Error types for Watchtime core operations.

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving references and aggregating durations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input string resolves to neither a playlist nor a video shape.
    #[error("Invalid YouTube URL or ID: {0}")]
    InvalidReference(String),

    /// Upstream returned zero records for a playlist identifier.
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    /// Upstream returned zero records for a video identifier.
    #[error("Video not found: {0}")]
    VideoNotFound(String),

    /// Upstream payload carried an error marker during pagination.
    #[error("Playlist fetch failed for {id}: {message}")]
    PlaylistFetchFailed {
        /// Playlist identifier being paginated.
        id: String,
        /// Upstream error message, verbatim.
        message: String,
    },

    /// Upstream payload carried an error marker during a detail batch.
    #[error("Video detail fetch failed for {id}: {message}")]
    DetailFetchFailed {
        /// Reference identifier the batch belonged to.
        id: String,
        /// Upstream error message, verbatim.
        message: String,
    },

    /// The injected HTTP capability failed (network, decode).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A payload did not match the expected upstream shape.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A reference's pipeline failed; carries the offending reference.
    #[error("Failed to analyze {reference}: {source}")]
    ReferenceFailed {
        /// The user-supplied reference that triggered the failure.
        reference: String,
        /// The underlying error.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap a pipeline error with the reference that caused it.
    ///
    /// `InvalidReference` is raised before any pipeline starts and is
    /// left unwrapped; everything else gains the reference context.
    #[must_use]
    pub(crate) fn for_reference(reference: &str, source: Self) -> Self {
        match source {
            err @ Self::InvalidReference(_) => err,
            err => Self::ReferenceFailed {
                reference: reference.to_string(),
                source: Box::new(err),
            },
        }
    }
}
