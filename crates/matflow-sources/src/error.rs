//! Collaborator error types.

use thiserror::Error;

use crate::feed::FeedKind;

/// Errors raised by the feed producer and poller.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Fetching the payload from the configured source failed.
    #[error("fetch from {origin} failed: {source}")]
    Fetch {
        /// Human-readable description of the source.
        origin: String,
        #[source]
        source: std::io::Error,
    },

    /// The on-disk cache could not be written or read.
    #[error("feed cache '{path}' unusable: {source}")]
    CacheUnavailable {
        /// Cache file path.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The feed document is not valid JSON of the expected shape.
    #[error("failed to parse feed document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A feature lacks a field the record kind requires.
    #[error("feature missing required field '{field}'")]
    MissingField {
        /// JSON property name.
        field: &'static str,
    },

    /// The caller asked for a record kind with no parser.
    #[error("feed kind '{kind}' is not implemented")]
    UnsupportedKind { kind: FeedKind },

    /// The data channel's receiver went away before shutdown.
    #[error("data channel closed before shutdown")]
    ChannelClosed,

    /// The producer task aborted abnormally.
    #[error("producer task failed: {0}")]
    TaskFailed(String),
}

/// Convenient Result type for collaborator operations.
pub type SourceResult<T> = Result<T, SourceError>;
