//! Error types for the content indexer pipeline.

use content_indexer_repository::SearchError;
use thiserror::Error;

/// Errors that can occur in the content indexer pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Page retrieval from the content source failed. Fatal to the current
    /// run; carries the cursor that was being fetched.
    #[error("Source fetch error at cursor {cursor:?}: {message}")]
    SourceFetchError {
        cursor: Option<String>,
        message: String,
    },

    /// A single record's transformation failed. Recovered locally: the
    /// record is skipped and counted.
    #[error("Transform error: {0}")]
    TransformError(String),

    /// A flushed batch had failures exceeding the run's tolerance.
    #[error("Bulk write error: {0}")]
    BulkWriteError(String),

    /// A single cross-index tag mutation failed. Never escalates the run.
    #[error("Tag mutation error: {0}")]
    TagMutationError(String),

    /// Alias retarget or stale-index cleanup failed partway. Requires
    /// operator attention.
    #[error("Promotion error: {0}")]
    PromotionError(String),

    /// Error from the search engine.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// Channel communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// The run was cancelled before completion.
    #[error("Crawl cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Create a source fetch error.
    pub fn source_fetch(cursor: Option<String>, msg: impl Into<String>) -> Self {
        Self::SourceFetchError {
            cursor,
            message: msg.into(),
        }
    }

    /// Create a transform error.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::TransformError(msg.into())
    }

    /// Create a bulk write error.
    pub fn bulk_write(msg: impl Into<String>) -> Self {
        Self::BulkWriteError(msg.into())
    }

    /// Create a tag mutation error.
    pub fn tag_mutation(msg: impl Into<String>) -> Self {
        Self::TagMutationError(msg.into())
    }

    /// Create a promotion error.
    pub fn promotion(msg: impl Into<String>) -> Self {
        Self::PromotionError(msg.into())
    }

    /// Create a channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::ChannelError(msg.into())
    }
}
