//! Content source trait definition.
//!
//! Abstracts the remote content API (headless CMS, reference manager) the
//! crawl pulls from. Implementations own HTTP client construction and
//! credentials; the pipeline only sees pages of records.

use async_trait::async_trait;
use thiserror::Error;

use content_indexer_shared::SourceRecord;

/// Errors a content source can report for a page fetch.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The request to the source API failed.
    #[error("Request error: {0}")]
    RequestError(String),

    /// The response could not be decoded into records.
    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl SourceError {
    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }
}

/// One page of source records.
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// The records on this page; may be empty.
    pub records: Vec<SourceRecord>,
    /// Continuation cursor for the next page, or `None` when the source is
    /// exhausted.
    pub next_cursor: Option<String>,
}

/// Abstracts the paginated content API a crawl reads from.
///
/// Records must be returned with their related entries inline (denormalized
/// fetch), since the linker needs related-entry content-type identifiers
/// without a second round trip.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch one page of records for a collection.
    ///
    /// `cursor` is `None` for the first page and otherwise the
    /// `next_cursor` of the previously returned page.
    async fn fetch_page(
        &self,
        collection_id: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<SourcePage, SourceError>;
}
