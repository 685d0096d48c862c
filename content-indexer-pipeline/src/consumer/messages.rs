//! Message types for the consumer.
//!
//! Defines the messages that flow from the page reader into the pipeline.

use crate::consumer::source_api::SourcePage;

/// Messages sent by the page reader.
#[derive(Debug)]
pub enum StreamMessage {
    /// One fetched page of source records.
    Page(SourcePage),
    /// The page fetch at the given cursor failed; the stream is aborted.
    Error {
        cursor: Option<String>,
        message: String,
    },
    /// The source is exhausted.
    End,
}
